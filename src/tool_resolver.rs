//! # Tool Path Resolver
//!
//! This module handles finding the external optimization tools in different
//! environments:
//! - Explicit path passed on the command line
//! - Environment variable override (`PNGQUANT`, `ZOPFLIPNG`)
//! - System PATH lookup
//!
//! Resolution is behind the `ToolResolver` trait so tests can substitute
//! fake executables without touching the process environment.

use crate::config::Config;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The external tools the pipeline can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalTool {
    Pngquant,
    Zopflipng,
}

impl ExternalTool {
    /// Executable name on PATH
    pub fn name(self) -> &'static str {
        match self {
            ExternalTool::Pngquant => "pngquant",
            ExternalTool::Zopflipng => "zopflipng",
        }
    }

    /// Environment variable that overrides the executable location
    pub fn env_var(self) -> &'static str {
        match self {
            ExternalTool::Pngquant => "PNGQUANT",
            ExternalTool::Zopflipng => "ZOPFLIPNG",
        }
    }
}

/// Locates external tool executables.
pub trait ToolResolver {
    /// Resolve a tool to an executable path, or None if it cannot be found.
    fn resolve(&self, tool: ExternalTool) -> Option<PathBuf>;
}

/// Production resolver: explicit override, then environment, then PATH.
///
/// An explicit override must point at an existing file; it never falls back,
/// so a mistyped `--pngquant` path surfaces as a missing tool instead of
/// silently using a different binary. A stale environment variable does fall
/// back to the PATH search (it may hold a bare command name).
pub struct ToolPathResolver {
    pngquant_override: Option<PathBuf>,
    zopflipng_override: Option<PathBuf>,
}

impl ToolPathResolver {
    pub fn new(
        pngquant_override: Option<PathBuf>,
        zopflipng_override: Option<PathBuf>,
    ) -> Self {
        Self {
            pngquant_override,
            zopflipng_override,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.pngquant_path.clone(), config.zopflipng_path.clone())
    }

    fn override_for(&self, tool: ExternalTool) -> Option<&PathBuf> {
        match tool {
            ExternalTool::Pngquant => self.pngquant_override.as_ref(),
            ExternalTool::Zopflipng => self.zopflipng_override.as_ref(),
        }
    }

    /// Find tool in system PATH
    fn find_in_system_path(tool_name: &str) -> Option<PathBuf> {
        let path_var = env::var_os("PATH")?;
        Self::find_in_path_var(path_var.to_str()?, tool_name)
    }

    /// Find tool in an explicit PATH-style string (testable without env)
    fn find_in_path_var(path_var: &str, tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        let tool_with_ext = format!("{}{}", tool_name, extension);

        path_var
            .split(if cfg!(windows) { ';' } else { ':' })
            .filter(|dir| !dir.is_empty())
            .map(|dir| Path::new(dir).join(&tool_with_ext))
            .find(|path| path.exists())
    }
}

impl ToolResolver for ToolPathResolver {
    fn resolve(&self, tool: ExternalTool) -> Option<PathBuf> {
        if let Some(path) = self.override_for(tool) {
            debug!("Checking explicit {} override: {:?}", tool.name(), path);
            return path.exists().then(|| path.clone());
        }

        if let Some(raw) = env::var_os(tool.env_var()) {
            let path = PathBuf::from(raw);
            debug!(
                "Checking {} from {}: {:?}",
                tool.name(),
                tool.env_var(),
                path
            );
            if path.exists() {
                return Some(path);
            }
        }

        let found = Self::find_in_system_path(tool.name());
        if found.is_none() {
            warn!("Tool not found: {}", tool.name());
        }
        found
    }
}
