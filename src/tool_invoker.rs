//! # External Tool Invocation Module
//!
//! Questo modulo esegue i tool esterni di compressione PNG.
//!
//! ## Responsabilità:
//! - Costruisce le command line per pngquant e zopflipng
//! - Esegue i tool con cattura di exit status e stderr
//! - Scrive l'output di ogni stage su un file temporaneo nella stessa
//!   directory e lo sostituisce all'originale con un rename atomico
//! - Converte exit status non-zero in `ToolFailed` con lo stderr catturato
//!
//! ## Invocazioni:
//! - pngquant: `--quality=<min>-100 --force --output <tmp> <input>`
//! - zopflipng: `--iterations=<n> -y <input> <tmp>`
//!
//! Se uno stage fallisce il file temporaneo viene eliminato e l'originale
//! resta intatto.

use crate::config::Config;
use crate::error::OptimizeError;
use crate::tool_resolver::{ExternalTool, ToolResolver};
use crate::utils::to_string_vec;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::process::Command;
use tracing::debug;

/// Runs the resolved external tools against PNG files in place.
pub struct ToolInvoker {
    /// Resolved only when the lossy stage is enabled
    pngquant: Option<PathBuf>,
    zopflipng: PathBuf,
}

impl ToolInvoker {
    /// Resolve the tools this run needs, before any worker starts.
    ///
    /// zopflipng is always required; pngquant only when `quality` is set.
    pub fn resolve(
        config: &Config,
        resolver: &dyn ToolResolver,
    ) -> Result<Self, OptimizeError> {
        let zopflipng = resolver.resolve(ExternalTool::Zopflipng).ok_or(
            OptimizeError::ToolNotFound {
                tool: "zopflipng",
                env: "ZOPFLIPNG",
            },
        )?;

        let pngquant = if config.quality.is_some() {
            Some(resolver.resolve(ExternalTool::Pngquant).ok_or(
                OptimizeError::ToolNotFound {
                    tool: "pngquant",
                    env: "PNGQUANT",
                },
            )?)
        } else {
            None
        };

        Ok(Self { pngquant, zopflipng })
    }

    /// Lossy palette quantization with pngquant, replacing `path` in place
    pub async fn quantize(&self, path: &Path, quality: u8) -> Result<(), OptimizeError> {
        let Some(pngquant) = &self.pngquant else {
            return Err(OptimizeError::ToolNotFound {
                tool: "pngquant",
                env: "PNGQUANT",
            });
        };

        let tmp = Self::stage_output(path)?;
        let quality_arg = format!("--quality={}-100", quality);
        let args = to_string_vec([
            quality_arg.as_str(),
            "--force",
            "--output",
            path_str(&tmp)?,
            path_str(path)?,
        ]);

        self.run("pngquant", pngquant, &args).await?;
        persist_over(tmp, path)
    }

    /// Lossless recompression with zopflipng, replacing `path` in place
    pub async fn recompress(&self, path: &Path, iterations: u32) -> Result<(), OptimizeError> {
        let tmp = Self::stage_output(path)?;
        let iterations_arg = format!("--iterations={}", iterations);
        let args = to_string_vec([
            iterations_arg.as_str(),
            "-y",
            path_str(path)?,
            path_str(&tmp)?,
        ]);

        self.run("zopflipng", &self.zopflipng, &args).await?;
        persist_over(tmp, path)
    }

    /// Create the temp output for a stage, in the target's own directory so
    /// the final rename never crosses a filesystem boundary.
    fn stage_output(target: &Path) -> Result<TempPath, OptimizeError> {
        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile_in(parent)?
            .into_temp_path();
        Ok(tmp)
    }

    async fn run(
        &self,
        tool: &'static str,
        executable: &Path,
        args: &[String],
    ) -> Result<(), OptimizeError> {
        debug!("Running: {} {}", executable.display(), args.join(" "));

        let start_time = std::time::Instant::now();
        let output = Command::new(executable).args(args).output().await?;
        let elapsed = start_time.elapsed();

        if output.status.success() {
            debug!("{} finished in {:?}", tool, elapsed);
            return Ok(());
        }

        // zopflipng reports most errors on stdout
        let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }

        Err(OptimizeError::ToolFailed {
            tool,
            status: output.status.to_string(),
            stderr,
        })
    }
}

fn persist_over(tmp: TempPath, target: &Path) -> Result<(), OptimizeError> {
    tmp.persist(target).map_err(|e| OptimizeError::Io(e.error))
}

fn path_str(path: &Path) -> Result<&str, OptimizeError> {
    path.to_str().ok_or_else(|| {
        OptimizeError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("non-UTF-8 path: {}", path.display()),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedResolver {
        pngquant: Option<PathBuf>,
        zopflipng: Option<PathBuf>,
    }

    impl ToolResolver for FixedResolver {
        fn resolve(&self, tool: ExternalTool) -> Option<PathBuf> {
            match tool {
                ExternalTool::Pngquant => self.pngquant.clone(),
                ExternalTool::Zopflipng => self.zopflipng.clone(),
            }
        }
    }

    #[cfg(unix)]
    fn fake_tool_script(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_resolve_requires_zopflipng() {
        let resolver = FixedResolver {
            pngquant: Some(PathBuf::from("/tools/pngquant")),
            zopflipng: None,
        };
        let err = ToolInvoker::resolve(&Config::default(), &resolver).err().unwrap();
        assert!(matches!(
            err,
            OptimizeError::ToolNotFound {
                tool: "zopflipng",
                ..
            }
        ));
    }

    #[test]
    fn test_resolve_skips_pngquant_when_lossless_only() {
        let resolver = FixedResolver {
            pngquant: None,
            zopflipng: Some(PathBuf::from("/tools/zopflipng")),
        };
        // quality unset: pngquant may be absent
        let invoker = ToolInvoker::resolve(&Config::default(), &resolver).unwrap();
        assert!(invoker.pngquant.is_none());
    }

    #[test]
    fn test_resolve_requires_pngquant_for_lossy_runs() {
        let resolver = FixedResolver {
            pngquant: None,
            zopflipng: Some(PathBuf::from("/tools/zopflipng")),
        };
        let config = Config {
            quality: Some(60),
            ..Default::default()
        };
        let err = ToolInvoker::resolve(&config, &resolver).err().unwrap();
        assert!(matches!(
            err,
            OptimizeError::ToolNotFound {
                tool: "pngquant",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_quantize_without_pngquant_is_rejected() {
        let invoker = ToolInvoker {
            pngquant: None,
            zopflipng: PathBuf::from("/tools/zopflipng"),
        };
        let err = invoker
            .quantize(Path::new("/tmp/x.png"), 60)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, OptimizeError::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recompress_replaces_file_with_tool_output() {
        let temp_dir = TempDir::new().unwrap();
        // writes fixed bytes to its output argument
        let zopflipng = fake_tool_script(
            temp_dir.path(),
            "zopflipng",
            "#!/bin/sh\nprintf smaller > \"$4\"\n",
        );
        let target = temp_dir.path().join("image.png");
        std::fs::write(&target, b"original bytes").unwrap();

        let invoker = ToolInvoker {
            pngquant: None,
            zopflipng,
        };
        invoker.recompress(&target, 15).await.unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"smaller");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recompress_passes_iterations_and_overwrite_flag() {
        let temp_dir = TempDir::new().unwrap();
        let zopflipng = fake_tool_script(
            temp_dir.path(),
            "zopflipng",
            "#!/bin/sh\necho \"$@\" > \"$(dirname \"$0\")/args.txt\"\ncp \"$3\" \"$4\"\n",
        );
        let target = temp_dir.path().join("image.png");
        std::fs::write(&target, b"png data").unwrap();

        let invoker = ToolInvoker {
            pngquant: None,
            zopflipng,
        };
        invoker.recompress(&target, 42).await.unwrap();

        let recorded = std::fs::read_to_string(temp_dir.path().join("args.txt")).unwrap();
        assert!(recorded.contains("--iterations=42"));
        assert!(recorded.contains("-y"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_quantize_passes_quality_range() {
        let temp_dir = TempDir::new().unwrap();
        let pngquant = fake_tool_script(
            temp_dir.path(),
            "pngquant",
            "#!/bin/sh\necho \"$@\" > \"$(dirname \"$0\")/args.txt\"\ncp \"$5\" \"$4\"\n",
        );
        let target = temp_dir.path().join("image.png");
        std::fs::write(&target, b"png data").unwrap();

        let invoker = ToolInvoker {
            pngquant: Some(pngquant),
            zopflipng: PathBuf::from("/unused"),
        };
        invoker.quantize(&target, 65).await.unwrap();

        let recorded = std::fs::read_to_string(temp_dir.path().join("args.txt")).unwrap();
        assert!(recorded.contains("--quality=65-100"));
        assert!(recorded.contains("--force"));
        assert!(recorded.contains("--output"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_tool_leaves_original_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let zopflipng = fake_tool_script(
            temp_dir.path(),
            "zopflipng",
            "#!/bin/sh\necho \"corrupt chunk\" >&2\nexit 1\n",
        );
        let target = temp_dir.path().join("image.png");
        std::fs::write(&target, b"original bytes").unwrap();

        let invoker = ToolInvoker {
            pngquant: None,
            zopflipng,
        };
        let err = invoker.recompress(&target, 15).await.err().unwrap();

        match err {
            OptimizeError::ToolFailed { tool, stderr, .. } => {
                assert_eq!(tool, "zopflipng");
                assert_eq!(stderr, "corrupt chunk");
            }
            other => panic!("expected tool failure, got {:?}", other),
        }
        assert_eq!(std::fs::read(&target).unwrap(), b"original bytes");

        // the stage temp file must not linger
        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_errors_on_stdout_are_captured() {
        let temp_dir = TempDir::new().unwrap();
        let zopflipng = fake_tool_script(
            temp_dir.path(),
            "zopflipng",
            "#!/bin/sh\necho \"Invalid PNG\"\nexit 1\n",
        );
        let target = temp_dir.path().join("image.png");
        std::fs::write(&target, b"data").unwrap();

        let invoker = ToolInvoker {
            pngquant: None,
            zopflipng,
        };
        let err = invoker.recompress(&target, 15).await.err().unwrap();

        match err {
            OptimizeError::ToolFailed { stderr, .. } => assert_eq!(stderr, "Invalid PNG"),
            other => panic!("expected tool failure, got {:?}", other),
        }
    }
}
