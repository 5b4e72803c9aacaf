//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di ottimizzazione
//! - Fornisce validazione robusta dei parametri di input
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `iterations`: Iterazioni zopflipng (1-500, default: 15)
//! - `quality`: Qualità minima pngquant (1-100, default: None = skip lossy)
//! - `size_percent`: Resize percentuale (1-100, default: None = skip resize)
//! - `recursive`: Scansione ricorsiva delle directory (default: false)
//! - `workers`: Numero di worker paralleli (default: CPU logiche - 4, minimo 1)
//! - `json_output`: Report finale come JSON su stdout (default: false)
//! - `pngquant_path` / `zopflipng_path`: Override espliciti dei tool esterni
//!
//! ## Validazione:
//! - Controlla che iterations sia 1-500
//! - Controlla che quality sia 1-100 quando presente
//! - Controlla che size_percent sia 1-100 quando presente
//! - workers è `NonZeroUsize`: il caso zero non è rappresentabile
//!
//! ## Esempio:
//! ```rust
//! use teenypng::config::Config;
//!
//! let config = Config {
//!     iterations: 30,
//!     quality: Some(70),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::error::OptimizeError;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Configuration for a PNG optimization run
#[derive(Debug, Clone)]
pub struct Config {
    /// Zopflipng iteration count (1-500, higher = smaller output, slower)
    pub iterations: u32,
    /// Minimum pngquant quality (1-100); None skips the lossy stage
    pub quality: Option<u8>,
    /// Resize percentage (1-100); None skips the resize stage
    pub size_percent: Option<u8>,
    /// Recurse into subdirectories when the input is a directory
    pub recursive: bool,
    /// Number of parallel workers
    pub workers: NonZeroUsize,
    /// Print the final report as JSON on stdout
    pub json_output: bool,
    /// Explicit pngquant executable (overrides env and PATH lookup)
    pub pngquant_path: Option<PathBuf>,
    /// Explicit zopflipng executable (overrides env and PATH lookup)
    pub zopflipng_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iterations: 15,
            quality: None,
            size_percent: None,
            recursive: false,
            workers: default_workers(),
            json_output: false,
            pngquant_path: None,
            zopflipng_path: None,
        }
    }
}

/// Default worker count: logical CPUs minus four, never below one.
pub fn default_workers() -> NonZeroUsize {
    let cpus = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    NonZeroUsize::new(cpus.saturating_sub(4)).unwrap_or(NonZeroUsize::MIN)
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.iterations == 0 || self.iterations > 500 {
            return Err(OptimizeError::Validation {
                field: "iterations",
                value: self.iterations,
                min: 1,
                max: 500,
            });
        }

        if let Some(quality) = self.quality {
            if quality == 0 || quality > 100 {
                return Err(OptimizeError::Validation {
                    field: "quality",
                    value: quality as u32,
                    min: 1,
                    max: 100,
                });
            }
        }

        if let Some(size_percent) = self.size_percent {
            if size_percent == 0 || size_percent > 100 {
                return Err(OptimizeError::Validation {
                    field: "size",
                    value: size_percent as u32,
                    min: 1,
                    max: 100,
                });
            }
        }

        Ok(())
    }
}
