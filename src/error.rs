//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//! - Supporta error chaining per mantenere il contesto degli errori
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori di decodifica/encoding nello stage di resize
//! - `Validation`: Parametri della pipeline fuori range
//! - `PathNotFound`: Input path inesistente
//! - `NotAPng`: File passato esplicitamente che non è un PNG
//! - `ToolNotFound`: Tool esterno mancante (pngquant, zopflipng)
//! - `ToolFailed`: Tool esterno terminato con exit status non-zero
//!
//! ## Vantaggi:
//! - Errori tipizzati per handling specifico
//! - Messaggi chiari per debugging
//! - Automatic conversion da errori standard
//! - Integration con `anyhow` per error propagation

use std::path::PathBuf;

/// Custom error types for PNG optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{field} must be between {min} and {max} (got {value})")]
    Validation {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Input path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Not a PNG file: {}", .0.display())]
    NotAPng(PathBuf),

    #[error("{tool} not found (set {env} or install it in PATH)")]
    ToolNotFound {
        tool: &'static str,
        env: &'static str,
    },

    #[error("{tool} failed with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },
}
