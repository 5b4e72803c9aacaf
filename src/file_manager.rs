//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei PNG e le operazioni sui file.
//!
//! ## Responsabilità:
//! - Discovery dei file PNG (file singolo o directory, opzionalmente ricorsiva)
//! - Riconoscimento PNG per estensione (case-insensitive) e per signature
//! - Utilità per calcoli dimensioni e percentuali
//! - Formattazione human-readable delle dimensioni
//!
//! ## Discovery:
//! - `discover_pngs()`: restituisce una sequenza lazy e ordinata di path PNG
//! - Input file: esattamente quel path (errore tipizzato se non è un `.png`)
//! - Input directory: scan ordinato, solo `.png`, ricorsivo su richiesta
//! - Path inesistente: `PathNotFound`, mai una sequenza vuota silenziosa
//!
//! ## Utilità:
//! - `has_png_signature()`: controlla i primi 8 byte del file
//! - `format_size()`: converte bytes in formato leggibile (KB, MB, GB)
//! - `calculate_reduction()`: calcola percentuale di riduzione

use crate::error::OptimizeError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;
use walkdir::WalkDir;

/// First eight bytes of every PNG file.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Manages file operations and discovery
pub struct FileManager;

/// Lazy, single-pass sequence of PNG paths produced by discovery.
///
/// Directory scans are sorted by file name at every level, so the order is
/// deterministic for identical inputs.
pub struct PngFiles {
    inner: Inner,
}

enum Inner {
    Single(Option<PathBuf>),
    Walk(walkdir::IntoIter),
}

impl Iterator for PngFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        match &mut self.inner {
            Inner::Single(slot) => slot.take(),
            Inner::Walk(walker) => {
                for entry in walker.by_ref() {
                    let Ok(entry) = entry else { continue };
                    if entry.file_type().is_file() && FileManager::is_png_path(entry.path()) {
                        return Some(entry.into_path());
                    }
                }
                None
            }
        }
    }
}

impl FileManager {
    /// Find the PNG files to optimize under `root`.
    ///
    /// A file root yields exactly that path (or `NotAPng` if it does not
    /// carry a `.png` extension); a directory root yields every `.png`
    /// inside it, descending into subdirectories only when `recursive` is
    /// set. Non-PNG directory entries are skipped without comment.
    pub fn discover_pngs(root: &Path, recursive: bool) -> Result<PngFiles, OptimizeError> {
        if !root.exists() {
            return Err(OptimizeError::PathNotFound(root.to_path_buf()));
        }

        if root.is_file() {
            if !Self::is_png_path(root) {
                return Err(OptimizeError::NotAPng(root.to_path_buf()));
            }
            return Ok(PngFiles {
                inner: Inner::Single(Some(root.to_path_buf())),
            });
        }

        let mut walker = WalkDir::new(root).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        Ok(PngFiles {
            inner: Inner::Walk(walker.into_iter()),
        })
    }

    /// Check if a path looks like a PNG by extension (case-insensitive)
    pub fn is_png_path(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            ext.to_string_lossy().to_lowercase() == "png"
        } else {
            false
        }
    }

    /// Check the PNG magic bytes at the start of a file.
    ///
    /// A file too short to hold the signature is simply not a PNG; only
    /// opening or reading failures are reported as errors.
    pub async fn has_png_signature(path: &Path) -> Result<bool, OptimizeError> {
        let mut file = fs::File::open(path).await?;
        let mut magic = [0u8; 8];
        match file.read_exact(&mut magic).await {
            Ok(_) => Ok(magic == PNG_SIGNATURE),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64, OptimizeError> {
        let metadata = fs::metadata(path).await?;
        Ok(metadata.len())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
