//! # Image Resize Module
//!
//! Questo modulo gestisce il ridimensionamento percentuale dei PNG.
//!
//! ## Caratteristiche
//! - **Filtro Lanczos**: migliore qualità per il downscaling
//! - **In-process**: decodifica e ri-encoding con la crate `image`
//! - **Aritmetica troncante**: dimensioni = (originale * percento) / 100,
//!   mai sotto 1 pixel
//! - **Sostituzione atomica**: output su file temporaneo nella stessa
//!   directory, poi rename sull'originale
//!
//! Il lavoro CPU-bound gira dentro `spawn_blocking` per non bloccare i
//! worker async.

use crate::error::OptimizeError;
use image::imageops::FilterType;
use std::path::Path;
use tracing::debug;

/// Percentage resize for PNG files, in place.
pub struct ImageResizer;

impl ImageResizer {
    /// Scale the PNG at `path` to `percent` of its dimensions, replacing it.
    pub async fn resize_by_percent(path: &Path, percent: u8) -> Result<(), OptimizeError> {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::resize_blocking(&owned, percent))
            .await
            .map_err(|e| {
                OptimizeError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
            })?
    }

    fn resize_blocking(path: &Path, percent: u8) -> Result<(), OptimizeError> {
        let img = image::open(path)?;
        let (width, height) = (img.width(), img.height());
        let new_width = scaled_dimension(width, percent);
        let new_height = scaled_dimension(height, percent);

        debug!(
            "📏 Resizing {} from {}x{} to {}x{}",
            path.display(),
            width,
            height,
            new_width,
            new_height
        );

        let resized = img.resize_exact(new_width, new_height, FilterType::Lanczos3);

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile_in(parent)?
            .into_temp_path();
        resized.save_with_format(&tmp, image::ImageFormat::Png)?;
        tmp.persist(path).map_err(|e| OptimizeError::Io(e.error))?;

        Ok(())
    }
}

/// Truncating percentage scale, clamped so no dimension collapses to zero.
fn scaled_dimension(value: u32, percent: u8) -> u32 {
    ((value as u64 * percent as u64) / 100).max(1) as u32
}
