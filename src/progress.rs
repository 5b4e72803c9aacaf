//! # Progress Tracking Module
//!
//! Questo modulo gestisce il progress tracking della run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Un update per ogni file completato, con messaggi `[OK]/[SKIP]/[ERROR]`
//! - Modalità nascosta per l'output JSON (la barra sporcherebbe stdout)
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================>---------------] 93/150 (62%) [OK] photo.png: 45.2% saved
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a PNG optimization run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that draws nothing, for JSON output mode
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_advances_position() {
        let progress = ProgressManager::new(3);
        progress.update("[OK] a.png: 10.0% saved");
        progress.update("[SKIP] b.png: not a PNG");
        assert_eq!(progress.bar.position(), 2);
        progress.finish("done");
    }

    #[test]
    fn test_hidden_manager_accepts_updates() {
        let progress = ProgressManager::hidden();
        progress.update("[OK] a.png: 10.0% saved");
        progress.finish("done");
        assert_eq!(progress.bar.position(), 1);
    }
}
