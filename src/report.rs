//! # Outcome and Report Module
//!
//! Questo modulo definisce il risultato per-file e il report aggregato.
//!
//! ## Responsabilità:
//! - `Outcome`: esito terminale di un singolo file (status, stage raggiunto,
//!   byte prima/dopo, errore)
//! - `Report`: statistiche aggregate della run (contatori, failures,
//!   byte risparmiati)
//! - `ReportAggregator`: fold puro degli outcome, senza I/O
//!
//! ## Invarianti:
//! - ogni file scoperto produce esattamente un `Outcome`
//! - `total == succeeded + skipped + failed`
//! - l'aggregatore è consumato da un solo consumer, l'ordine di arrivo
//!   non cambia i totali

use crate::file_manager::FileManager;
use serde::Serialize;
use std::path::PathBuf;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Resize,
    Quantize,
    Recompress,
}

/// Terminal classification of a processed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    SkippedNotPng,
    Failed,
}

/// What happened to one file.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub path: PathBuf,
    pub status: Status,
    /// Last stage that ran; None when the file was rejected before any stage
    pub stage_reached: Option<Stage>,
    pub original_bytes: u64,
    pub final_bytes: u64,
    /// Present only for failed outcomes
    pub error: Option<String>,
}

impl Outcome {
    /// Every stage ran; recompression is always the last one.
    pub fn success(path: PathBuf, original_bytes: u64, final_bytes: u64) -> Self {
        Self {
            path,
            status: Status::Success,
            stage_reached: Some(Stage::Recompress),
            original_bytes,
            final_bytes,
            error: None,
        }
    }

    /// The signature guard rejected the file before any stage ran.
    pub fn skipped_not_png(path: PathBuf, original_bytes: u64) -> Self {
        Self {
            path,
            status: Status::SkippedNotPng,
            stage_reached: None,
            original_bytes,
            final_bytes: original_bytes,
            error: None,
        }
    }

    pub fn failed(
        path: PathBuf,
        stage_reached: Option<Stage>,
        original_bytes: u64,
        final_bytes: u64,
        error: String,
    ) -> Self {
        Self {
            path,
            status: Status::Failed,
            stage_reached,
            original_bytes,
            final_bytes,
            error: Some(error),
        }
    }

    /// One-line label for the progress bar
    pub fn progress_label(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());

        match self.status {
            Status::Success => format!(
                "[OK] {}: {:.1}% saved",
                name,
                FileManager::calculate_reduction(self.original_bytes, self.final_bytes)
            ),
            Status::SkippedNotPng => format!("[SKIP] {}: not a PNG", name),
            Status::Failed => format!(
                "[ERROR] {}: {}",
                name,
                self.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// A failed file and the reason, kept for the final report.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    /// Stage that was running when the job failed; None when it never started
    pub stage: Option<Stage>,
    pub error: String,
}

/// Aggregate statistics for a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub original_bytes: u64,
    pub final_bytes: u64,
    pub failures: Vec<Failure>,
}

impl Report {
    pub fn bytes_saved(&self) -> u64 {
        self.original_bytes.saturating_sub(self.final_bytes)
    }

    pub fn reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.original_bytes, self.final_bytes)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Optimized: {} | Skipped: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.total,
            self.succeeded,
            self.skipped,
            self.failed,
            FileManager::format_size(self.bytes_saved()),
            self.reduction_percent()
        )
    }
}

/// Folds outcomes into a `Report`. Pure bookkeeping, no I/O.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    total: usize,
    succeeded: usize,
    skipped: usize,
    failed: usize,
    original_bytes: u64,
    final_bytes: u64,
    failures: Vec<Failure>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the running totals.
    pub fn observe(&mut self, outcome: &Outcome) {
        self.total += 1;
        self.original_bytes += outcome.original_bytes;
        self.final_bytes += outcome.final_bytes;

        match outcome.status {
            Status::Success => self.succeeded += 1,
            Status::SkippedNotPng => self.skipped += 1,
            Status::Failed => {
                self.failed += 1;
                self.failures.push(Failure {
                    path: outcome.path.clone(),
                    stage: outcome.stage_reached,
                    error: outcome
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string()),
                });
            }
        }
    }

    pub fn finish(self) -> Report {
        Report {
            total: self.total,
            succeeded: self.succeeded,
            skipped: self.skipped,
            failed: self.failed,
            original_bytes: self.original_bytes,
            final_bytes: self.final_bytes,
            failures: self.failures,
        }
    }
}
