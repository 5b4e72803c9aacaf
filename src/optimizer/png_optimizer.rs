//! # PNG Optimizer Main Orchestrator
//!
//! Orchestratore principale: valida la configurazione, risolve i tool
//! esterni prima che parta qualsiasi worker, scopre i file, esegue il
//! pool e aggrega gli outcome nel report finale.

use crate::config::Config;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::optimizer::pipeline_runner::{Job, PipelineRunner};
use crate::optimizer::worker_pool::WorkerPool;
use crate::progress::ProgressManager;
use crate::report::{Report, ReportAggregator};
use crate::tool_invoker::ToolInvoker;
use crate::tool_resolver::{ToolPathResolver, ToolResolver};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Batch PNG optimizer.
pub struct PngOptimizer {
    config: Config,
    invoker: Arc<ToolInvoker>,
}

impl PngOptimizer {
    /// Validate the configuration and resolve the external tools.
    ///
    /// Both happen here so a bad option or a missing tool fails the run
    /// before any file is touched.
    pub fn new(config: Config) -> Result<Self, OptimizeError> {
        let resolver = ToolPathResolver::from_config(&config);
        Self::with_resolver(config, &resolver)
    }

    /// Same as `new` with an injected resolver (used by tests).
    pub fn with_resolver(
        config: Config,
        resolver: &dyn ToolResolver,
    ) -> Result<Self, OptimizeError> {
        config.validate()?;
        let invoker = ToolInvoker::resolve(&config, resolver)?;
        Ok(Self {
            config,
            invoker: Arc::new(invoker),
        })
    }

    /// Run the whole batch: discover, process, aggregate.
    pub async fn run(&self, input_path: &Path) -> Result<Report> {
        let start_time = std::time::Instant::now();

        info!("Starting PNG optimization in: {}", input_path.display());
        self.log_configuration();

        let files: Vec<PathBuf> =
            FileManager::discover_pngs(input_path, self.config.recursive)?.collect();

        if files.is_empty() {
            info!("No PNG files found to process");
            return Ok(ReportAggregator::new().finish());
        }

        info!("Found {} PNG files to process", files.len());

        let progress = if self.config.json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(files.len() as u64)
        };

        let jobs: Vec<Job> = files
            .into_iter()
            .map(|path| Job {
                path,
                options: self.config.clone(),
            })
            .collect();

        let runner = Arc::new(PipelineRunner::new(self.invoker.clone()));
        let pool = WorkerPool::new(runner, self.config.workers);
        let outcomes = pool.run_all(jobs, &progress).await?;

        let mut aggregator = ReportAggregator::new();
        for outcome in &outcomes {
            aggregator.observe(outcome);
        }
        let report = aggregator.finish();

        progress.finish(&report.format_summary());
        self.print_final_stats(&report, start_time.elapsed().as_secs_f64());

        Ok(report)
    }

    /// Logga configurazione (solo se non JSON mode)
    fn log_configuration(&self) {
        if self.config.json_output {
            return;
        }

        if let Some(percent) = self.config.size_percent {
            info!("Resize: {}% of original dimensions", percent);
        }

        match self.config.quality {
            Some(quality) => info!(
                "Mode: lossy quantization (quality {}-100) + lossless recompression",
                quality
            ),
            None => info!("Mode: lossless recompression only"),
        }

        info!("Zopflipng iterations: {}", self.config.iterations);
        info!("Workers: {}", self.config.workers);
    }

    /// Stampa statistiche finali
    fn print_final_stats(&self, report: &Report, duration: f64) {
        if self.config.json_output {
            return;
        }

        info!("=== Optimization Complete ===");
        info!("Files processed this run: {}", report.total);
        info!("Files optimized this run: {}", report.succeeded);
        info!("Files skipped this run: {}", report.skipped);
        info!("Errors this run: {}", report.failed);
        for failure in &report.failures {
            match failure.stage {
                Some(stage) => warn!(
                    "  ❌ {} [{:?}]: {}",
                    failure.path.display(),
                    stage,
                    failure.error
                ),
                None => warn!("  ❌ {}: {}", failure.path.display(), failure.error),
            }
        }
        info!(
            "Bytes saved this run: {}",
            FileManager::format_size(report.bytes_saved())
        );
        info!(
            "Average reduction this run: {:.2}%",
            report.reduction_percent()
        );
        info!("Total time: {:.2}s", duration);
        info!("🎉 PNG processing complete!");
    }
}
