//! # Bounded Worker Pool
//!
//! Pool di worker basato su semaforo: al massimo `workers` job in volo,
//! i successivi vengono presi appena si libera uno slot. Ogni job produce
//! esattamente un `Outcome`, anche se il suo task va in panic, e il
//! fallimento di un job non tocca mai i fratelli.

use crate::optimizer::pipeline_runner::{Job, PipelineRunner};
use crate::progress::ProgressManager;
use crate::report::Outcome;
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::error;

/// Semaphore-bounded pool driving the per-file pipeline.
pub struct WorkerPool {
    runner: Arc<PipelineRunner>,
    workers: NonZeroUsize,
}

impl WorkerPool {
    pub fn new(runner: Arc<PipelineRunner>, workers: NonZeroUsize) -> Self {
        Self { runner, workers }
    }

    /// Run every job to completion and collect one outcome per job.
    ///
    /// Outcomes arrive in completion order, which is not deterministic.
    pub async fn run_all(
        &self,
        jobs: Vec<Job>,
        progress: &ProgressManager,
    ) -> Result<Vec<Outcome>> {
        // Semaphore::new panics above MAX_PERMITS
        let permits = self.workers.get().min(Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = FuturesUnordered::new();

        for job in jobs {
            let permit = semaphore.clone().acquire_owned().await?;
            let runner = self.runner.clone();
            let progress = progress.clone();
            let path = job.path.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit; // released when the task finishes
                let outcome = runner.run(job).await;
                progress.update(&outcome.progress_label());
                outcome
            });

            // keep the path next to the handle so a panicked task still
            // yields an outcome for its job
            tasks.push(async move { (path, handle.await) });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some((path, joined)) = tasks.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Worker for {} aborted: {}", path.display(), e);
                    let outcome =
                        Outcome::failed(path, None, 0, 0, format!("worker aborted: {}", e));
                    progress.update(&outcome.progress_label());
                    outcome
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
