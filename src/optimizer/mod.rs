//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `png_optimizer`: Orchestratore principale
//! - `worker_pool`: Pool di worker con concorrenza limitata
//! - `pipeline_runner`: Pipeline per singoli file

pub mod pipeline_runner;
pub mod png_optimizer;
pub mod worker_pool;

pub use pipeline_runner::{Job, PipelineRunner};
pub use png_optimizer::PngOptimizer;
pub use worker_pool::WorkerPool;
