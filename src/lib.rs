//! # TeenyPNG Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `file_manager`: Discovery dei PNG e operazioni sui file
//! - `tool_resolver`: Risoluzione dei tool esterni (override, env, PATH)
//! - `tool_invoker`: Esecuzione di pngquant e zopflipng
//! - `resize`: Stage di ridimensionamento in-process
//! - `report`: Outcome per-file e report aggregato
//! - `optimizer`: Orchestratore, worker pool e pipeline per-file
//! - `progress`: Progress bar della run
//! - `utils`: Helper condivisi
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use teenypng::{Config, PngOptimizer};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let optimizer = PngOptimizer::new(config)?;
//! let report = optimizer.run(std::path::Path::new("photos")).await?;
//! println!("{}", report.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod optimizer;
pub mod progress;
pub mod report;
pub mod resize;
pub mod tool_invoker;
pub mod tool_resolver;
pub mod utils;

pub use config::Config;
pub use error::OptimizeError;
pub use optimizer::PngOptimizer;
pub use report::{Outcome, Report, Stage, Status};
