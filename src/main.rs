//! # TeenyPNG - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging con `tracing` su stderr (stdout è
//!   riservato al report `--json`)
//! - Creazione della configurazione e avvio dell'optimizer
//! - Stampa del report JSON quando richiesto
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (path, iterations, quality, size, workers, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Crea un oggetto Config con tutti i parametri
//! 4. Istanzia PngOptimizer e avvia il processo di ottimizzazione
//!
//! La run termina con exit code 0 anche quando singoli file falliscono:
//! solo gli errori fatali (opzioni invalide, path inesistente, tool
//! mancanti) terminano con exit code non-zero.
//!
//! ## Esempio di utilizzo:
//! ```bash
//! teenypng /path/to/photos --quality 70 --recursive --workers 8 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use teenypng::config::default_workers;
use teenypng::{Config, PngOptimizer};

#[derive(Parser)]
#[command(name = "teenypng")]
#[command(about = "Batch-optimize PNG files in place with pngquant and zopflipng")]
struct Args {
    /// PNG file or directory to optimize
    input_path: PathBuf,

    /// Zopflipng iterations (1-500, higher = smaller output, slower)
    #[arg(short, long, default_value = "15")]
    iterations: u32,

    /// Minimum pngquant quality (1-100); enables the lossy stage
    #[arg(short, long)]
    quality: Option<u8>,

    /// Resize to this percentage of the original dimensions (1-100)
    #[arg(short, long)]
    size: Option<u8>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Number of parallel workers (defaults to a hardware-derived count)
    #[arg(short, long)]
    workers: Option<NonZeroUsize>,

    /// Explicit pngquant executable (overrides PNGQUANT and PATH)
    #[arg(long)]
    pngquant: Option<PathBuf>,

    /// Explicit zopflipng executable (overrides ZOPFLIPNG and PATH)
    #[arg(long)]
    zopflipng: Option<PathBuf>,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging on stderr: stdout is reserved for the --json report
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let json_output = args.json;
    let config = Config {
        iterations: args.iterations,
        quality: args.quality,
        size_percent: args.size,
        recursive: args.recursive,
        workers: args.workers.unwrap_or_else(default_workers),
        json_output,
        pngquant_path: args.pngquant,
        zopflipng_path: args.zopflipng,
    };

    let optimizer = PngOptimizer::new(config)?;
    let report = optimizer.run(&args.input_path).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
