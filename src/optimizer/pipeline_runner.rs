//! # Per-File Pipeline Runner
//!
//! Worker che porta un singolo file al suo esito terminale:
//! guard sulla signature PNG, poi resize opzionale, quantizzazione
//! opzionale e ricompressione finale. Il primo stage che fallisce
//! interrompe la pipeline; ogni errore viene catturato e trasformato
//! in un `Outcome`, mai propagato.

use crate::config::Config;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::report::{Outcome, Stage};
use crate::resize::ImageResizer;
use crate::tool_invoker::ToolInvoker;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// One unit of work: a discovered path plus the run options.
#[derive(Debug, Clone)]
pub struct Job {
    pub path: PathBuf,
    pub options: Config,
}

/// Drives the stage pipeline for single files.
pub struct PipelineRunner {
    invoker: Arc<ToolInvoker>,
}

impl PipelineRunner {
    pub fn new(invoker: Arc<ToolInvoker>) -> Self {
        Self { invoker }
    }

    /// Process one job to its terminal outcome.
    ///
    /// Never returns an error: anything that goes wrong with this file is
    /// folded into a `Failed` outcome so sibling jobs are unaffected.
    pub async fn run(&self, job: Job) -> Outcome {
        let original_bytes = match FileManager::file_size(&job.path).await {
            Ok(size) => size,
            Err(e) => {
                warn!("❌ {}: {}", job.path.display(), e);
                return Outcome::failed(job.path, None, 0, 0, e.to_string());
            }
        };

        match FileManager::has_png_signature(&job.path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Skipping {}: no PNG signature", job.path.display());
                return Outcome::skipped_not_png(job.path, original_bytes);
            }
            Err(e) => {
                warn!("❌ {}: {}", job.path.display(), e);
                return Outcome::failed(
                    job.path,
                    None,
                    original_bytes,
                    original_bytes,
                    e.to_string(),
                );
            }
        }

        match self.run_stages(&job).await {
            Ok(()) => {
                let final_bytes = FileManager::file_size(&job.path)
                    .await
                    .unwrap_or(original_bytes);
                Outcome::success(job.path, original_bytes, final_bytes)
            }
            Err((stage, e)) => {
                warn!("❌ {} failed during {:?}: {}", job.path.display(), stage, e);
                // failed stages never replace the file, so whatever is on
                // disk is the output of the last completed stage
                let final_bytes = FileManager::file_size(&job.path)
                    .await
                    .unwrap_or(original_bytes);
                Outcome::failed(
                    job.path,
                    Some(stage),
                    original_bytes,
                    final_bytes,
                    e.to_string(),
                )
            }
        }
    }

    /// The stage chain; the first failing stage aborts the rest.
    async fn run_stages(&self, job: &Job) -> Result<(), (Stage, OptimizeError)> {
        if let Some(percent) = job.options.size_percent {
            ImageResizer::resize_by_percent(&job.path, percent)
                .await
                .map_err(|e| (Stage::Resize, e))?;
            debug!("📏 Resized {} to {}%", job.path.display(), percent);
        }

        if let Some(quality) = job.options.quality {
            self.invoker
                .quantize(&job.path, quality)
                .await
                .map_err(|e| (Stage::Quantize, e))?;
            debug!("🎨 Quantized {} (quality {}-100)", job.path.display(), quality);
        }

        self.invoker
            .recompress(&job.path, job.options.iterations)
            .await
            .map_err(|e| (Stage::Recompress, e))?;
        debug!(
            "✅ Recompressed {} ({} iterations)",
            job.path.display(),
            job.options.iterations
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_manager::PNG_SIGNATURE;
    use crate::report::Status;
    use crate::tool_resolver::{ExternalTool, ToolResolver};
    use std::path::Path;
    use tempfile::TempDir;

    struct FixedResolver {
        pngquant: Option<PathBuf>,
        zopflipng: Option<PathBuf>,
    }

    impl ToolResolver for FixedResolver {
        fn resolve(&self, tool: ExternalTool) -> Option<PathBuf> {
            match tool {
                ExternalTool::Pngquant => self.pngquant.clone(),
                ExternalTool::Zopflipng => self.zopflipng.clone(),
            }
        }
    }

    fn runner_with(
        config: &Config,
        pngquant: Option<PathBuf>,
        zopflipng: PathBuf,
    ) -> PipelineRunner {
        let resolver = FixedResolver {
            pngquant,
            zopflipng: Some(zopflipng),
        };
        let invoker = ToolInvoker::resolve(config, &resolver).unwrap();
        PipelineRunner::new(Arc::new(invoker))
    }

    /// Signature plus junk body: passes the guard, fails any decode.
    fn write_signature_only(path: &Path) {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"not really image data");
        std::fs::write(path, bytes).unwrap();
    }

    #[cfg(unix)]
    fn fake_tool_script(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[tokio::test]
    async fn test_non_png_content_is_skipped_before_any_stage() {
        let temp_dir = TempDir::new().unwrap();
        let fake = temp_dir.path().join("fake.png");
        std::fs::write(&fake, b"GIF89a not a png").unwrap();

        let config = Config::default();
        // bogus tool path: the pipeline must never reach it
        let runner = runner_with(&config, None, PathBuf::from("/no/such/zopflipng"));
        let outcome = runner
            .run(Job {
                path: fake.clone(),
                options: config,
            })
            .await;

        assert_eq!(outcome.status, Status::SkippedNotPng);
        assert_eq!(outcome.stage_reached, None);
        assert_eq!(std::fs::read(&fake).unwrap(), b"GIF89a not a png");
    }

    #[tokio::test]
    async fn test_vanished_file_fails_without_reaching_stages() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("gone.png");

        let config = Config::default();
        let runner = runner_with(&config, None, PathBuf::from("/no/such/zopflipng"));
        let outcome = runner
            .run(Job {
                path: gone,
                options: config,
            })
            .await;

        assert_eq!(outcome.status, Status::Failed);
        assert_eq!(outcome.stage_reached, None);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_undecodable_png_fails_at_resize() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("broken.png");
        write_signature_only(&png);
        let before = std::fs::read(&png).unwrap();

        let config = Config {
            size_percent: Some(50),
            ..Default::default()
        };
        let runner = runner_with(&config, None, PathBuf::from("/no/such/zopflipng"));
        let outcome = runner
            .run(Job {
                path: png.clone(),
                options: config,
            })
            .await;

        assert_eq!(outcome.status, Status::Failed);
        assert_eq!(outcome.stage_reached, Some(Stage::Resize));
        // the failing stage left the file alone
        assert_eq!(std::fs::read(&png).unwrap(), before);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lossless_run_reaches_recompress() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("photo.png");
        write_signature_only(&png);

        let zopflipng = fake_tool_script(
            temp_dir.path(),
            "zopflipng",
            "#!/bin/sh\ncp \"$3\" \"$4\"\n",
        );
        let config = Config::default();
        let runner = runner_with(&config, None, zopflipng);
        let outcome = runner
            .run(Job {
                path: png,
                options: config,
            })
            .await;

        assert_eq!(outcome.status, Status::Success);
        assert_eq!(outcome.stage_reached, Some(Stage::Recompress));
        assert_eq!(outcome.original_bytes, outcome.final_bytes);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_quantize_runs_only_when_quality_is_set() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("photo.png");
        write_signature_only(&png);

        let marker = temp_dir.path().join("pngquant-ran");
        let pngquant = fake_tool_script(
            temp_dir.path(),
            "pngquant",
            &format!(
                "#!/bin/sh\ntouch \"{}\"\ncp \"$5\" \"$4\"\n",
                marker.display()
            ),
        );
        let zopflipng = fake_tool_script(
            temp_dir.path(),
            "zopflipng",
            "#!/bin/sh\ncp \"$3\" \"$4\"\n",
        );

        let lossless = Config::default();
        let runner = runner_with(&lossless, Some(pngquant.clone()), zopflipng.clone());
        runner
            .run(Job {
                path: png.clone(),
                options: lossless,
            })
            .await;
        assert!(!marker.exists());

        let lossy = Config {
            quality: Some(60),
            ..Default::default()
        };
        let runner = runner_with(&lossy, Some(pngquant), zopflipng);
        let outcome = runner
            .run(Job {
                path: png,
                options: lossy,
            })
            .await;
        assert!(marker.exists());
        assert_eq!(outcome.status, Status::Success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_quantize_short_circuits_recompress() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("photo.png");
        write_signature_only(&png);

        let marker = temp_dir.path().join("zopflipng-ran");
        let pngquant = fake_tool_script(
            temp_dir.path(),
            "pngquant",
            "#!/bin/sh\necho \"quality too low\" >&2\nexit 99\n",
        );
        let zopflipng = fake_tool_script(
            temp_dir.path(),
            "zopflipng",
            &format!(
                "#!/bin/sh\ntouch \"{}\"\ncp \"$3\" \"$4\"\n",
                marker.display()
            ),
        );

        let config = Config {
            quality: Some(90),
            ..Default::default()
        };
        let runner = runner_with(&config, Some(pngquant), zopflipng);
        let outcome = runner
            .run(Job {
                path: png,
                options: config,
            })
            .await;

        assert_eq!(outcome.status, Status::Failed);
        assert_eq!(outcome.stage_reached, Some(Stage::Quantize));
        assert!(outcome.error.as_deref().unwrap().contains("quality too low"));
        assert!(!marker.exists());
    }
}
