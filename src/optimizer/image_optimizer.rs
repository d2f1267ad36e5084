//! # Image Optimizer Orchestrator
//!
//! Orchestratore principale: pianifica i job di tutte le collection,
//! li esegue uno alla volta nell'ordine di discovery e riporta i totali.
//!
//! Un errore dell'encoder interrompe il run: gli output già promossi
//! restano su disco, nessun rollback.

use crate::{
    config::{Collection, Config},
    encoder::ImageEncoder,
    json_output::JsonMessage,
    optimizer::{
        planner::{Job, JobPlanner},
        progress_tracker::ProgressTracker,
        promoter::{PromotionSettings, Promoter},
    },
    progress::OptimizationStats,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// How a run ended (fatal errors are returned as `Err`)
#[derive(Debug)]
pub enum RunOutcome {
    /// No image in any input directory
    NoImages { inputs: Vec<PathBuf> },
    /// Dry run: jobs were only planned
    Planned(Vec<Job>),
    /// Every job ran
    Completed(OptimizationStats),
}

/// Runs every collection of a [`Config`] through one encoder
pub struct ImageOptimizer<E> {
    config: Config,
    root: PathBuf,
    collections: Vec<Collection>,
    planner: JobPlanner,
    encoder: E,
}

impl<E: ImageEncoder> ImageOptimizer<E> {
    /// Relative collection paths are resolved against `root`
    pub fn new(config: Config, root: &Path, encoder: E) -> Self {
        let collections = config
            .collections
            .iter()
            .map(|c| c.resolved(root))
            .collect();
        let planner = JobPlanner::new(config.image_extensions.clone());

        Self {
            config,
            root: root.to_path_buf(),
            collections,
            planner,
            encoder,
        }
    }

    /// Input directories, in processing order
    pub fn inputs(&self) -> Vec<PathBuf> {
        self.collections.iter().map(|c| c.input.clone()).collect()
    }

    /// Plan the jobs of every collection, in order
    pub fn plan(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();
        for collection in &self.collections {
            let planned = self.planner.plan(&collection.input, &collection.output)?;
            debug!("{}: {} job(s)", collection.name, planned.len());
            jobs.extend(planned);
        }
        Ok(jobs)
    }

    /// Esegue il processo di ottimizzazione
    pub async fn run(&self) -> Result<RunOutcome> {
        let start_time = Instant::now();
        self.log_configuration();

        let jobs = self.plan()?;
        if jobs.is_empty() {
            self.handle_no_images(start_time);
            return Ok(RunOutcome::NoImages { inputs: self.inputs() });
        }

        if self.config.dry_run {
            self.print_plan(&jobs);
            return Ok(RunOutcome::Planned(jobs));
        }

        let mut tracker = ProgressTracker::new(&self.root, jobs.len(), self.config.json_output);
        tracker.start(self.inputs(), jobs.len(), &self.config);

        let promoter = Promoter::new(&self.encoder, PromotionSettings::from(&self.config));
        for job in &jobs {
            match promoter.promote(job).await {
                Ok(report) => tracker.record(&report),
                Err(e) => {
                    if self.config.json_output {
                        JsonMessage::error(
                            format!("Failed to optimize {}", job.source().display()),
                            Some(format!("{e:#}")),
                        )
                        .emit();
                    }
                    return Err(e.context(format!("Failed to optimize {}", job.source().display())));
                }
            }
        }

        let stats = tracker.finish(start_time.elapsed().as_secs_f64());
        Ok(RunOutcome::Completed(stats))
    }

    fn log_configuration(&self) {
        info!(
            "Max dimension: {}px | JPEG quality: {} | Overwrite: {} | Encoder: {}",
            self.config.max_dimension,
            self.config.jpeg_quality,
            self.config.overwrite,
            self.encoder.name()
        );
        for collection in &self.collections {
            info!(
                "{}: {} -> {}",
                collection.name,
                collection.input.display(),
                collection.output.display()
            );
        }
        if self.config.dry_run {
            info!("Dry run mode: No files will be modified");
        }
    }

    fn handle_no_images(&self, start_time: Instant) {
        eprintln!("No images found in:");
        for input in self.inputs() {
            eprintln!("- {}", input.display());
        }
        if self.config.json_output {
            JsonMessage::complete(&OptimizationStats::new(), start_time.elapsed().as_secs_f64()).emit();
        }
    }

    fn print_plan(&self, jobs: &[Job]) {
        let relative = |p: &Path| p.strip_prefix(&self.root).unwrap_or(p).display().to_string();

        println!("Planned {} image(s):", jobs.len());
        for job in jobs {
            println!(
                "- {} → {}  [{}]",
                relative(job.source()),
                relative(job.destination()),
                job.format()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::EncodeRequest;
    use crate::error::OptimizeError;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    /// Writes half of the source size; fails on the n-th call when asked to
    struct HalvingEncoder {
        calls: Cell<usize>,
        fail_on: Option<usize>,
    }

    impl HalvingEncoder {
        fn new() -> Self {
            Self { calls: Cell::new(0), fail_on: None }
        }
    }

    impl ImageEncoder for HalvingEncoder {
        fn name(&self) -> &'static str {
            "halving"
        }

        async fn encode(&self, request: &EncodeRequest<'_>) -> Result<(), OptimizeError> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if self.fail_on == Some(call) {
                return Err(OptimizeError::EncoderFailed {
                    command: "halving".to_string(),
                    stdout: String::new(),
                    stderr: "bad input".to_string(),
                });
            }
            let size = fs::metadata(request.source)?.len() as usize / 2;
            fs::write(request.output, vec![0u8; size])?;
            Ok(())
        }
    }

    fn write(path: &Path, size: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![1u8; size]).unwrap();
    }

    fn config() -> Config {
        Config {
            json_output: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_runs_both_collections_in_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("artwork/_raw/logo.png"), 1_000);
        write(&root.join("photos/_raw/img.HEIC"), 4_000);

        let optimizer = ImageOptimizer::new(config(), root, HalvingEncoder::new());
        let jobs = optimizer.plan().unwrap();
        assert_eq!(jobs[0].destination(), root.join("artwork/logo.png"));
        assert_eq!(jobs[1].destination(), root.join("photos/img.jpg"));

        match optimizer.run().await.unwrap() {
            RunOutcome::Completed(stats) => {
                assert_eq!(stats.files_processed, 2);
                assert_eq!(stats.total_before, 5_000);
                assert_eq!(stats.total_after, 2_500);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(fs::metadata(root.join("photos/img.jpg")).unwrap().len(), 2_000);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("artwork/_raw/a.jpg"), 1_000);

        let first = ImageOptimizer::new(config(), root, HalvingEncoder::new());
        first.run().await.unwrap();
        let bytes = fs::read(root.join("artwork/a.jpg")).unwrap();

        let encoder = HalvingEncoder::new();
        let second = ImageOptimizer::new(config(), root, encoder);
        match second.run().await.unwrap() {
            RunOutcome::Completed(stats) => {
                assert_eq!((stats.total_before, stats.total_after), (1_000, 500));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(second.encoder.calls.get(), 0);
        assert_eq!(fs::read(root.join("artwork/a.jpg")).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_no_images() {
        let temp = TempDir::new().unwrap();
        let optimizer = ImageOptimizer::new(config(), temp.path(), HalvingEncoder::new());

        match optimizer.run().await.unwrap() {
            RunOutcome::NoImages { inputs } => {
                assert_eq!(inputs, vec![temp.path().join("artwork/_raw"), temp.path().join("photos/_raw")]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!temp.path().join("artwork").exists());
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("photos/_raw/x.tif"), 10);
        let config = Config {
            dry_run: true,
            ..config()
        };

        let optimizer = ImageOptimizer::new(config, temp.path(), HalvingEncoder::new());
        match optimizer.run().await.unwrap() {
            RunOutcome::Planned(jobs) => assert_eq!(jobs.len(), 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(optimizer.encoder.calls.get(), 0);
        assert!(!temp.path().join("photos/x.jpg").exists());
    }

    #[tokio::test]
    async fn test_failure_aborts_but_keeps_earlier_outputs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("artwork/_raw/a.png"), 100);
        write(&root.join("artwork/_raw/b.png"), 100);
        write(&root.join("artwork/_raw/c.png"), 100);

        let encoder = HalvingEncoder {
            calls: Cell::new(0),
            fail_on: Some(2),
        };
        let optimizer = ImageOptimizer::new(config(), root, encoder);

        let err = optimizer.run().await.unwrap_err();
        assert!(format!("{err:#}").contains("bad input"));
        assert!(root.join("artwork/a.png").exists());
        assert!(!root.join("artwork/b.png").exists());
        assert!(!root.join("artwork/c.png").exists());
        assert_eq!(optimizer.encoder.calls.get(), 2);
    }
}
