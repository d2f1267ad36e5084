//! # Progress Tracking Module
//!
//! Unifica progress bar, righe di log su stdout ed eventi JSON.
//! I job sono sequenziali, quindi non serve alcuna sincronizzazione.

use crate::{
    config::Config,
    file_manager::FileManager,
    json_output::JsonMessage,
    optimizer::promoter::JobReport,
    progress::{OptimizationStats, ProgressManager},
};
use std::path::{Path, PathBuf};

/// Reports each finished job and accumulates the run totals
pub struct ProgressTracker {
    root: PathBuf,
    json_output: bool,
    progress: ProgressManager,
    stats: OptimizationStats,
}

impl ProgressTracker {
    /// Create a tracker; paths in log lines are shown relative to `root`
    pub fn new(root: &Path, total_jobs: usize, json_output: bool) -> Self {
        let progress = if json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(total_jobs as u64)
        };

        Self {
            root: root.to_path_buf(),
            json_output,
            progress,
            stats: OptimizationStats::new(),
        }
    }

    /// Announce the run
    pub fn start(&self, inputs: Vec<PathBuf>, total_jobs: usize, config: &Config) {
        if self.json_output {
            JsonMessage::start(inputs, total_jobs, config).emit();
        } else {
            self.progress.println(&format!("Optimizing {} image(s)…", total_jobs));
        }
    }

    /// Record a finished job
    pub fn record(&mut self, report: &JobReport) {
        self.stats.add(report.before, report.after, report.outcome);

        if self.json_output {
            JsonMessage::file_complete(report).emit();
        } else {
            self.progress.println(&self.format_job_line(report));
        }

        let name = report
            .job
            .destination()
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        self.progress.update(&format!("{}: {}", name, report.outcome));
    }

    /// `- artwork/_raw/logo.png → artwork/logo.png  (488.3KB → 293.0KB)`
    pub fn format_job_line(&self, report: &JobReport) -> String {
        format!(
            "- {} → {}  ({} → {})",
            self.display_path(report.job.source()),
            self.display_path(report.job.destination()),
            FileManager::format_size(report.before),
            FileManager::format_size(report.after)
        )
    }

    /// Path relative to the root when possible
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    /// Print the totals and hand them back
    pub fn finish(self, duration_seconds: f64) -> OptimizationStats {
        self.progress.finish(&self.stats.format_summary());

        if self.json_output {
            JsonMessage::complete(&self.stats, duration_seconds).emit();
        } else {
            println!();
            println!("{}", self.stats.format_total_line());
        }

        self.stats
    }
}
