//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la progress bar e le statistiche aggregate.
//!
//! ## Componenti principali:
//! - `ProgressManager`: progress bar `indicatif` su stderr
//! - `OptimizationStats`: totali prima/dopo, conteggi per esito
//!
//! La progress bar viene disegnata solo quando stderr è un terminale;
//! le righe di log su stdout passano da `println` così da non rovinarla.
//!
//! ## Esempio:
//! ```rust
//! use asset_optimizer::progress::{OptimizationStats, ProgressManager};
//! use asset_optimizer::optimizer::promoter::Outcome;
//!
//! let progress = ProgressManager::hidden();
//! let mut stats = OptimizationStats::new();
//! stats.add(500_000, 300_000, Outcome::Promoted);
//! progress.println("- logo.png");
//! progress.finish(&stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use crate::optimizer::promoter::Outcome;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr());

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that never draws anything
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

    /// Print a line on stdout without tearing the bar
    pub fn println(&self, line: &str) {
        self.bar.suspend(|| println!("{}", line));
    }

    /// Finish and clear the bar; the summary goes to the log
    pub fn finish(&self, message: &str) {
        self.bar.finish_and_clear();
        tracing::debug!("{}", message);
    }
}

/// Statistics tracker for a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_promoted: usize,
    pub files_copied: usize,
    pub files_kept: usize,
    pub total_before: u64,
    pub total_after: u64,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, before: u64, after: u64, outcome: Outcome) {
        self.files_processed += 1;
        self.total_before += before;
        self.total_after += after;
        match outcome {
            Outcome::Promoted => self.files_promoted += 1,
            Outcome::Copied => self.files_copied += 1,
            Outcome::Existing | Outcome::Discarded | Outcome::NoOutput => self.files_kept += 1,
        }
    }

    /// Bytes saved overall; negative when outputs grew
    pub fn bytes_saved(&self) -> i64 {
        self.total_before as i64 - self.total_after as i64
    }

    pub fn percent_saved(&self) -> f64 {
        if self.total_before > 0 {
            self.bytes_saved() as f64 / self.total_before as f64 * 100.0
        } else {
            0.0
        }
    }

    /// `Total: 1.2MB → 800.0KB  (saved 400.0KB / 33.3%)`
    pub fn format_total_line(&self) -> String {
        format!(
            "Total: {} → {}  (saved {} / {:.1}%)",
            FileManager::format_size(self.total_before),
            FileManager::format_size(self.total_after),
            FileManager::format_signed_size(self.bytes_saved()),
            self.percent_saved()
        )
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Promoted: {} | Copied: {} | Kept: {}",
            self.files_processed, self.files_promoted, self.files_copied, self.files_kept
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let mut stats = OptimizationStats::new();
        stats.add(500_000, 300_000, Outcome::Promoted);
        stats.add(1_000, 1_000, Outcome::Copied);
        stats.add(2_000, 1_500, Outcome::Existing);

        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.total_before, 503_000);
        assert_eq!(stats.total_after, 302_500);
        assert_eq!(stats.bytes_saved(), 200_500);
        assert_eq!((stats.files_promoted, stats.files_copied, stats.files_kept), (1, 1, 1));
    }

    #[test]
    fn test_total_line() {
        let mut stats = OptimizationStats::new();
        stats.add(500_000, 300_000, Outcome::Promoted);
        assert_eq!(stats.format_total_line(), "Total: 488.3KB → 293.0KB  (saved 195.3KB / 40.0%)");
    }

    #[test]
    fn test_negative_savings() {
        let mut stats = OptimizationStats::new();
        stats.add(1_000, 3_048, Outcome::Discarded);
        assert_eq!(stats.bytes_saved(), -2_048);
        assert_eq!(stats.format_total_line(), "Total: 1000B → 3.0KB  (saved -2048B / -204.8%)");
    }

    #[test]
    fn test_empty_percent_is_zero() {
        assert_eq!(OptimizationStats::new().percent_saved(), 0.0);
    }
}
