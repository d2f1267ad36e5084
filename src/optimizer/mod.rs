//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `planner`: Job Planner, mappa sorgente → destinazione + formato
//! - `promoter`: Promotion Engine, encode su file temporaneo e confronto dimensioni
//! - `progress_tracker`: righe di log, eventi JSON e totali
//! - `image_optimizer`: Orchestratore principale

pub mod image_optimizer;
pub mod planner;
pub mod progress_tracker;
pub mod promoter;

pub use image_optimizer::{ImageOptimizer, RunOutcome};
pub use planner::{Job, JobPlanner, TargetFormat};
pub use progress_tracker::ProgressTracker;
pub use promoter::{accept_candidate, JobReport, Outcome, PromotionSettings, Promoter};

/// Suffix appended to a destination's file name for the encoder's scratch output
pub const TEMP_SUFFIX: &str = ".tmpopt";
