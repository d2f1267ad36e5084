//! # JSON Output Module
//!
//! Output strutturato in JSON (una riga per evento) per chi integra il tool
//! in script o pipeline di build.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run con numero di job e configurazione
//! - `file_complete`: Fine elaborazione di un job
//! - `complete`: Totali finali
//! - `error`: Errore fatale

use crate::config::Config;
use crate::optimizer::planner::TargetFormat;
use crate::optimizer::promoter::{JobReport, Outcome};
use crate::progress::OptimizationStats;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        inputs: Vec<PathBuf>,
        total_jobs: usize,
        config: JsonConfig,
    },
    FileComplete {
        source: PathBuf,
        destination: PathBuf,
        format: TargetFormat,
        before: u64,
        after: u64,
        outcome: Outcome,
    },
    Complete {
        files_processed: usize,
        total_before: u64,
        total_after: u64,
        bytes_saved: i64,
        percent_saved: f64,
        duration_seconds: f64,
    },
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione semplificata per l'evento `start`
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    pub overwrite: bool,
    pub encoder: String,
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_dimension: config.max_dimension,
            jpeg_quality: config.jpeg_quality,
            overwrite: config.overwrite,
            encoder: config.encoder.to_string(),
        }
    }
}

impl JsonMessage {
    /// Serialize to a single line
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"serialization failed: {}"}}"#, e)
        })
    }

    /// Print on stdout
    pub fn emit(&self) {
        println!("{}", self.to_line());
    }

    pub fn start(inputs: Vec<PathBuf>, total_jobs: usize, config: &Config) -> Self {
        Self::Start {
            inputs,
            total_jobs,
            config: JsonConfig::from(config),
        }
    }

    pub fn file_complete(report: &JobReport) -> Self {
        Self::FileComplete {
            source: report.job.source().to_path_buf(),
            destination: report.job.destination().to_path_buf(),
            format: report.job.format(),
            before: report.before,
            after: report.after,
            outcome: report.outcome,
        }
    }

    pub fn complete(stats: &OptimizationStats, duration_seconds: f64) -> Self {
        Self::Complete {
            files_processed: stats.files_processed,
            total_before: stats.total_before,
            total_after: stats.total_after,
            bytes_saved: stats.bytes_saved(),
            percent_saved: stats.percent_saved(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}
