//! # Promotion Engine
//!
//! Worker per l'ottimizzazione di un singolo `Job`.
//!
//! L'encoder scrive sempre in un file temporaneo accanto alla destinazione
//! (suffisso `.tmpopt`). Il temporaneo diventa la destinazione solo se vince
//! il confronto delle dimensioni, altrimenti viene eliminato.
//!
//! ## Regola di accettazione
//! Il candidato viene accettato se è più piccolo della sorgente, OPPURE se
//! non esisteva una destinazione, OPPURE se è più piccolo della destinazione
//! precedente. Vedi [`accept_candidate`].

use crate::{
    config::Config,
    encoder::{EncodeRequest, ImageEncoder},
    file_manager::FileManager,
    optimizer::planner::Job,
};
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tokio::fs;
use tracing::debug;

/// What happened to a job's destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Destination already existed and overwrite was off; nothing encoded
    Existing,
    /// New encode replaced (or created) the destination
    Promoted,
    /// New encode lost the size comparison and was deleted
    Discarded,
    /// New encode lost and the source was copied byte-for-byte instead
    Copied,
    /// New encode lost and no destination could be produced
    NoOutput,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Existing => "existing",
            Self::Promoted => "promoted",
            Self::Discarded => "discarded",
            Self::Copied => "copied",
            Self::NoOutput => "no output",
        };
        f.write_str(label)
    }
}

/// Result of running one job
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: Job,
    /// Source size in bytes
    pub before: u64,
    /// Destination size after the job, or the source size when there is none
    pub after: u64,
    pub outcome: Outcome,
}

/// Decide whether an encoded candidate should become the destination.
///
/// `prior_destination` is the destination's size before this run's encode,
/// `None` when it did not exist.
pub fn accept_candidate(candidate: u64, source: u64, prior_destination: Option<u64>) -> bool {
    let beats_destination = prior_destination.map_or(true, |existing| candidate < existing);
    candidate < source || beats_destination
}

/// Encoder settings shared by every job of a run
#[derive(Debug, Clone, Copy)]
pub struct PromotionSettings {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    pub overwrite: bool,
}

impl From<&Config> for PromotionSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_dimension: config.max_dimension,
            jpeg_quality: config.jpeg_quality,
            overwrite: config.overwrite,
        }
    }
}

/// Runs the encoder for a job and keeps the smaller file
pub struct Promoter<'a, E> {
    encoder: &'a E,
    settings: PromotionSettings,
}

impl<'a, E: ImageEncoder> Promoter<'a, E> {
    pub fn new(encoder: &'a E, settings: PromotionSettings) -> Self {
        Self { encoder, settings }
    }

    /// Process a single job
    pub async fn promote(&self, job: &Job) -> Result<JobReport> {
        let destination = job.destination();
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!("Failed to create parent directories for {}: {}", destination.display(), e)
            })?;
        }

        let before = FileManager::file_size(job.source()).await.map_err(|e| {
            anyhow::anyhow!("Failed to read size of {}: {}", job.source().display(), e)
        })?;

        let prior_destination = FileManager::existing_size(destination).await?;
        if let (Some(existing), false) = (prior_destination, self.settings.overwrite) {
            debug!("[SKIP] Output already exists: {}", destination.display());
            return Ok(JobReport {
                job: job.clone(),
                before,
                after: existing,
                outcome: Outcome::Existing,
            });
        }

        let temp = job.temp_path();
        FileManager::remove_if_exists(&temp).await?;

        let request = EncodeRequest {
            source: job.source(),
            output: &temp,
            max_dimension: self.settings.max_dimension,
            format: job.format(),
            jpeg_quality: self.settings.jpeg_quality,
        };
        self.encoder.encode(&request).await?;

        let candidate = FileManager::file_size(&temp).await.map_err(|e| {
            anyhow::anyhow!("{} produced no output at {}: {}", self.encoder.name(), temp.display(), e)
        })?;

        let accepted = accept_candidate(candidate, before, prior_destination);
        debug!(
            "Promote? {} (candidate: {}, source: {}, existing: {:?})",
            accepted, candidate, before, prior_destination
        );

        let outcome = if accepted {
            fs::rename(&temp, destination).await?;
            Outcome::Promoted
        } else {
            FileManager::remove_if_exists(&temp).await?;
            self.fallback(job).await?
        };

        let after = FileManager::existing_size(destination).await?.unwrap_or(before);
        Ok(JobReport {
            job: job.clone(),
            before,
            after,
            outcome,
        })
    }

    /// After a rejected encode: copy the source when there is still no
    /// destination and the extension is unchanged
    async fn fallback(&self, job: &Job) -> Result<Outcome> {
        if fs::try_exists(job.destination()).await? {
            return Ok(Outcome::Discarded);
        }

        if FileManager::same_extension(job.source(), job.destination()) {
            fs::copy(job.source(), job.destination()).await?;
            debug!("Copied original (no encoding benefit): {}", job.destination().display());
            Ok(Outcome::Copied)
        } else {
            Ok(Outcome::NoOutput)
        }
    }
}
