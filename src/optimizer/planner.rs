//! # Job Planner
//!
//! Centralizza la logica di calcolo dei path di output.
//!
//! Ogni immagine trovata sotto la directory di input diventa un `Job`
//! immutabile: path sorgente, path destinazione e formato richiesto
//! all'encoder. La struttura relativa delle directory viene preservata.
//!
//! | estensione sorgente         | formato | estensione destinazione |
//! |-----------------------------|---------|-------------------------|
//! | .png                        | png     | invariata               |
//! | .jpg / .jpeg                | jpeg    | invariata               |
//! | .heic .heif .tif .tiff      | jpeg    | .jpg                    |
//! | qualsiasi altra riconosciuta| jpeg    | .jpg                    |

use crate::file_manager::FileManager;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output encoding family requested from the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpeg,
    Png,
}

impl TargetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planned single-file conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    source: PathBuf,
    destination: PathBuf,
    format: TargetFormat,
}

impl Job {
    /// Derive the job for `source`, which must live under `input_root`
    pub fn for_source(source: &Path, input_root: &Path, output_root: &Path) -> Result<Self> {
        let relative = source.strip_prefix(input_root).map_err(|_| {
            anyhow::anyhow!(
                "{} is not inside input directory {}",
                source.display(),
                input_root.display()
            )
        })?;

        let (format, keep_extension) = Self::format_for_extension(
            FileManager::lowercase_extension(source).as_deref().unwrap_or(""),
        );

        let destination = if keep_extension {
            output_root.join(relative)
        } else {
            output_root.join(relative.with_extension("jpg"))
        };

        Ok(Self {
            source: source.to_path_buf(),
            destination,
            format,
        })
    }

    /// Target format and whether the source extension survives, from a lowercase extension
    fn format_for_extension(ext: &str) -> (TargetFormat, bool) {
        match ext {
            "png" => (TargetFormat::Png, true),
            "jpg" | "jpeg" => (TargetFormat::Jpeg, true),
            // heic, heif, tif, tiff and anything else recognized
            _ => (TargetFormat::Jpeg, false),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    /// Sibling scratch file the encoder writes into before promotion
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .destination
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(super::TEMP_SUFFIX);
        self.destination.with_file_name(name)
    }
}

/// Walks an input tree and produces one `Job` per recognized image
#[derive(Debug, Clone)]
pub struct JobPlanner {
    extensions: Vec<String>,
}

impl JobPlanner {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Plan jobs for every image under `input_root`. A missing root yields no jobs.
    pub fn plan(&self, input_root: &Path, output_root: &Path) -> Result<Vec<Job>> {
        let sources = FileManager::find_images(input_root, &self.extensions)?;
        debug!("Found {} image(s) under {}", sources.len(), input_root.display());

        sources
            .iter()
            .map(|source| {
                let job = Job::for_source(source, input_root, output_root)?;
                debug!(
                    "Planned {} -> {} ({})",
                    job.source.display(),
                    job.destination.display(),
                    job.format
                );
                Ok(job)
            })
            .collect()
    }
}
