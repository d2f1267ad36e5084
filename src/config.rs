//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di ottimizzazione
//! - Rende espliciti i valori che prima erano costanti globali
//!   (estensioni riconosciute, coppie di directory input/output)
//! - Validazione dei parametri di input
//! - Caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `max_dimension`: Lato lungo massimo in pixel (default: 2000)
//! - `jpeg_quality`: Qualità JPEG (1-100, default: 80)
//! - `overwrite`: Ricodifica anche se l'output esiste già (default: false)
//! - `encoder`: Backend di codifica (`auto`, `sips`, `magick`, `builtin`)
//! - `image_extensions`: Estensioni riconosciute come immagini
//! - `collections`: Coppie input/output (default: artwork e photos)
//!
//! ## Esempio:
//! ```rust
//! use asset_optimizer::Config;
//!
//! let config = Config {
//!     max_dimension: 1600,
//!     jpeg_quality: 85,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! ```

use crate::error::OptimizeError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default recognized image extensions (lowercase, without dot)
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "heif", "tif", "tiff"];

/// Which engine produces the encoded candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    /// First external tool found on the host
    #[default]
    Auto,
    /// macOS `sips`
    Sips,
    /// ImageMagick: `magick`, falling back to 6.x `convert`
    Magick,
    /// In-process encoder built on the `image` crate
    Builtin,
}

impl EncoderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Sips => "sips",
            Self::Magick => "magick",
            Self::Builtin => "builtin",
        }
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncoderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "sips" => Ok(Self::Sips),
            "magick" | "imagemagick" => Ok(Self::Magick),
            "builtin" => Ok(Self::Builtin),
            other => Err(format!(
                "unknown encoder '{other}' (expected auto, sips, magick or builtin)"
            )),
        }
    }
}

/// A raw-input directory and the published directory it feeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Collection {
    pub fn new(name: impl Into<String>, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
        }
    }

    /// Resolve relative input/output paths against `root`
    pub fn resolved(&self, root: &Path) -> Self {
        Self {
            name: self.name.clone(),
            input: root.join(&self.input),
            output: root.join(&self.output),
        }
    }
}

/// Configuration for image asset optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Longest side in pixels; smaller images are never upscaled
    pub max_dimension: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Re-encode even when the destination already exists
    pub overwrite: bool,
    /// Encoder backend
    pub encoder: EncoderKind,
    /// Extensions recognized as images (lowercase, no dot)
    pub image_extensions: Vec<String>,
    /// Input/output directory pairs, processed in order
    pub collections: Vec<Collection>,
    /// Output progress and results as JSON lines
    pub json_output: bool,
    /// Plan only: list jobs without encoding or writing anything
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dimension: 2000,
            jpeg_quality: 80,
            overwrite: false,
            encoder: EncoderKind::Auto,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            collections: vec![
                Collection::new("artwork", "artwork/_raw", "artwork"),
                Collection::new("photos", "photos/_raw", "photos"),
            ],
            json_output: false,
            dry_run: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.max_dimension == 0 {
            return Err(OptimizeError::Validation("Max dimension must be greater than 0".into()));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(OptimizeError::Validation("JPEG quality must be between 1 and 100".into()));
        }

        if self.image_extensions.is_empty() {
            return Err(OptimizeError::Validation("At least one image extension must be configured".into()));
        }

        if let Some(bad) = self
            .image_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(OptimizeError::Validation(format!(
                "Invalid image extension '{}': use a bare extension such as 'jpg'",
                bad
            )));
        }

        if self.collections.is_empty() {
            return Err(OptimizeError::Validation("At least one input/output collection must be configured".into()));
        }

        Ok(())
    }

    /// Mutable access to a collection by name
    pub fn collection_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.name == name)
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
