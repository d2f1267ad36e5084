//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, disco pieno)
//! - `Image`: Errori del backend interno basato sul crate `image`
//! - `EncoderFailed`: Il tool esterno è uscito con codice non-zero
//! - `MissingDependency`: Tool esterno mancante (sips, magick)
//! - `UnsupportedFormat`: Formato non gestito dal backend scelto
//! - `Validation`: Errori di validazione della configurazione
//! - `Task`: Task bloccante interrotto
//!
//! Nessun errore viene ritentato: chi chiama propaga con `?` e il run termina.

use crate::utils::format_diagnostics;

/// Custom error types for image asset optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Command failed:\n{}", format_diagnostics(.command, .stdout, .stderr))]
    EncoderFailed {
        command: String,
        stdout: String,
        stderr: String,
    },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl OptimizeError {
    /// True when the error means a required external tool is absent
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency(_))
    }
}
