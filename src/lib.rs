//! # Asset Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! Il programma non decodifica né codifica immagini per conto suo (salvo il
//! backend `builtin`): ridimensionamento e ricompressione sono delegati a un
//! tool esterno. Qui vive solo l'orchestrazione: mapping dei path, file
//! temporanei, promozione basata sulle dimensioni e report.
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `file_manager`: Discovery immagini e utilità sui file
//! - `tool_resolver`: Ricerca dei tool esterni nel `PATH`
//! - `encoder`: Capability di codifica e backend (sips, magick, builtin)
//! - `optimizer`: Planner, promotion engine e orchestratore
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use asset_optimizer::{Config, Encoder, ImageOptimizer, ToolPathResolver};
//! use std::path::Path;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::default();
//! let encoder = Encoder::resolve(config.encoder, &ToolPathResolver::new())?;
//! let optimizer = ImageOptimizer::new(config, Path::new("."), encoder);
//! optimizer.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod optimizer;
pub mod progress;
pub mod tool_resolver;
pub mod utils;

pub use config::{Collection, Config, EncoderKind};
pub use encoder::{Encoder, ImageEncoder};
pub use error::OptimizeError;
pub use optimizer::{ImageOptimizer, Job, RunOutcome};
pub use tool_resolver::ToolPathResolver;
