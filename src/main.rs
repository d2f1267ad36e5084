//! # Asset Optimizer - Main Entry Point
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Costruisce la configurazione (file JSON opzionale + flag)
//! 4. Verifica che l'encoder sia disponibile, altrimenti esce con codice 2
//! 5. Pianifica ed esegue i job uno alla volta
//!
//! ## Esempio di utilizzo:
//! ```bash
//! asset-optimizer --max-dim 1600 --jpeg-quality 75 --overwrite
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use asset_optimizer::{Config, Encoder, EncoderKind, ImageOptimizer, ToolPathResolver};

/// Exit code used when the external encoder is not installed
const EXIT_MISSING_TOOL: u8 = 2;

#[derive(Parser)]
#[command(name = "asset-optimizer")]
#[command(about = "Optimize images for artwork/ and photos/")]
struct Args {
    /// Max width/height in pixels [default: 2000]
    #[arg(long = "max-dim")]
    max_dim: Option<u32>,

    /// JPEG quality, 1-100 [default: 80]
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Overwrite already-optimized outputs
    #[arg(long)]
    overwrite: bool,

    /// Artwork input folder [default: artwork/_raw]
    #[arg(long)]
    art_in: Option<PathBuf>,

    /// Artwork output folder [default: artwork]
    #[arg(long)]
    art_out: Option<PathBuf>,

    /// Photos input folder [default: photos/_raw]
    #[arg(long)]
    photos_in: Option<PathBuf>,

    /// Photos output folder [default: photos]
    #[arg(long)]
    photos_out: Option<PathBuf>,

    /// Directory relative folders are resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Encoder backend: auto, sips, magick or builtin [default: auto]
    #[arg(long)]
    encoder: Option<EncoderKind>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit JSON lines on stdout instead of human-readable output
    #[arg(long)]
    json: bool,

    /// List planned jobs without encoding or writing anything
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Layer the flags over a base configuration
    fn apply(self, mut config: Config) -> Config {
        if let Some(max_dim) = self.max_dim {
            config.max_dimension = max_dim;
        }
        if let Some(quality) = self.jpeg_quality {
            config.jpeg_quality = quality;
        }
        if let Some(encoder) = self.encoder {
            config.encoder = encoder;
        }
        config.overwrite |= self.overwrite;
        config.json_output |= self.json;
        config.dry_run |= self.dry_run;

        for (name, input, output) in [
            ("artwork", self.art_in, self.art_out),
            ("photos", self.photos_in, self.photos_out),
        ] {
            if let Some(collection) = config.collection_mut(name) {
                if let Some(input) = input {
                    collection.input = input;
                }
                if let Some(output) = output {
                    collection.output = output;
                }
            }
        }

        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let base = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    let root = args.root.clone();
    let config = args.apply(base);
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    // Checked before any directory is scanned
    let encoder = match Encoder::resolve(config.encoder, &ToolPathResolver::new()) {
        Ok(encoder) => encoder,
        Err(e) if e.is_missing_dependency() => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::from(EXIT_MISSING_TOOL));
        }
        Err(e) => return Err(e.into()),
    };

    let optimizer = ImageOptimizer::new(config, &root, encoder);
    optimizer.run().await?;

    Ok(ExitCode::SUCCESS)
}
