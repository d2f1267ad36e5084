//! In-process backend built on the `image` crate.
//!
//! Useful on hosts with neither `sips` nor ImageMagick. Decoding support is
//! limited to what the crate is compiled with (JPEG, PNG, TIFF, WebP); HEIC
//! sources fail with an `UnsupportedFormat` error.

use super::{EncodeRequest, ImageEncoder};
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::optimizer::planner::TargetFormat;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEncoder;

impl BuiltinEncoder {
    const NAME: &'static str = "builtin";

    fn encode_blocking(
        source: &Path,
        output: &Path,
        max_dimension: u32,
        format: TargetFormat,
        jpeg_quality: u8,
    ) -> Result<(), OptimizeError> {
        let input_format = FileManager::lowercase_extension(source)
            .and_then(|ext| ImageFormat::from_extension(&ext))
            .filter(|fmt| fmt.can_read())
            .ok_or_else(|| {
                OptimizeError::UnsupportedFormat(format!(
                    "builtin encoder cannot decode {}",
                    source.display()
                ))
            })?;

        let image = image::load(BufReader::new(File::open(source)?), input_format)?;
        let image = Self::shrink_to_fit(image, max_dimension);

        match format {
            TargetFormat::Png => image.save_with_format(output, ImageFormat::Png)?,
            TargetFormat::Jpeg => {
                Self::write_jpeg(&image, BufWriter::new(File::create(output)?), jpeg_quality)?
            }
        }

        Ok(())
    }

    /// Encode as JPEG and flush; a short write must not look like a small file
    fn write_jpeg<W: Write>(image: &DynamicImage, mut writer: W, quality: u8) -> Result<(), OptimizeError> {
        JpegEncoder::new_with_quality(&mut writer, quality).encode_image(&image.to_rgb8())?;
        writer.flush()?;
        Ok(())
    }

    /// Bound the longer side to `max_dimension`; never upscales
    fn shrink_to_fit(image: DynamicImage, max_dimension: u32) -> DynamicImage {
        let (width, height) = (image.width(), image.height());
        if width.max(height) <= max_dimension {
            return image;
        }
        debug!("Resizing {}x{} to fit {}px", width, height, max_dimension);
        image.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    }
}

impl ImageEncoder for BuiltinEncoder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn encode(&self, request: &EncodeRequest<'_>) -> Result<(), OptimizeError> {
        let source: PathBuf = request.source.to_path_buf();
        let output: PathBuf = request.output.to_path_buf();
        let (max_dimension, format, quality) =
            (request.max_dimension, request.format, request.jpeg_quality);

        tokio::task::spawn_blocking(move || {
            Self::encode_blocking(&source, &output, max_dimension, format, quality)
        })
        .await
        .map_err(|e| OptimizeError::Task(e.to_string()))?
    }
}
