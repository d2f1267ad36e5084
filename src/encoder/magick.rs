//! ImageMagick backend: `magick` (7.x) or the legacy `convert` (6.x).
//!
//! Both binaries take the same argument layout.
//!
//! Geometry `WxH>` only ever shrinks, so small images keep their size.
//! The output format is forced with a `jpeg:`/`png:` prefix because the
//! scratch file's `.tmpopt` suffix says nothing about the format.

use super::{run_command, EncodeRequest, ImageEncoder};
use crate::args;
use crate::error::OptimizeError;
use crate::optimizer::planner::TargetFormat;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MagickEncoder {
    tool: &'static str,
    program: PathBuf,
}

impl MagickEncoder {
    pub const TOOL: &'static str = "magick";
    /// ImageMagick 6.x entry point
    pub const LEGACY_TOOL: &'static str = "convert";

    /// `tool` is the name shown in logs and failure messages
    pub fn new(tool: &'static str, program: PathBuf) -> Self {
        Self { tool, program }
    }

    /// Argument vector for one request
    pub fn build_args(request: &EncodeRequest<'_>) -> Vec<String> {
        let geometry = format!("{0}x{0}>", request.max_dimension);
        let mut args = args![request.source.display(), "-auto-orient", "-resize", geometry];
        if request.format == TargetFormat::Jpeg {
            args.extend(args!["-quality", request.jpeg_quality]);
        }
        args.push(format!("{}:{}", request.format, request.output.display()));
        args
    }
}

impl ImageEncoder for MagickEncoder {
    fn name(&self) -> &'static str {
        self.tool
    }

    async fn encode(&self, request: &EncodeRequest<'_>) -> Result<(), OptimizeError> {
        run_command(self.tool, &self.program, &Self::build_args(request)).await
    }
}
