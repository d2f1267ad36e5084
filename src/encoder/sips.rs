//! macOS `sips` backend.
//!
//! `sips` resizes and converts in one call: `-Z` bounds the longer side
//! without upscaling, `-s format` selects the output family and
//! `-s formatOptions` carries the JPEG quality.

use super::{run_command, EncodeRequest, ImageEncoder};
use crate::args;
use crate::error::OptimizeError;
use crate::optimizer::planner::TargetFormat;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SipsEncoder {
    program: PathBuf,
}

impl SipsEncoder {
    pub const TOOL: &'static str = "sips";

    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Argument vector for one request
    pub fn build_args(request: &EncodeRequest<'_>) -> Vec<String> {
        let mut args = args!["-Z", request.max_dimension, "-s", "format", request.format];
        if request.format == TargetFormat::Jpeg {
            args.extend(args!["-s", "formatOptions", request.jpeg_quality]);
        }
        args.extend(args![
            request.source.display(),
            "--out",
            request.output.display()
        ]);
        args
    }
}

impl ImageEncoder for SipsEncoder {
    fn name(&self) -> &'static str {
        Self::TOOL
    }

    async fn encode(&self, request: &EncodeRequest<'_>) -> Result<(), OptimizeError> {
        run_command(Self::TOOL, &self.program, &Self::build_args(request)).await
    }
}
