//! # Encoder Module
//!
//! The only image processing this program does is delegated here. An encoder
//! takes one source file, a maximum dimension and a target format/quality, and
//! writes an encoded file to an explicit output path.
//!
//! ## Backends
//! - [`SipsEncoder`]: macOS `sips`
//! - [`MagickEncoder`]: ImageMagick 7 `magick`, or 6.x `convert` as a fallback
//! - [`BuiltinEncoder`]: in-process, built on the `image` crate
//!
//! External backends run as a blocking subprocess per job (awaited before the
//! next job starts). A non-zero exit becomes [`OptimizeError::EncoderFailed`]
//! carrying the command line and both captured streams.

pub mod builtin;
pub mod magick;
pub mod sips;

pub use builtin::BuiltinEncoder;
pub use magick::MagickEncoder;
pub use sips::SipsEncoder;

use crate::config::EncoderKind;
use crate::error::OptimizeError;
use crate::optimizer::planner::TargetFormat;
use crate::tool_resolver::ToolPathResolver;
use crate::utils::shell_join;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Everything an encoder needs for one job
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    pub max_dimension: u32,
    pub format: TargetFormat,
    /// Only meaningful for [`TargetFormat::Jpeg`]
    pub jpeg_quality: u8,
}

/// Capability: "given an image, a max dimension and a target format, produce
/// an encoded file or report why not"
#[allow(async_fn_in_trait)]
pub trait ImageEncoder {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Encode `request.source` into `request.output`
    async fn encode(&self, request: &EncodeRequest<'_>) -> Result<(), OptimizeError>;
}

/// Run an external tool to completion, capturing its output.
///
/// `tool_name` is what gets shown in the failure message; `program` is the
/// resolved executable actually spawned.
pub async fn run_command(tool_name: &str, program: &Path, args: &[String]) -> Result<(), OptimizeError> {
    let command_line = shell_join(tool_name, args);
    debug!("Running: {}", command_line);

    let start_time = Instant::now();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await?;
    let elapsed = start_time.elapsed();

    if output.status.success() {
        debug!("{} completed successfully in {:?}", tool_name, elapsed);
        Ok(())
    } else {
        warn!("{} failed after {:?} ({})", tool_name, elapsed, output.status);
        Err(OptimizeError::EncoderFailed {
            command: command_line,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// The encoder selected for this run
#[derive(Debug, Clone)]
pub enum Encoder {
    Sips(SipsEncoder),
    Magick(MagickEncoder),
    Builtin(BuiltinEncoder),
}

impl Encoder {
    /// External tools tried, in order, when the kind is `auto`
    const AUTO_ORDER: &'static [&'static str] =
        &[SipsEncoder::TOOL, MagickEncoder::TOOL, MagickEncoder::LEGACY_TOOL];

    /// ImageMagick entry points, newest first
    const MAGICK_ORDER: &'static [&'static str] = &[MagickEncoder::TOOL, MagickEncoder::LEGACY_TOOL];

    fn first_available(resolver: &ToolPathResolver, tools: &[&'static str]) -> Option<(&'static str, PathBuf)> {
        tools
            .iter()
            .find_map(|tool| resolver.resolve_tool(tool).map(|path| (*tool, path)))
    }

    /// Pick the backend for `kind`, failing with `MissingDependency` when the
    /// required external tool is absent. Never touches the input trees.
    pub fn resolve(kind: EncoderKind, resolver: &ToolPathResolver) -> Result<Self, OptimizeError> {
        let encoder = match kind {
            EncoderKind::Builtin => Self::Builtin(BuiltinEncoder),
            EncoderKind::Sips => Self::Sips(SipsEncoder::new(
                resolver
                    .check_tool_with_instructions(SipsEncoder::TOOL)
                    .map_err(OptimizeError::MissingDependency)?,
            )),
            EncoderKind::Magick => match Self::first_available(resolver, Self::MAGICK_ORDER) {
                Some((tool, path)) => Self::Magick(MagickEncoder::new(tool, path)),
                None => {
                    return Err(OptimizeError::MissingDependency(format!(
                        "`{}` not found. {}",
                        MagickEncoder::TOOL,
                        ToolPathResolver::install_hint(MagickEncoder::TOOL)
                    )))
                }
            },
            EncoderKind::Auto => {
                match Self::first_available(resolver, Self::AUTO_ORDER) {
                    Some((SipsEncoder::TOOL, path)) => Self::Sips(SipsEncoder::new(path)),
                    Some((tool, path)) => Self::Magick(MagickEncoder::new(tool, path)),
                    None => {
                        return Err(OptimizeError::MissingDependency(format!(
                            "`sips` not found. This tool drives macOS `sips` or ImageMagick `magick`. {} \
                             Alternatively run with --encoder builtin.",
                            ToolPathResolver::install_hint(MagickEncoder::TOOL)
                        )))
                    }
                }
            }
        };

        info!("Using encoder: {}", encoder.name());
        Ok(encoder)
    }
}

impl ImageEncoder for Encoder {
    fn name(&self) -> &'static str {
        match self {
            Self::Sips(e) => e.name(),
            Self::Magick(e) => e.name(),
            Self::Builtin(e) => e.name(),
        }
    }

    async fn encode(&self, request: &EncodeRequest<'_>) -> Result<(), OptimizeError> {
        match self {
            Self::Sips(e) => e.encode(request).await,
            Self::Magick(e) => e.encode(request).await,
            Self::Builtin(e) => e.encode(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_builtin_needs_no_tools() {
        let empty = TempDir::new().unwrap();
        let resolver = ToolPathResolver::with_search_path(empty.path().as_os_str());
        let encoder = Encoder::resolve(EncoderKind::Builtin, &resolver).unwrap();
        assert_eq!(encoder.name(), "builtin");
    }

    #[test]
    fn test_resolve_auto_without_tools_is_missing_dependency() {
        let empty = TempDir::new().unwrap();
        let resolver = ToolPathResolver::with_search_path(empty.path().as_os_str());

        let err = Encoder::resolve(EncoderKind::Auto, &resolver).unwrap_err();
        assert!(err.is_missing_dependency());
        assert!(err.to_string().contains("`sips` not found"));

        let err = Encoder::resolve(EncoderKind::Magick, &resolver).unwrap_err();
        assert!(err.is_missing_dependency());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_auto_prefers_sips() {
        let dir = fake_tools(&["magick", "sips"]);
        let resolver = ToolPathResolver::with_search_path(dir.path().as_os_str());

        let encoder = Encoder::resolve(EncoderKind::Auto, &resolver).unwrap();
        assert_eq!(encoder.name(), "sips");
    }

    #[cfg(unix)]
    fn fake_tools(names: &[&str]) -> TempDir {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        for tool in names {
            let path = dir.path().join(tool);
            std::fs::write(&path, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        dir
    }

    #[cfg(unix)]
    #[test]
    fn test_legacy_convert_is_used_without_magick() {
        let dir = fake_tools(&["convert"]);
        let resolver = ToolPathResolver::with_search_path(dir.path().as_os_str());

        assert_eq!(Encoder::resolve(EncoderKind::Auto, &resolver).unwrap().name(), "convert");
        assert_eq!(Encoder::resolve(EncoderKind::Magick, &resolver).unwrap().name(), "convert");
    }

    #[cfg(unix)]
    #[test]
    fn test_magick_preferred_over_convert() {
        let dir = fake_tools(&["convert", "magick"]);
        let resolver = ToolPathResolver::with_search_path(dir.path().as_os_str());

        assert_eq!(Encoder::resolve(EncoderKind::Magick, &resolver).unwrap().name(), "magick");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_failure_captures_streams() {
        let err = run_command(
            "sh",
            Path::new("/bin/sh"),
            &crate::args!["-c", "echo out-text; echo err-text >&2; exit 3"],
        )
        .await
        .unwrap_err();

        match err {
            OptimizeError::EncoderFailed { command, stdout, stderr } => {
                assert!(command.starts_with("sh -c "));
                assert_eq!(stdout.trim(), "out-text");
                assert_eq!(stderr.trim(), "err-text");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_success() {
        run_command("sh", Path::new("/bin/sh"), &crate::args!["-c", "exit 0"])
            .await
            .unwrap();
    }
}
