//! # Tool Path Resolver
//!
//! Finds the external encoder binaries this tool shells out to:
//! - an explicit tools directory (`ASSET_OPTIMIZER_TOOLS_DIR`)
//! - the system `PATH`
//!
//! Resolution never runs the tool itself, so it is safe to call before any
//! directory scanning happens.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable pointing at a directory of bundled tools
pub const TOOLS_DIR_ENV: &str = "ASSET_OPTIMIZER_TOOLS_DIR";

/// Tool path resolver
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    /// Directory checked before `PATH`
    tools_dir: Option<PathBuf>,
    /// Search path, split like `PATH`
    search_path: Option<OsString>,
}

impl ToolPathResolver {
    /// Create a resolver from the current process environment
    pub fn new() -> Self {
        let tools_dir = env::var_os(TOOLS_DIR_ENV)
            .map(PathBuf::from)
            .filter(|dir| {
                let exists = dir.is_dir();
                if !exists {
                    warn!("{} points to a missing directory: {}", TOOLS_DIR_ENV, dir.display());
                }
                exists
            });

        Self {
            tools_dir,
            search_path: env::var_os("PATH"),
        }
    }

    /// Create a resolver with an explicit search path and no tools directory
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            tools_dir: None,
            search_path: Some(search_path.into()),
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        debug!("Resolving tool: {}", tool_name);
        let file_name = Self::executable_name(tool_name);

        if let Some(ref tools_dir) = self.tools_dir {
            let bundled = tools_dir.join(&file_name);
            if Self::is_executable(&bundled) {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled);
                return Some(bundled);
            }
        }

        let found = self.search_path.as_ref().and_then(|path| {
            env::split_paths(path)
                .map(|dir| dir.join(&file_name))
                .find(|candidate| Self::is_executable(candidate))
        });

        match found {
            Some(ref path) => debug!("Using system tool: {} -> {:?}", tool_name, path),
            None => debug!("Tool not found: {}", tool_name),
        }
        found
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool_name: &str) -> Result<PathBuf, String> {
        self.resolve_tool(tool_name)
            .ok_or_else(|| format!("`{}` not found. {}", tool_name, Self::install_hint(tool_name)))
    }

    /// Installation hint for the tools this program knows how to drive
    pub fn install_hint(tool_name: &str) -> String {
        match tool_name {
            "sips" => "`sips` ships with macOS; on other systems use --encoder magick or --encoder builtin.".to_string(),
            "magick" => {
                if cfg!(target_os = "macos") {
                    "Install ImageMagick with: brew install imagemagick".to_string()
                } else if cfg!(target_os = "windows") {
                    "Install ImageMagick from https://imagemagick.org/script/download.php".to_string()
                } else {
                    "Install ImageMagick 7 with your package manager (e.g. sudo apt-get install imagemagick).".to_string()
                }
            }
            _ => format!("Please ensure `{}` is installed and on PATH.", tool_name),
        }
    }

    fn executable_name(tool_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", tool_name)
        } else {
            tool_name.to_string()
        }
    }

    #[cfg(unix)]
    fn is_executable(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_executable(path: &Path) -> bool {
        path.is_file()
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}
