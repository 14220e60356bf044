//! External tool detection.

use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Tools the bitstream and metadata probes shell out to.
pub const KNOWN_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Information about an external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use castforged_av::check_tool;
///
/// let info = check_tool("ffprobe");
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    check_tool_at(name, None)
}

/// Check a tool, preferring `config_path` when it exists.
///
/// ffmpeg and ffprobe take `-version`; everything else `--version`.
pub fn check_tool_at(name: &str, config_path: Option<&Path>) -> ToolInfo {
    let unavailable = || ToolInfo {
        name: name.to_string(),
        available: false,
        version: None,
        path: None,
    };

    let Ok(path) = get_tool_path(name, config_path) else {
        return unavailable();
    };

    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };

    match Command::new(&path).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: Some(path),
            }
        }
        _ => unavailable(),
    }
}

/// Check every tool in [`KNOWN_TOOLS`].
pub fn check_tools() -> Vec<ToolInfo> {
    KNOWN_TOOLS.iter().map(|name| check_tool(name)).collect()
}

/// Require that a tool is available on `PATH`, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            tool = name,
            path = %path.display(),
            "configured tool path does not exist, falling back to PATH"
        );
    }

    require_tool(name)
}
