mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./castforged.toml",
        "~/.config/castforged/config.toml",
        "/etc/castforged/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration.
///
/// Values that would make every check meaningless are errors. Problems the
/// tool layer recovers from (a configured tool path that does not exist
/// falls back to `PATH`) are returned as warnings.
pub fn validate_config(config: &Config) -> Result<Vec<String>> {
    if config.probe.timeout_secs == 0 {
        anyhow::bail!("Probe timeout cannot be 0");
    }

    if config.h264.dpb_pixel_budget == 0 {
        anyhow::bail!("H.264 DPB pixel budget cannot be 0");
    }

    let mut warnings = Vec::new();

    let tool_paths = [
        ("ffmpeg", config.tools.ffmpeg_path.as_deref()),
        ("ffprobe", config.tools.ffprobe_path.as_deref()),
    ];

    for (tool, path) in tool_paths {
        if let Some(path) = path {
            if !path.exists() {
                warnings.push(format!(
                    "{} path does not exist: {:?} (falling back to PATH)",
                    tool, path
                ));
            }
        }
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    Ok(warnings)
}
