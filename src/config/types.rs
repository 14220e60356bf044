use castforged_avc::{H264Limits, Level, DEFAULT_DPB_PIXEL_BUDGET, DEFAULT_LEVEL_THRESHOLD};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub h264: H264Config,
}

/// Locations of external tools. Unset paths are looked up on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Demux the first frame with ffmpeg when metadata is incomplete
    #[serde(default = "default_probe_enabled")]
    pub enabled: bool,

    /// Time limit for each external tool invocation
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

fn default_probe_enabled() -> bool {
    true
}

fn default_probe_timeout() -> u64 {
    5
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: default_probe_enabled(),
            timeout_secs: default_probe_timeout(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct H264Config {
    /// Levels at or above this are accepted without checking reference frames.
    /// Written as `"4.0"`, `"41"`, `4` or `40`.
    #[serde(
        default = "default_level_threshold",
        deserialize_with = "deserialize_level"
    )]
    pub level_threshold: Level,

    /// Decoded picture buffer budget in pixels
    #[serde(default = "default_dpb_pixel_budget")]
    pub dpb_pixel_budget: u64,
}

fn default_level_threshold() -> Level {
    DEFAULT_LEVEL_THRESHOLD
}

fn default_dpb_pixel_budget() -> u64 {
    DEFAULT_DPB_PIXEL_BUDGET
}

impl Default for H264Config {
    fn default() -> Self {
        Self {
            level_threshold: default_level_threshold(),
            dpb_pixel_budget: default_dpb_pixel_budget(),
        }
    }
}

impl H264Config {
    pub fn limits(&self) -> H264Limits {
        H264Limits {
            level_threshold: self.level_threshold,
            dpb_pixel_budget: self.dpb_pixel_budget,
        }
    }
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLevel {
        Text(String),
        Idc(u8),
    }

    match RawLevel::deserialize(deserializer)? {
        RawLevel::Text(s) => s.parse().map_err(serde::de::Error::custom),
        // Same reading as the string form: 4 is 4.0, 41 is 4.1
        RawLevel::Idc(idc) => idc.to_string().parse().map_err(serde::de::Error::custom),
    }
}
