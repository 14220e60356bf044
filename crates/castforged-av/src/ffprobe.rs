//! FFprobe-backed track metadata.
//!
//! Shells out to `ffprobe -v quiet -print_format json -show_format -show_streams`
//! and keeps what classification needs: the container name, the first video
//! stream (codec, resolution, level, reference frames) and the subtitle
//! streams' codec names.

use std::path::{Path, PathBuf};
use std::time::Duration;

use castforged_avc::{H264Metadata, Level, MediaInput};
use serde::{Deserialize, Serialize};

use crate::command::{block_on_tool, ToolCommand};
use crate::tools::get_tool_path;
use crate::{Error, Result};

/// Video stream fields used by the H.264 compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoStreamInfo {
    pub codec: String,
    pub profile: Option<String>,
    pub width: u32,
    pub height: u32,
    /// `None` when ffprobe reports no level or its `-99` placeholder
    pub level: Option<Level>,
    /// Reference frames as reported; below 1 means unknown
    pub ref_frames: i32,
}

impl VideoStreamInfo {
    pub fn is_h264(&self) -> bool {
        matches!(self.codec.as_str(), "h264" | "avc" | "avc1")
    }
}

/// A subtitle stream as reported by ffprobe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleStreamInfo {
    pub index: u32,
    pub codec: String,
    pub language: Option<String>,
    pub forced: bool,
}

/// Classification-relevant metadata of a media file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbedMedia {
    /// ffprobe `format_name`, e.g. `matroska,webm`
    pub container: Option<String>,
    pub video: Option<VideoStreamInfo>,
    pub subtitles: Vec<SubtitleStreamInfo>,
}

impl ProbedMedia {
    /// Compatibility inputs for the first video stream, if it is H.264.
    pub fn h264_metadata(&self, input: impl Into<MediaInput>) -> Option<H264Metadata> {
        let video = self.video.as_ref().filter(|v| v.is_h264())?;
        Some(H264Metadata {
            input: input.into(),
            level: video.level,
            ref_frames: video.ref_frames,
            width: video.width,
            height: video.height,
            container: self.container.clone(),
        })
    }
}

/// A metadata prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }

    /// Create a prober that finds ffprobe on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("ffprobe").ok().map(Self::new)
    }

    /// Create a prober from an optional configured path, falling back to `PATH`.
    pub fn discover(config_path: Option<&Path>) -> Result<Self> {
        get_tool_path("ffprobe", config_path).map(Self::new)
    }

    /// Probe a file synchronously.
    pub fn probe(&self, path: &Path, timeout: Duration) -> Result<ProbedMedia> {
        block_on_tool(self.probe_async(path, timeout))
    }

    pub async fn probe_async(&self, path: &Path, timeout: Duration) -> Result<ProbedMedia> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.timeout(timeout);
        cmd.args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ]);
        cmd.arg(path.to_string_lossy().as_ref());

        let output = cmd.execute().await?;
        parse_ffprobe_json(&output.stdout)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    profile: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    level: Option<i32>,
    refs: Option<i32>,
    #[serde(default)]
    disposition: FfprobeDisposition,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    forced: u8,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse `ffprobe -print_format json` output.
pub fn parse_ffprobe_json(json: &[u8]) -> Result<ProbedMedia> {
    let output: FfprobeOutput = serde_json::from_slice(json)
        .map_err(|e| Error::parse_error("ffprobe", format!("invalid JSON: {e}")))?;

    let mut media = ProbedMedia {
        container: output.format.and_then(|f| f.format_name),
        ..ProbedMedia::default()
    };

    for stream in output.streams {
        match stream.codec_type.as_deref().unwrap_or("") {
            "video" if media.video.is_none() => {
                media.video = Some(VideoStreamInfo {
                    codec: stream.codec_name.unwrap_or_default().to_lowercase(),
                    profile: stream.profile,
                    width: stream.width.unwrap_or(0),
                    height: stream.height.unwrap_or(0),
                    level: map_level(stream.level),
                    ref_frames: stream.refs.unwrap_or(-1),
                });
            }
            "subtitle" => {
                media.subtitles.push(SubtitleStreamInfo {
                    index: stream.index,
                    codec: stream.codec_name.unwrap_or_default(),
                    language: stream.tags.language,
                    forced: stream.disposition.forced == 1,
                });
            }
            _ => {}
        }
    }

    Ok(media)
}

fn map_level(level: Option<i32>) -> Option<Level> {
    level
        .and_then(|l| u8::try_from(l).ok())
        .and_then(Level::from_idc)
}
