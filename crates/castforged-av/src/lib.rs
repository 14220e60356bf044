//! # castforged-av
//!
//! External media tool integration for castforged.
//!
//! - **Tool discovery** ([`check_tools`], [`get_tool_path`]) finds ffmpeg and
//!   ffprobe on `PATH` or at configured locations.
//! - **Command execution** ([`ToolCommand`]) is an async builder with timeout
//!   support; the child process is killed when the timeout expires.
//! - **Bitstream probing** ([`FfmpegBitstreamProbe`]) implements
//!   [`castforged_avc::BitstreamProbe`] by demuxing the first video frame as
//!   Annex-B through ffmpeg.
//! - **Metadata probing** ([`FfprobeProber`]) reads the container, video
//!   stream and subtitle streams through ffprobe.

pub mod command;
pub mod error;
pub mod ffmpeg;
pub mod ffprobe;
pub mod tools;

pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use ffmpeg::FfmpegBitstreamProbe;
pub use ffprobe::{parse_ffprobe_json, FfprobeProber, ProbedMedia, SubtitleStreamInfo, VideoStreamInfo};
pub use tools::{check_tool, check_tool_at, check_tools, get_tool_path, require_tool, ToolInfo, KNOWN_TOOLS};
