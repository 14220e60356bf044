//! ffmpeg-backed [`BitstreamProbe`].
//!
//! Stream-copies the first frame of the first video track through the
//! `h264_mp4toannexb` bitstream filter and captures it from stdout, so the
//! SPS/PPS are prepended in Annex-B form regardless of the container.

use std::path::{Path, PathBuf};
use std::time::Duration;

use castforged_avc::{BitstreamProbe, MediaInput};

use crate::command::{block_on_tool, ToolCommand};
use crate::tools::get_tool_path;
use crate::Result;

/// A bitstream probe backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegBitstreamProbe {
    ffmpeg_path: PathBuf,
}

impl FfmpegBitstreamProbe {
    /// Create a probe using the given ffmpeg path.
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Create a probe that finds ffmpeg on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    /// Create a probe from an optional configured path, falling back to `PATH`.
    pub fn discover(config_path: Option<&Path>) -> Result<Self> {
        get_tool_path("ffmpeg", config_path).map(Self::new)
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Demux the first video frame as Annex-B bytes.
    pub async fn probe_async(&self, input: &MediaInput, timeout: Duration) -> Result<Vec<u8>> {
        let mut cmd = ToolCommand::new(self.ffmpeg_path.clone());
        cmd.timeout(timeout);
        cmd.args(["-hide_banner", "-v", "error"]);

        match input {
            MediaInput::Path(path) => {
                cmd.arg("-nostdin");
                cmd.arg("-i").arg(path.to_string_lossy().as_ref());
            }
            MediaInput::Stream(data) => {
                cmd.stdin(data.clone());
                cmd.args(["-i", "pipe:0"]);
            }
        }

        cmd.args([
            "-map", "0:v:0",
            "-frames:v", "1",
            "-c:v", "copy",
            "-bsf:v", "h264_mp4toannexb",
            "-an", "-sn", "-dn",
            "-f", "h264",
            "pipe:1",
        ]);

        let output = cmd.execute().await?;
        Ok(output.stdout)
    }
}

impl BitstreamProbe for FfmpegBitstreamProbe {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn probe(&self, input: &MediaInput, timeout: Duration) -> Option<Vec<u8>> {
        match block_on_tool(self.probe_async(input, timeout)) {
            Ok(frame) if frame.is_empty() => {
                tracing::debug!(%input, "ffmpeg produced no video frame");
                None
            }
            Ok(frame) => {
                tracing::debug!(%input, bytes = frame.len(), "demuxed first video frame");
                Some(frame)
            }
            Err(e) => {
                tracing::warn!(%input, error = %e, "bitstream probe failed");
                None
            }
        }
    }
}
