//! Bitstream probe contract.
//!
//! A probe demuxes the first video frame of an input as an Annex-B byte
//! stream. Implementations live outside this crate (see `castforged-av`).

use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time limit for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a probe reads media from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaInput {
    /// A file on disk
    Path(PathBuf),
    /// In-memory data, fed to the probe on stdin
    Stream(Bytes),
}

impl MediaInput {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            Self::Stream(_) => None,
        }
    }
}

impl fmt::Display for MediaInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Stream(b) => write!(f, "<stream: {} bytes>", b.len()),
        }
    }
}

impl From<PathBuf> for MediaInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for MediaInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for MediaInput {
    fn from(path: &str) -> Self {
        Self::Path(path.into())
    }
}

impl From<Bytes> for MediaInput {
    fn from(data: Bytes) -> Self {
        Self::Stream(data)
    }
}

/// Source of the first video frame of a media input as Annex-B bytes.
pub trait BitstreamProbe: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Demux the first video frame, or `None` if it is unavailable for any
    /// reason (missing tool, timeout, empty output). Must not block longer
    /// than `timeout`.
    fn probe(&self, input: &MediaInput, timeout: Duration) -> Option<Vec<u8>>;
}

/// Probe that never yields data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBitstreamProbe;

impl BitstreamProbe for NoBitstreamProbe {
    fn name(&self) -> &'static str {
        "none"
    }

    fn probe(&self, _input: &MediaInput, _timeout: Duration) -> Option<Vec<u8>> {
        None
    }
}

/// Probe returning a fixed buffer, for tests and pre-demuxed data.
#[derive(Debug, Clone, Default)]
pub struct StaticBitstreamProbe {
    frame: Option<Vec<u8>>,
}

impl StaticBitstreamProbe {
    pub fn new(frame: impl Into<Vec<u8>>) -> Self {
        Self {
            frame: Some(frame.into()),
        }
    }
}

impl BitstreamProbe for StaticBitstreamProbe {
    fn name(&self) -> &'static str {
        "static"
    }

    fn probe(&self, _input: &MediaInput, _timeout: Duration) -> Option<Vec<u8>> {
        self.frame.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_display() {
        let input = MediaInput::from(PathBuf::from("/media/clip.mkv"));
        assert_eq!(input.to_string(), "/media/clip.mkv");
        assert_eq!(input.as_path(), Some(Path::new("/media/clip.mkv")));

        let stream = MediaInput::from(Bytes::from_static(b"abcd"));
        assert_eq!(stream.to_string(), "<stream: 4 bytes>");
        assert!(stream.as_path().is_none());
    }

    #[test]
    fn test_no_probe_yields_nothing() {
        let input = MediaInput::from(Path::new("a.mp4"));
        assert!(NoBitstreamProbe.probe(&input, DEFAULT_PROBE_TIMEOUT).is_none());
    }
}
