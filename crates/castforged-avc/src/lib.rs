//! # castforged-avc
//!
//! H.264 renderer compatibility checks.
//!
//! Container metadata often omits the AVC level or the reference frame
//! count. When it does, the first frame of the stream is demuxed as an
//! Annex-B byte stream by a [`BitstreamProbe`], the SPS header is located
//! and parsed, and the missing values are filled in before the
//! compatibility rules run.
//!
//! ## Example
//!
//! ```
//! use castforged_avc::{evaluate_h264_compatibility, H264Metadata, Level, NoBitstreamProbe};
//!
//! let metadata = H264Metadata::new("movie.mkv", 1920, 1080)
//!     .with_level(Level::Level3_1)
//!     .with_ref_frames(6);
//!
//! let verdict = evaluate_h264_compatibility(&metadata, &NoBitstreamProbe);
//! assert!(!verdict.compatible);
//! assert_eq!(verdict.max_reference_frames_for_resolution, Some(4));
//! ```

pub mod annexb;
mod bits;
pub mod compat;
pub mod error;
pub mod header;
pub mod level;
pub mod probe;

pub use annexb::extract_header;
pub use compat::{
    evaluate, CompatibilityVerdict, H264Limits, IncompatibilityReason, DEFAULT_DPB_PIXEL_BUDGET,
    DEFAULT_LEVEL_THRESHOLD,
};
pub use error::{ParseLevelError, ScanError};
pub use header::{clean_header, AvcHeader};
pub use level::Level;
pub use probe::{
    BitstreamProbe, MediaInput, NoBitstreamProbe, StaticBitstreamProbe, DEFAULT_PROBE_TIMEOUT,
};

use std::time::Duration;

/// What the container reports about an H.264 video track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct H264Metadata {
    pub input: MediaInput,
    /// Level from container metadata
    pub level: Option<Level>,
    /// Reference frames from container metadata; below 1 means unknown
    pub ref_frames: i32,
    pub width: u32,
    pub height: u32,
    /// Container format name, for logging
    pub container: Option<String>,
}

impl H264Metadata {
    pub fn new(input: impl Into<MediaInput>, width: u32, height: u32) -> Self {
        Self {
            input: input.into(),
            level: None,
            ref_frames: -1,
            width,
            height,
            container: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_ref_frames(mut self, ref_frames: i32) -> Self {
        self.ref_frames = ref_frames;
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }
}

/// Evaluate a track with the default limits and probe timeout.
pub fn evaluate_h264_compatibility(
    metadata: &H264Metadata,
    probe: &dyn BitstreamProbe,
) -> CompatibilityVerdict {
    evaluate_h264_compatibility_with_limits(metadata, probe, &H264Limits::default(), DEFAULT_PROBE_TIMEOUT)
}

/// Evaluate a track.
///
/// The probe runs only when the level is below the threshold (or unknown)
/// and the level or the reference frame count is missing.
pub fn evaluate_h264_compatibility_with_limits(
    metadata: &H264Metadata,
    probe: &dyn BitstreamProbe,
    limits: &H264Limits,
    timeout: Duration,
) -> CompatibilityVerdict {
    let needs_probe = !limits.level_is_sufficient(metadata.level)
        && (metadata.level.is_none() || metadata.ref_frames < 1);

    let header = if needs_probe {
        probe_header(probe, &metadata.input, timeout)
    } else {
        None
    };

    let verdict = limits.evaluate(
        metadata.level,
        metadata.ref_frames,
        metadata.width,
        metadata.height,
        header,
    );

    tracing::debug!(
        input = %metadata.input,
        container = metadata.container.as_deref().unwrap_or("unknown"),
        probed = header.is_some(),
        compatible = verdict.compatible,
        reason = ?verdict.reason,
        "evaluated H.264 compatibility"
    );

    verdict
}

/// Run a probe and parse the SPS header from its output.
pub fn probe_header(
    probe: &dyn BitstreamProbe,
    input: &MediaInput,
    timeout: Duration,
) -> Option<AvcHeader> {
    let Some(frame) = probe.probe(input, timeout) else {
        tracing::debug!(probe = probe.name(), %input, "bitstream probe returned no data");
        return None;
    };

    match extract_header(&frame) {
        Ok(header) => Some(AvcHeader::from_annexb(header)),
        Err(e) => {
            tracing::debug!(probe = probe.name(), %input, error = %e, "no AVC header in frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FRAME: &[u8] = &[
        0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1F, 0xD9, 0xE0, // SPS L3.1, 6 refs
        0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80, // PPS
        0x00, 0x00, 0x01, 0x65, 0x88, 0x84, 0x00, 0x33, // IDR
    ];

    struct CountingProbe(AtomicUsize);

    impl BitstreamProbe for CountingProbe {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn probe(&self, _input: &MediaInput, _timeout: Duration) -> Option<Vec<u8>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some(FRAME.to_vec())
        }
    }

    #[test]
    fn test_probe_skipped_when_level_sufficient() {
        let probe = CountingProbe(AtomicUsize::new(0));
        let metadata = H264Metadata::new("a.mkv", 1920, 1080).with_level(Level::Level4_1);
        assert!(evaluate_h264_compatibility(&metadata, &probe).compatible);
        assert_eq!(probe.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_probe_skipped_when_metadata_complete() {
        let probe = CountingProbe(AtomicUsize::new(0));
        let metadata = H264Metadata::new("a.mkv", 1280, 720)
            .with_level(Level::Level3_1)
            .with_ref_frames(4);
        assert!(evaluate_h264_compatibility(&metadata, &probe).compatible);
        assert_eq!(probe.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_probe_runs_when_values_missing() {
        let probe = CountingProbe(AtomicUsize::new(0));
        let metadata = H264Metadata::new("a.mkv", 1920, 1080).with_container("matroska");
        let verdict = evaluate_h264_compatibility(&metadata, &probe);
        assert_eq!(probe.0.load(Ordering::SeqCst), 1);
        assert_eq!(verdict.level, Some(Level::Level3_1));
        assert_eq!(verdict.reference_frame_count, Some(6));
        assert_eq!(verdict.reason, Some(IncompatibilityReason::ReferenceFrameCountExceeded));
    }

    #[test]
    fn test_probe_header_without_keyframe() {
        let probe = StaticBitstreamProbe::new(&FRAME[..10]);
        let input = MediaInput::from("a.mkv");
        assert!(probe_header(&probe, &input, DEFAULT_PROBE_TIMEOUT).is_none());
    }
}
