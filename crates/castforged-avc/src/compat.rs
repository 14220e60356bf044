//! Renderer compatibility rules for H.264 streams.
//!
//! Low-level streams are only safe to pass through when their reference
//! frame count fits the decoded picture buffer at the given resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::header::AvcHeader;
use crate::level::Level;

/// Streams at or above this level are accepted without further checks.
pub const DEFAULT_LEVEL_THRESHOLD: Level = Level::Level4_0;

/// Pixel budget of the decoded picture buffer used to derive the maximum
/// reference frame count for a resolution.
pub const DEFAULT_DPB_PIXEL_BUDGET: u64 = 10_252_743;

/// Tunable thresholds for [`H264Limits::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct H264Limits {
    pub level_threshold: Level,
    pub dpb_pixel_budget: u64,
}

impl Default for H264Limits {
    fn default() -> Self {
        Self {
            level_threshold: DEFAULT_LEVEL_THRESHOLD,
            dpb_pixel_budget: DEFAULT_DPB_PIXEL_BUDGET,
        }
    }
}

/// Why a stream was judged incompatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompatibilityReason {
    /// Level unknown from metadata and bitstream
    MissingLevel,
    /// Reference frame count unknown from metadata and bitstream
    MissingReferenceFrames,
    /// Width or height is zero
    MissingResolution,
    /// More reference frames than the resolution allows
    ReferenceFrameCountExceeded,
}

impl fmt::Display for IncompatibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingLevel => "level is unknown",
            Self::MissingReferenceFrames => "reference frame count is unknown",
            Self::MissingResolution => "resolution is unknown",
            Self::ReferenceFrameCountExceeded => "too many reference frames for resolution",
        };
        f.write_str(s)
    }
}

/// Outcome of a compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompatibilityVerdict {
    pub compatible: bool,
    /// Level used for the decision, after any bitstream fill-in
    pub level: Option<Level>,
    /// Reference frame count used for the decision
    pub reference_frame_count: Option<u32>,
    /// `floor(budget / (width * height))`, when the area is non-zero
    pub max_reference_frames_for_resolution: Option<u32>,
    /// Set exactly when `compatible` is false
    pub reason: Option<IncompatibilityReason>,
}

impl CompatibilityVerdict {
    fn accept(level: Option<Level>, refs: Option<u32>, max: Option<u32>) -> Self {
        Self {
            compatible: true,
            level,
            reference_frame_count: refs,
            max_reference_frames_for_resolution: max,
            reason: None,
        }
    }

    fn reject(
        level: Option<Level>,
        refs: Option<u32>,
        max: Option<u32>,
        reason: IncompatibilityReason,
    ) -> Self {
        Self {
            compatible: false,
            level,
            reference_frame_count: refs,
            max_reference_frames_for_resolution: max,
            reason: Some(reason),
        }
    }
}

impl fmt::Display for CompatibilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            None => f.write_str("compatible"),
            Some(reason) => write!(f, "incompatible: {}", reason),
        }
    }
}

impl H264Limits {
    /// Whether a known level alone makes a stream compatible.
    pub fn level_is_sufficient(&self, level: Option<Level>) -> bool {
        level.is_some_and(|l| l >= self.level_threshold)
    }

    /// Maximum reference frames for a resolution, `None` for a zero area.
    pub fn max_reference_frames(&self, width: u32, height: u32) -> Option<u32> {
        let pixels = u64::from(width) * u64::from(height);
        if pixels == 0 {
            return None;
        }
        Some(u32::try_from(self.dpb_pixel_budget / pixels).unwrap_or(u32::MAX))
    }

    /// Decide compatibility from container metadata, filling in only the
    /// values the metadata lacks from a parsed bitstream header.
    ///
    /// A `known_ref_frames` below 1 means unknown.
    pub fn evaluate(
        &self,
        known_level: Option<Level>,
        known_ref_frames: i32,
        width: u32,
        height: u32,
        probe: Option<AvcHeader>,
    ) -> CompatibilityVerdict {
        let max = self.max_reference_frames(width, height);
        let mut level = known_level;
        let mut refs = u32::try_from(known_ref_frames).ok().filter(|&r| r >= 1);

        if self.level_is_sufficient(level) {
            return CompatibilityVerdict::accept(level, refs, max);
        }

        if let Some(header) = probe {
            if level.is_none() {
                level = header.level();
            }
            if refs.is_none() {
                // Zero is a real SPS value (intra-only streams), unlike container metadata.
                refs = header.reference_frame_count;
            }
        }

        let Some(ref_count) = refs else {
            let reason = if level.is_none() {
                IncompatibilityReason::MissingLevel
            } else {
                IncompatibilityReason::MissingReferenceFrames
            };
            return CompatibilityVerdict::reject(level, refs, max, reason);
        };

        if level.is_none() {
            return CompatibilityVerdict::reject(level, refs, max, IncompatibilityReason::MissingLevel);
        }

        match max {
            None => CompatibilityVerdict::reject(
                level,
                refs,
                max,
                IncompatibilityReason::MissingResolution,
            ),
            Some(max_refs) if ref_count > max_refs => CompatibilityVerdict::reject(
                level,
                refs,
                max,
                IncompatibilityReason::ReferenceFrameCountExceeded,
            ),
            Some(_) => CompatibilityVerdict::accept(level, refs, max),
        }
    }
}

/// [`H264Limits::evaluate`] with the default thresholds.
pub fn evaluate(
    known_level: Option<Level>,
    known_ref_frames: i32,
    width: u32,
    height: u32,
    probe: Option<AvcHeader>,
) -> CompatibilityVerdict {
    H264Limits::default().evaluate(known_level, known_ref_frames, width, height, probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(level: u8, refs: u32) -> AvcHeader {
        AvcHeader {
            profile: Some(100),
            constraint_flags: Some(0),
            level: Some(level),
            reference_frame_count: Some(refs),
        }
    }

    #[test]
    fn test_max_reference_frames() {
        let limits = H264Limits::default();
        assert_eq!(limits.max_reference_frames(1920, 1080), Some(4));
        assert_eq!(limits.max_reference_frames(1280, 720), Some(11));
        assert_eq!(limits.max_reference_frames(0, 720), None);
        assert_eq!(limits.max_reference_frames(1, 1), Some(10_252_743));
    }

    #[test]
    fn test_high_level_short_circuits() {
        let v = evaluate(Some(Level::Level4_1), 16, 1920, 1080, None);
        assert!(v.compatible);
        assert_eq!(v.reason, None);
        assert_eq!(v.max_reference_frames_for_resolution, Some(4));
    }

    #[test]
    fn test_high_level_ignores_probe() {
        let v = evaluate(Some(Level::Level4_0), -1, 1920, 1080, Some(header(31, 9)));
        assert!(v.compatible);
        assert_eq!(v.level, Some(Level::Level4_0));
        assert_eq!(v.reference_frame_count, None);
    }

    #[test]
    fn test_probe_fills_only_missing_values() {
        let v = evaluate(Some(Level::Level3_1), -1, 1280, 720, Some(header(40, 6)));
        assert!(v.compatible);
        assert_eq!(v.level, Some(Level::Level3_1));
        assert_eq!(v.reference_frame_count, Some(6));

        let v = evaluate(None, 3, 1920, 1080, Some(header(31, 9)));
        assert!(v.compatible);
        assert_eq!(v.level, Some(Level::Level3_1));
        assert_eq!(v.reference_frame_count, Some(3));
    }

    #[test]
    fn test_too_many_reference_frames() {
        let v = evaluate(Some(Level::Level3_1), 6, 1920, 1080, None);
        assert!(!v.compatible);
        assert_eq!(v.reason, Some(IncompatibilityReason::ReferenceFrameCountExceeded));

        let v = evaluate(Some(Level::Level3_1), 4, 1920, 1080, None);
        assert!(v.compatible);
    }

    #[test]
    fn test_missing_level_takes_priority() {
        let v = evaluate(None, -1, 1920, 1080, None);
        assert_eq!(v.reason, Some(IncompatibilityReason::MissingLevel));

        let v = evaluate(None, 2, 1920, 1080, None);
        assert_eq!(v.reason, Some(IncompatibilityReason::MissingLevel));

        let v = evaluate(Some(Level::Level3_0), 0, 1920, 1080, None);
        assert_eq!(v.reason, Some(IncompatibilityReason::MissingReferenceFrames));
    }

    #[test]
    fn test_undetermined_probe_changes_nothing() {
        let v = evaluate(None, -1, 1920, 1080, Some(AvcHeader::default()));
        assert_eq!(v.reason, Some(IncompatibilityReason::MissingLevel));
    }

    #[test]
    fn test_zero_resolution() {
        let v = evaluate(Some(Level::Level3_1), 2, 0, 0, None);
        assert!(!v.compatible);
        assert_eq!(v.reason, Some(IncompatibilityReason::MissingResolution));
        assert_eq!(v.max_reference_frames_for_resolution, None);
    }

    #[test]
    fn test_intra_only_stream_from_header() {
        // Baseline L3.1 SPS with max_num_ref_frames = 0
        let header = crate::header::AvcHeader::parse(&[0x42, 0xC0, 0x1F, 0xDC]);
        assert_eq!(header.reference_frame_count, Some(0));

        let v = evaluate(None, -1, 1920, 1080, Some(header));
        assert!(v.compatible);
        assert_eq!(v.reason, None);
        assert_eq!(v.level, Some(Level::Level3_1));
        assert_eq!(v.reference_frame_count, Some(0));
    }

    #[test]
    fn test_zero_known_refs_still_unknown_without_header() {
        let v = evaluate(Some(Level::Level3_1), 0, 1920, 1080, None);
        assert_eq!(v.reason, Some(IncompatibilityReason::MissingReferenceFrames));
        assert_eq!(v.reference_frame_count, None);
    }

    #[test]
    fn test_custom_threshold() {
        let limits = H264Limits {
            level_threshold: Level::Level5_1,
            ..H264Limits::default()
        };
        let v = limits.evaluate(Some(Level::Level4_1), 6, 1920, 1080, None);
        assert_eq!(v.reason, Some(IncompatibilityReason::ReferenceFrameCountExceeded));
    }

    #[test]
    fn test_verdict_serializes() {
        let v = evaluate(Some(Level::Level3_1), 6, 1920, 1080, None);
        let json = serde_json::to_value(v).unwrap();
        assert_eq!(json["compatible"], false);
        assert_eq!(json["level"], "3.1");
        assert_eq!(json["reason"], "reference_frame_count_exceeded");
        assert_eq!(v.to_string(), "incompatible: too many reference frames for resolution");
    }
}
