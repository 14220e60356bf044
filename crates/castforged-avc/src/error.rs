//! Error types for castforged-avc

/// Reasons an Annex-B buffer yields no header.
///
/// Both are ordinary outcomes for some encodings; callers treat them as
/// "undetermined" rather than failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// No IDR slice start was found
    #[error("no keyframe found")]
    NoKeyframe,

    /// A keyframe was found but no parameter set start precedes it
    #[error("no header boundary found before keyframe at byte {keyframe_pos}")]
    NoHeaderBoundary { keyframe_pos: usize },
}

/// Failure to parse an H.264 level string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid H.264 level: {0}")]
pub struct ParseLevelError(pub String);
