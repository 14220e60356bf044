//! Error types for castforged-formats.

use crate::format::FormatId;
use crate::subtitle::SubtitleType;

/// Errors raised while building a registry.
///
/// These indicate a broken static table and are fatal at start-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two format descriptors declare the same extension.
    #[error("extension '{extension}' is claimed by both {first} and {second}")]
    DuplicateExtension {
        extension: String,
        first: FormatId,
        second: FormatId,
    },

    /// A format identifier appears more than once.
    #[error("format {0} is registered more than once")]
    DuplicateFormat(FormatId),

    /// Two subtitle descriptors share a stable index.
    #[error("stable index {index} is claimed by both {first} and {second}")]
    DuplicateStableIndex {
        index: i32,
        first: SubtitleType,
        second: SubtitleType,
    },

    /// Two subtitle descriptors declare the same extension.
    #[error("subtitle extension '{extension}' is claimed by both {first} and {second}")]
    DuplicateSubtitleExtension {
        extension: String,
        first: SubtitleType,
        second: SubtitleType,
    },

    /// Two subtitle descriptors declare the same codec signature.
    #[error("codec signature '{signature}' is claimed by both {first} and {second}")]
    DuplicateSignature {
        signature: String,
        first: SubtitleType,
        second: SubtitleType,
    },

    /// The subtitle list has no `Unknown` entry to fall back on.
    #[error("subtitle registry has no entry for stable index 0")]
    MissingUnknownSubtitle,
}
