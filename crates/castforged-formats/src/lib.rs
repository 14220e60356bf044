//! # castforged-formats
//!
//! Closed-world media classification for the castforged media server.
//!
//! - [`FormatRegistry`] maps file extensions and MIME types to a
//!   [`FormatDescriptor`] (category, transcodability, MIME type).
//! - [`SubtitleTypeRegistry`] maps stable indexes, extensions and prober codec
//!   signatures to a [`SubtitleTypeDescriptor`].
//!
//! Both registries are built once and are read-only afterwards. Lookups never
//! fail: unknown formats are `None`, unknown subtitles resolve to
//! [`SubtitleType::Unknown`].
//!
//! ## Example
//!
//! ```
//! use castforged_formats::{FormatCategory, FormatRegistry, SubtitleCategory, SubtitleTypeRegistry};
//!
//! let formats = FormatRegistry::build().unwrap();
//! let mkv = formats.lookup_by_extension("MKV").unwrap();
//! assert_eq!(mkv.category, FormatCategory::Container);
//!
//! let subtitles = SubtitleTypeRegistry::build().unwrap();
//! let pgs = subtitles.by_codec_signature("S_HDMV/PGS");
//! assert_eq!(pgs.category, SubtitleCategory::Picture);
//! ```

mod error;
pub mod format;
pub mod registry;
pub mod subtitle;

pub use error::RegistryError;
pub use format::{
    FormatCategory, FormatDescriptor, FormatId, MediaKind, DEFAULT_MIME_TYPE, FORMATS,
};
pub use registry::FormatRegistry;
pub use subtitle::{
    SubtitleCategory, SubtitleType, SubtitleTypeDescriptor, SubtitleTypeRegistry, SUBTITLE_TYPES,
};
