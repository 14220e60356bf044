//! Subtitle type taxonomy.
//!
//! Subtitle types are persisted by their stable index (the media database
//! stores it per subtitle track), so the discriminants of [`SubtitleType`]
//! must never be reused or renumbered. New types take the next free index.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::RegistryError;

/// Rendering category of a subtitle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleCategory {
    Text,
    Picture,
    Undefined,
}

impl SubtitleCategory {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    pub fn is_picture(&self) -> bool {
        matches!(self, Self::Picture)
    }
}

impl fmt::Display for SubtitleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Picture => write!(f, "picture"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// Known subtitle types. The discriminant is the persisted stable index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum SubtitleType {
    Unknown = 0,
    SubRip = 1,
    Text = 2,
    MicroDvd = 3,
    Sami = 4,
    Ass = 5,
    VobSub = 6,
    Unsupported = 7,
    Usf = 8,
    Bmp = 9,
    DivX = 10,
    Tx3g = 11,
    Pgs = 12,
    WebVtt = 13,
    DvbSub = 14,
    Eia608 = 15,
    Eia708 = 16,
    Ttml = 17,
}

impl SubtitleType {
    pub const fn stable_index(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for SubtitleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::SubRip => "subrip",
            Self::Text => "text",
            Self::MicroDvd => "microdvd",
            Self::Sami => "sami",
            Self::Ass => "ass",
            Self::VobSub => "vobsub",
            Self::Unsupported => "unsupported",
            Self::Usf => "usf",
            Self::Bmp => "bmp",
            Self::DivX => "divx",
            Self::Tx3g => "tx3g",
            Self::Pgs => "pgs",
            Self::WebVtt => "webvtt",
            Self::DvbSub => "dvbsub",
            Self::Eia608 => "eia608",
            Self::Eia708 => "eia708",
            Self::Ttml => "ttml",
        };
        f.write_str(name)
    }
}

/// Attributes of one subtitle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubtitleTypeDescriptor {
    pub subtitle_type: SubtitleType,
    pub stable_index: i32,
    pub description: &'static str,
    /// First entry is the canonical extension.
    pub extensions: &'static [&'static str],
    /// Lower-case tokens reported by media probers (MediaInfo codec IDs,
    /// Matroska codec IDs, ffprobe codec names).
    pub codec_signatures: &'static [&'static str],
    pub category: SubtitleCategory,
}

impl SubtitleTypeDescriptor {
    pub fn primary_extension(&self) -> Option<&'static str> {
        self.extensions.first().copied()
    }

    pub fn is_unknown(&self) -> bool {
        self.subtitle_type == SubtitleType::Unknown
    }
}

const fn subtitle(
    subtitle_type: SubtitleType,
    description: &'static str,
    extensions: &'static [&'static str],
    codec_signatures: &'static [&'static str],
    category: SubtitleCategory,
) -> SubtitleTypeDescriptor {
    SubtitleTypeDescriptor {
        subtitle_type,
        stable_index: subtitle_type.stable_index(),
        description,
        extensions,
        codec_signatures,
        category,
    }
}

use SubtitleCategory::{Picture, Text, Undefined};

/// Every subtitle type known to the server.
#[rustfmt::skip]
pub static SUBTITLE_TYPES: &[SubtitleTypeDescriptor] = &[
    subtitle(SubtitleType::Unknown, "Generic", &[], &[], Undefined),
    subtitle(SubtitleType::SubRip, "SubRip", &["srt"], &["s_text/utf8", "s_utf8", "subrip", "srt"], Text),
    subtitle(SubtitleType::Text, "Text file", &["txt"], &[], Text),
    subtitle(SubtitleType::MicroDvd, "MicroDVD", &["sub"], &["microdvd"], Text),
    subtitle(SubtitleType::Sami, "SAMI", &["smi"], &["sami"], Text),
    subtitle(SubtitleType::Ass, "(Advanced) SubStation Alpha", &["ass", "ssa"], &["s_text/ssa", "s_text/ass", "s_ssa", "s_ass", "ssa", "ass"], Text),
    subtitle(SubtitleType::VobSub, "VobSub", &["idx"], &["s_vobsub", "subp", "mp4s", "e0", "dvd_subtitle"], Picture),
    subtitle(SubtitleType::Unsupported, "Unsupported", &[], &[], Undefined),
    subtitle(SubtitleType::Usf, "Universal Subtitle Format", &[], &["s_text/usf", "s_usf", "usf"], Text),
    subtitle(SubtitleType::Bmp, "BMP", &[], &["s_image/bmp"], Picture),
    subtitle(SubtitleType::DivX, "DivX subtitles", &[], &["dxsb"], Picture),
    subtitle(SubtitleType::Tx3g, "Timed text (TX3G)", &[], &["tx3g", "mov_text"], Text),
    subtitle(SubtitleType::Pgs, "Blu-ray subtitles", &["sup"], &["s_hdmv/pgs", "pgs", "144", "hdmv_pgs_subtitle"], Picture),
    subtitle(SubtitleType::WebVtt, "WebVTT", &["vtt"], &["webvtt", "s_text/webvtt", "wvtt"], Text),
    subtitle(SubtitleType::DvbSub, "DVB subtitles", &[], &["dvb_subtitle", "s_dvbsub"], Picture),
    subtitle(SubtitleType::Eia608, "EIA-608 closed captions", &[], &["eia_608", "c608"], Text),
    subtitle(SubtitleType::Eia708, "EIA-708 closed captions", &[], &["eia_708", "c708"], Text),
    subtitle(SubtitleType::Ttml, "Timed Text Markup Language", &["ttml", "dfxp"], &["ttml", "stpp"], Text),
];

/// Immutable lookup tables over the subtitle type list.
///
/// Every lookup is total: blank or unmatched input resolves to the
/// `Unknown` descriptor.
#[derive(Debug, Clone)]
pub struct SubtitleTypeRegistry {
    descriptors: Vec<SubtitleTypeDescriptor>,
    unknown: usize,
    by_index: HashMap<i32, usize>,
    by_extension: HashMap<String, usize>,
    by_signature: HashMap<String, usize>,
}

impl SubtitleTypeRegistry {
    /// Build the registry from [`SUBTITLE_TYPES`].
    pub fn build() -> Result<Self, RegistryError> {
        Self::from_descriptors(SUBTITLE_TYPES.to_vec())
    }

    /// Build a registry from an arbitrary descriptor list.
    ///
    /// All three maps are filled in one pass. Any key claimed twice is an
    /// error, as is a list without an `Unknown` (index 0) entry.
    pub fn from_descriptors(
        descriptors: Vec<SubtitleTypeDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut by_index = HashMap::with_capacity(descriptors.len());
        let mut by_extension = HashMap::new();
        let mut by_signature = HashMap::new();

        for (pos, d) in descriptors.iter().enumerate() {
            if let Some(&prev) = by_index.get(&d.stable_index) {
                let prev: &SubtitleTypeDescriptor = &descriptors[prev];
                return Err(RegistryError::DuplicateStableIndex {
                    index: d.stable_index,
                    first: prev.subtitle_type,
                    second: d.subtitle_type,
                });
            }
            by_index.insert(d.stable_index, pos);

            for ext in d.extensions {
                let key = normalize(ext);
                if let Some(&prev) = by_extension.get(&key) {
                    let prev: &SubtitleTypeDescriptor = &descriptors[prev];
                    return Err(RegistryError::DuplicateSubtitleExtension {
                        extension: key,
                        first: prev.subtitle_type,
                        second: d.subtitle_type,
                    });
                }
                by_extension.insert(key, pos);
            }

            for sig in d.codec_signatures {
                let key = normalize(sig);
                if let Some(&prev) = by_signature.get(&key) {
                    let prev: &SubtitleTypeDescriptor = &descriptors[prev];
                    return Err(RegistryError::DuplicateSignature {
                        signature: key,
                        first: prev.subtitle_type,
                        second: d.subtitle_type,
                    });
                }
                by_signature.insert(key, pos);
            }
        }

        let unknown = *by_index
            .get(&SubtitleType::Unknown.stable_index())
            .ok_or(RegistryError::MissingUnknownSubtitle)?;

        tracing::debug!(
            types = descriptors.len(),
            extensions = by_extension.len(),
            signatures = by_signature.len(),
            "subtitle type registry built"
        );

        Ok(Self {
            descriptors,
            unknown,
            by_index,
            by_extension,
            by_signature,
        })
    }

    /// The `Unknown` sentinel descriptor.
    pub fn unknown(&self) -> &SubtitleTypeDescriptor {
        &self.descriptors[self.unknown]
    }

    /// Look up by persisted stable index.
    pub fn by_stable_index(&self, index: i32) -> &SubtitleTypeDescriptor {
        self.by_index
            .get(&index)
            .map(|&pos| &self.descriptors[pos])
            .unwrap_or_else(|| self.unknown())
    }

    /// Look up by file extension (leading dot and case ignored).
    pub fn by_extension(&self, extension: &str) -> &SubtitleTypeDescriptor {
        self.lookup(&self.by_extension, extension)
    }

    /// Look up by a codec token reported by an external prober.
    pub fn by_codec_signature(&self, signature: &str) -> &SubtitleTypeDescriptor {
        self.lookup(&self.by_signature, signature)
    }

    /// Extensions accepted for external (sidecar) subtitle files.
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .flat_map(|d| d.extensions.iter().copied())
            .collect()
    }

    /// All descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &SubtitleTypeDescriptor> {
        self.descriptors.iter()
    }

    fn lookup(&self, map: &HashMap<String, usize>, key: &str) -> &SubtitleTypeDescriptor {
        let key = normalize(key);
        if key.is_empty() {
            return self.unknown();
        }
        map.get(&key)
            .map(|&pos| &self.descriptors[pos])
            .unwrap_or_else(|| self.unknown())
    }
}

fn normalize(key: &str) -> String {
    key.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SubtitleTypeRegistry {
        SubtitleTypeRegistry::build().unwrap()
    }

    #[test]
    fn stable_indexes_are_pinned() {
        let reg = registry();
        assert_eq!(reg.by_stable_index(0).subtitle_type, SubtitleType::Unknown);
        assert_eq!(reg.by_stable_index(1).subtitle_type, SubtitleType::SubRip);
        assert_eq!(reg.by_stable_index(5).subtitle_type, SubtitleType::Ass);
        assert_eq!(reg.by_stable_index(6).subtitle_type, SubtitleType::VobSub);
        assert_eq!(reg.by_stable_index(12).subtitle_type, SubtitleType::Pgs);
        assert_eq!(reg.by_stable_index(13).subtitle_type, SubtitleType::WebVtt);
    }

    #[test]
    fn unmapped_index_is_unknown() {
        let reg = registry();
        for index in [-1, 18, 999, i32::MIN, i32::MAX] {
            assert!(reg.by_stable_index(index).is_unknown(), "index {index}");
        }
    }

    #[test]
    fn extension_lookup_ignores_case_and_dot() {
        let reg = registry();
        assert_eq!(reg.by_extension("SRT").subtitle_type, SubtitleType::SubRip);
        assert_eq!(reg.by_extension(".ssa").subtitle_type, SubtitleType::Ass);
        assert_eq!(reg.by_extension(" sup ").subtitle_type, SubtitleType::Pgs);
    }

    #[test]
    fn signature_only_types_are_reachable() {
        let reg = registry();
        let usf = reg.by_codec_signature("S_TEXT/USF");
        assert_eq!(usf.subtitle_type, SubtitleType::Usf);
        assert!(usf.extensions.is_empty());
        assert_eq!(reg.by_codec_signature("DXSB").category, SubtitleCategory::Picture);
    }

    #[test]
    fn blank_input_is_unknown() {
        let reg = registry();
        for input in ["", " ", "\t", "."] {
            assert!(reg.by_extension(input).is_unknown());
            assert!(reg.by_codec_signature(input).is_unknown());
        }
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let mut list = SUBTITLE_TYPES.to_vec();
        list.push(subtitle(SubtitleType::Unsupported, "dup", &[], &[], Undefined));
        assert!(matches!(
            SubtitleTypeRegistry::from_descriptors(list),
            Err(RegistryError::DuplicateStableIndex { index: 7, .. })
        ));
    }

    #[test]
    fn duplicate_signature_is_rejected() {
        let list = vec![
            subtitle(SubtitleType::Unknown, "Generic", &[], &[], Undefined),
            subtitle(SubtitleType::SubRip, "a", &[], &["srt"], Text),
            subtitle(SubtitleType::Text, "b", &[], &["SRT"], Text),
        ];
        assert!(matches!(
            SubtitleTypeRegistry::from_descriptors(list),
            Err(RegistryError::DuplicateSignature { .. })
        ));
    }

    #[test]
    fn registry_requires_unknown() {
        let list = vec![subtitle(SubtitleType::SubRip, "SubRip", &["srt"], &[], Text)];
        assert!(matches!(
            SubtitleTypeRegistry::from_descriptors(list),
            Err(RegistryError::MissingUnknownSubtitle)
        ));
    }

    #[test]
    fn canonical_extension_comes_first() {
        let reg = registry();
        assert_eq!(reg.by_codec_signature("ass").primary_extension(), Some("ass"));
        let exts = reg.supported_extensions();
        assert!(exts.contains(&"srt"));
        assert!(exts.contains(&"vtt"));
    }
}
