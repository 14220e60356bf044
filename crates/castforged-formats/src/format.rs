//! Format identifiers, categories, and the static descriptor table.
//!
//! Every format the server knows about is a [`FormatId`] variant. The
//! attributes that decide how a file is served (category, extensions, MIME
//! type, whether it may be re-encoded) live in [`FORMATS`], one
//! [`FormatDescriptor`] per variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type used when a descriptor declares none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// FormatId
// ---------------------------------------------------------------------------

/// Closed set of supported formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatId {
    // Audio
    Ac3,
    Adts,
    Aiff,
    Ape,
    Atrac,
    Au,
    Dff,
    Dsf,
    Dts,
    Eac3,
    Flac,
    M4a,
    Mka,
    Mlp,
    Mp3,
    Mpa,
    Mpc,
    Oga,
    Ra,
    Shn,
    ThreeGa,
    ThreeG2a,
    TrueHd,
    Tta,
    Wav,
    WavPack,
    Wma,
    // Image
    Bmp,
    Gif,
    Icns,
    Iff,
    Jpg,
    Pcx,
    Pict,
    Png,
    Pnm,
    Psd,
    Raw,
    Tga,
    Tif,
    Webp,
    // Container
    AudioAsVideo,
    Avi,
    DvrMs,
    Flv,
    Mkv,
    Mp4,
    Mpg,
    Ogg,
    Ts,
    Webm,
    Wmv,
    // Video elementary streams
    H264,
    Hevc,
    M2v,
    RealVideo,
    // Playlist
    Cue,
    M3u,
    M3u8,
    Pls,
    Wpl,
    // Disc image
    Iso,
    // Subtitles
    Ass,
    MicroDvd,
    Sami,
    SubRip,
    Sup,
    Ttml,
    VobSub,
    WebVtt,
}

impl FormatId {
    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ac3 => "ac3",
            Self::Adts => "adts",
            Self::Aiff => "aiff",
            Self::Ape => "ape",
            Self::Atrac => "atrac",
            Self::Au => "au",
            Self::Dff => "dff",
            Self::Dsf => "dsf",
            Self::Dts => "dts",
            Self::Eac3 => "eac3",
            Self::Flac => "flac",
            Self::M4a => "m4a",
            Self::Mka => "mka",
            Self::Mlp => "mlp",
            Self::Mp3 => "mp3",
            Self::Mpa => "mpa",
            Self::Mpc => "mpc",
            Self::Oga => "oga",
            Self::Ra => "ra",
            Self::Shn => "shn",
            Self::ThreeGa => "threega",
            Self::ThreeG2a => "threeg2a",
            Self::TrueHd => "truehd",
            Self::Tta => "tta",
            Self::Wav => "wav",
            Self::WavPack => "wavpack",
            Self::Wma => "wma",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Icns => "icns",
            Self::Iff => "iff",
            Self::Jpg => "jpg",
            Self::Pcx => "pcx",
            Self::Pict => "pict",
            Self::Png => "png",
            Self::Pnm => "pnm",
            Self::Psd => "psd",
            Self::Raw => "raw",
            Self::Tga => "tga",
            Self::Tif => "tif",
            Self::Webp => "webp",
            Self::AudioAsVideo => "audioasvideo",
            Self::Avi => "avi",
            Self::DvrMs => "dvrms",
            Self::Flv => "flv",
            Self::Mkv => "mkv",
            Self::Mp4 => "mp4",
            Self::Mpg => "mpg",
            Self::Ogg => "ogg",
            Self::Ts => "ts",
            Self::Webm => "webm",
            Self::Wmv => "wmv",
            Self::H264 => "h264",
            Self::Hevc => "hevc",
            Self::M2v => "m2v",
            Self::RealVideo => "realvideo",
            Self::Cue => "cue",
            Self::M3u => "m3u",
            Self::M3u8 => "m3u8",
            Self::Pls => "pls",
            Self::Wpl => "wpl",
            Self::Iso => "iso",
            Self::Ass => "ass",
            Self::MicroDvd => "microdvd",
            Self::Sami => "sami",
            Self::SubRip => "subrip",
            Self::Sup => "sup",
            Self::Ttml => "ttml",
            Self::VobSub => "vobsub",
            Self::WebVtt => "webvtt",
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FormatCategory / MediaKind
// ---------------------------------------------------------------------------

/// Mutually exclusive format category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatCategory {
    Audio,
    Image,
    Container,
    Video,
    Playlist,
    Iso,
    Subtitles,
}

impl FormatCategory {
    /// Reduce the category to the coarse media bucket DLNA object classes use.
    ///
    /// This conversion is lossy: a container may hold audio only, but is
    /// reported as [`MediaKind::Video`]. Disc images are treated the same way.
    /// Playlists and subtitles have no bucket.
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            Self::Audio => Some(MediaKind::Audio),
            Self::Image => Some(MediaKind::Image),
            Self::Video | Self::Container | Self::Iso => Some(MediaKind::Video),
            Self::Playlist | Self::Subtitles => None,
        }
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Image => write!(f, "image"),
            Self::Container => write!(f, "container"),
            Self::Video => write!(f, "video"),
            Self::Playlist => write!(f, "playlist"),
            Self::Iso => write!(f, "iso"),
            Self::Subtitles => write!(f, "subtitles"),
        }
    }
}

/// Coarse media bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
            Self::Image => write!(f, "image"),
        }
    }
}

// ---------------------------------------------------------------------------
// FormatDescriptor
// ---------------------------------------------------------------------------

/// Attributes of one supported format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    pub identifier: FormatId,
    pub category: FormatCategory,
    pub description: &'static str,
    /// Lower-case, without leading dot. Empty only for container wrappers.
    pub extensions: &'static [&'static str],
    pub transcodable: bool,
    pub mime_type: Option<&'static str>,
    /// Interpretation to fall back on when the primary one does not fit.
    pub secondary_format: Option<FormatId>,
}

impl FormatDescriptor {
    /// Canonical extension (the first declared), if any.
    pub fn primary_extension(&self) -> Option<&'static str> {
        self.extensions.first().copied()
    }

    /// MIME type, or [`DEFAULT_MIME_TYPE`] when none is declared.
    pub fn mime_type_or_default(&self) -> &'static str {
        self.mime_type.unwrap_or(DEFAULT_MIME_TYPE)
    }

    /// Media bucket of this format's category.
    pub fn media_kind(&self) -> Option<MediaKind> {
        self.category.media_kind()
    }

    /// Whether `extension` is declared by this descriptor, ignoring case.
    pub fn declares_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

const fn descriptor(
    identifier: FormatId,
    category: FormatCategory,
    description: &'static str,
    extensions: &'static [&'static str],
    transcodable: bool,
    mime_type: Option<&'static str>,
    secondary_format: Option<FormatId>,
) -> FormatDescriptor {
    FormatDescriptor {
        identifier,
        category,
        description,
        extensions,
        transcodable,
        mime_type,
        secondary_format,
    }
}

use FormatCategory::{Audio, Container, Image, Iso, Playlist, Subtitles, Video};

/// Every format known to the server.
#[rustfmt::skip]
pub static FORMATS: &[FormatDescriptor] = &[
    // Audio. Raw Dolby/DTS elementary streams may also arrive wrapped in an
    // MPEG program stream, hence the `Mpg` secondary format.
    descriptor(FormatId::Ac3, Audio, "Dolby Digital", &["ac3"], true, Some("audio/vnd.dolby.dd-raw"), Some(FormatId::Mpg)),
    descriptor(FormatId::Adts, Audio, "AAC (ADTS)", &["adts", "aac"], true, Some("audio/vnd.dlna.adts"), None),
    descriptor(FormatId::Aiff, Audio, "AIFF", &["aiff", "aif", "aifc"], true, Some("audio/aiff"), None),
    descriptor(FormatId::Ape, Audio, "Monkey's Audio", &["ape"], true, Some("audio/x-ape"), None),
    descriptor(FormatId::Atrac, Audio, "ATRAC", &["aa3", "oma", "at3"], true, Some("audio/x-sony-oma"), None),
    descriptor(FormatId::Au, Audio, "Sun AU", &["au", "snd"], true, Some("audio/basic"), None),
    descriptor(FormatId::Dff, Audio, "DSDIFF", &["dff"], true, Some("audio/x-dff"), None),
    descriptor(FormatId::Dsf, Audio, "DSD Stream File", &["dsf"], true, Some("audio/x-dsf"), None),
    descriptor(FormatId::Dts, Audio, "DTS", &["dts", "dtshd"], true, Some("audio/vnd.dts"), Some(FormatId::Mpg)),
    descriptor(FormatId::Eac3, Audio, "Dolby Digital Plus", &["eac3"], true, Some("audio/eac3"), Some(FormatId::Mpg)),
    descriptor(FormatId::Flac, Audio, "FLAC", &["flac"], true, Some("audio/flac"), None),
    descriptor(FormatId::M4a, Audio, "MPEG-4 Audio", &["m4a", "m4b"], true, Some("audio/mp4"), None),
    descriptor(FormatId::Mka, Audio, "Matroska Audio", &["mka"], true, Some("audio/x-matroska"), Some(FormatId::Mkv)),
    descriptor(FormatId::Mlp, Audio, "Meridian Lossless Packing", &["mlp"], true, Some("audio/vnd.dolby.mlp"), Some(FormatId::Mpg)),
    descriptor(FormatId::Mp3, Audio, "MPEG Layer 3", &["mp3"], true, Some("audio/mpeg"), None),
    descriptor(FormatId::Mpa, Audio, "MPEG Audio", &["mpa", "mp2", "m1a", "m2a"], true, Some("audio/mpeg"), None),
    descriptor(FormatId::Mpc, Audio, "Musepack", &["mpc", "mp+", "mpp"], true, Some("audio/x-musepack"), None),
    descriptor(FormatId::Oga, Audio, "Ogg Audio", &["oga", "opus", "spx"], true, Some("audio/ogg"), Some(FormatId::Ogg)),
    descriptor(FormatId::Ra, Audio, "RealAudio", &["ra"], true, Some("audio/vnd.rn-realaudio"), None),
    descriptor(FormatId::Shn, Audio, "Shorten", &["shn"], true, Some("audio/x-shn"), None),
    descriptor(FormatId::ThreeGa, Audio, "3GPP Audio", &["3ga"], true, Some("audio/3gpp"), None),
    descriptor(FormatId::ThreeG2a, Audio, "3GPP2 Audio", &["3g2a"], true, Some("audio/3gpp2"), None),
    descriptor(FormatId::TrueHd, Audio, "Dolby TrueHD", &["thd"], true, Some("audio/vnd.dolby.mlp"), Some(FormatId::Mpg)),
    descriptor(FormatId::Tta, Audio, "True Audio", &["tta"], true, Some("audio/x-tta"), None),
    descriptor(FormatId::Wav, Audio, "Waveform Audio", &["wav", "wave"], true, Some("audio/wav"), None),
    descriptor(FormatId::WavPack, Audio, "WavPack", &["wv"], true, Some("audio/x-wavpack"), None),
    descriptor(FormatId::Wma, Audio, "Windows Media Audio", &["wma"], true, Some("audio/x-ms-wma"), None),
    // Image. Only camera raw needs conversion before a renderer can show it.
    descriptor(FormatId::Bmp, Image, "Bitmap", &["bmp"], false, Some("image/bmp"), None),
    descriptor(FormatId::Gif, Image, "GIF", &["gif"], false, Some("image/gif"), None),
    descriptor(FormatId::Icns, Image, "Apple Icon", &["icns"], false, Some("image/icns"), None),
    descriptor(FormatId::Iff, Image, "Interchange File Format", &["iff", "ilbm", "lbm"], false, Some("image/iff"), None),
    descriptor(FormatId::Jpg, Image, "JPEG", &["jpg", "jpeg", "jpe", "jfif"], false, Some("image/jpeg"), None),
    descriptor(FormatId::Pcx, Image, "PCX", &["pcx"], false, Some("image/x-pcx"), None),
    descriptor(FormatId::Pict, Image, "PICT", &["pict", "pct", "pic"], false, Some("image/x-pict"), None),
    descriptor(FormatId::Png, Image, "PNG", &["png"], false, Some("image/png"), None),
    descriptor(FormatId::Pnm, Image, "Portable Anymap", &["pnm", "pbm", "pgm", "ppm"], false, Some("image/x-portable-anymap"), None),
    descriptor(FormatId::Psd, Image, "Photoshop", &["psd"], false, Some("image/vnd.adobe.photoshop"), None),
    descriptor(FormatId::Raw, Image, "Camera Raw", &["arw", "cr2", "crw", "dng", "nef", "orf", "raf", "rw2", "srw"], true, Some("image/x-dcraw"), None),
    descriptor(FormatId::Tga, Image, "Targa", &["tga"], false, Some("image/x-tga"), None),
    descriptor(FormatId::Tif, Image, "TIFF", &["tif", "tiff"], false, Some("image/tiff"), None),
    descriptor(FormatId::Webp, Image, "WebP", &["webp"], false, Some("image/webp"), None),
    // Container
    descriptor(FormatId::AudioAsVideo, Container, "Audio rendered as video", &[], true, Some("video/mpeg"), None),
    descriptor(FormatId::Avi, Container, "AVI", &["avi", "divx", "xvid"], true, Some("video/x-msvideo"), None),
    descriptor(FormatId::DvrMs, Container, "DVR-MS", &["dvr-ms", "dvr"], true, Some("video/x-ms-dvr"), None),
    descriptor(FormatId::Flv, Container, "Flash Video", &["flv", "f4v"], true, Some("video/x-flv"), None),
    descriptor(FormatId::Mkv, Container, "Matroska", &["mkv", "mk3d"], true, Some("video/x-matroska"), None),
    descriptor(FormatId::Mp4, Container, "MPEG-4", &["mp4", "m4v", "mov", "qt", "3gp", "3g2"], true, Some("video/mp4"), None),
    descriptor(FormatId::Mpg, Container, "MPEG Program Stream", &["mpg", "mpeg", "mpe", "m2p", "vob", "mod", "tod", "vro", "dat"], true, Some("video/mpeg"), None),
    descriptor(FormatId::Ogg, Container, "Ogg", &["ogg", "ogv", "ogm", "ogx"], true, Some("video/ogg"), None),
    descriptor(FormatId::Ts, Container, "MPEG Transport Stream", &["ts", "m2ts", "mts", "tp", "trp", "m2t"], true, Some("video/vnd.dlna.mpeg-tts"), None),
    descriptor(FormatId::Webm, Container, "WebM", &["webm"], true, Some("video/webm"), None),
    descriptor(FormatId::Wmv, Container, "Windows Media Video", &["wmv", "asf"], true, Some("video/x-ms-wmv"), None),
    // Video elementary streams
    descriptor(FormatId::H264, Video, "H.264 elementary stream", &["h264", "264", "avc"], true, Some("video/h264"), None),
    descriptor(FormatId::Hevc, Video, "HEVC elementary stream", &["h265", "265", "hevc"], true, Some("video/h265"), None),
    descriptor(FormatId::M2v, Video, "MPEG-2 elementary stream", &["m2v", "mpv"], true, Some("video/mpeg"), None),
    descriptor(FormatId::RealVideo, Video, "RealVideo", &["rm", "rmvb"], true, Some("application/vnd.rn-realmedia"), None),
    // Playlist
    descriptor(FormatId::Cue, Playlist, "Cue sheet", &["cue"], false, Some("application/x-cue"), None),
    descriptor(FormatId::M3u, Playlist, "M3U playlist", &["m3u"], false, Some("audio/x-mpegurl"), None),
    descriptor(FormatId::M3u8, Playlist, "HLS playlist", &["m3u8"], false, Some("application/vnd.apple.mpegurl"), None),
    descriptor(FormatId::Pls, Playlist, "PLS playlist", &["pls"], false, Some("audio/x-scpls"), None),
    descriptor(FormatId::Wpl, Playlist, "Windows Media playlist", &["wpl"], false, Some("application/vnd.ms-wpl"), None),
    // Disc image
    descriptor(FormatId::Iso, Iso, "Disc image", &["iso", "img", "udf"], true, None, None),
    // Subtitles
    descriptor(FormatId::Ass, Subtitles, "(Advanced) SubStation Alpha", &["ass", "ssa"], false, Some("text/x-ssa"), None),
    descriptor(FormatId::MicroDvd, Subtitles, "MicroDVD", &["sub"], false, Some("text/plain"), None),
    descriptor(FormatId::Sami, Subtitles, "SAMI", &["smi"], false, Some("application/smil"), None),
    descriptor(FormatId::SubRip, Subtitles, "SubRip", &["srt"], false, Some("application/x-subrip"), None),
    descriptor(FormatId::Sup, Subtitles, "Blu-ray subtitles", &["sup"], false, None, None),
    descriptor(FormatId::Ttml, Subtitles, "Timed Text Markup Language", &["ttml", "dfxp"], false, Some("application/ttml+xml"), None),
    descriptor(FormatId::VobSub, Subtitles, "VobSub", &["idx"], false, None, None),
    descriptor(FormatId::WebVtt, Subtitles, "WebVTT", &["vtt"], false, Some("text/vtt"), None),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_reduces_to_video() {
        assert_eq!(FormatCategory::Container.media_kind(), Some(MediaKind::Video));
        assert_eq!(FormatCategory::Iso.media_kind(), Some(MediaKind::Video));
        assert_eq!(FormatCategory::Playlist.media_kind(), None);
        assert_eq!(FormatCategory::Subtitles.media_kind(), None);
    }

    #[test]
    fn only_wrappers_have_no_extensions() {
        for d in FORMATS {
            if d.extensions.is_empty() {
                assert_eq!(d.category, FormatCategory::Container, "{}", d.identifier);
            }
        }
    }

    #[test]
    fn extensions_are_normalized() {
        for d in FORMATS {
            for ext in d.extensions {
                assert_eq!(*ext, ext.to_lowercase(), "{}", d.identifier);
                assert!(!ext.starts_with('.'), "{}", d.identifier);
            }
        }
    }

    #[test]
    fn display_matches_serde() {
        let json = serde_json::to_string(&FormatId::ThreeG2a).unwrap();
        assert_eq!(json, format!("\"{}\"", FormatId::ThreeG2a));
        let json = serde_json::to_string(&FormatId::AudioAsVideo).unwrap();
        assert_eq!(json, format!("\"{}\"", FormatId::AudioAsVideo));
    }

    #[test]
    fn missing_mime_falls_back_to_default() {
        let iso = FORMATS
            .iter()
            .find(|d| d.identifier == FormatId::Iso)
            .unwrap();
        assert_eq!(iso.mime_type_or_default(), DEFAULT_MIME_TYPE);
        assert_eq!(iso.primary_extension(), Some("iso"));
        assert!(iso.declares_extension("IMG"));
    }
}
