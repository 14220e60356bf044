//! Whole-file inspection: format, subtitle tracks and H.264 compatibility.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use castforged_av::{FfmpegBitstreamProbe, FfprobeProber, ProbedMedia, VideoStreamInfo};
use castforged_avc::{BitstreamProbe, CompatibilityVerdict, H264Metadata, NoBitstreamProbe};
use castforged_formats::{
    FormatCategory, FormatDescriptor, FormatId, SubtitleCategory, SubtitleType,
    SubtitleTypeDescriptor,
};
use serde::Serialize;

use crate::classifier::MediaClassifier;
use crate::config::Config;

#[derive(Debug, Clone, Serialize)]
pub struct FormatSummary {
    pub identifier: FormatId,
    pub category: FormatCategory,
    pub description: &'static str,
    pub mime_type: &'static str,
    pub transcodable: bool,
}

impl From<&FormatDescriptor> for FormatSummary {
    fn from(d: &FormatDescriptor) -> Self {
        Self {
            identifier: d.identifier,
            category: d.category,
            description: d.description,
            mime_type: d.mime_type_or_default(),
            transcodable: d.transcodable,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubtitleSummary {
    /// Stream index, absent for external subtitle files
    pub stream_index: Option<u32>,
    /// Codec signature or extension the type was derived from
    pub source: String,
    pub language: Option<String>,
    pub subtitle_type: SubtitleType,
    pub stable_index: i32,
    pub category: SubtitleCategory,
}

impl SubtitleSummary {
    fn new(source: &str, descriptor: &SubtitleTypeDescriptor) -> Self {
        Self {
            stream_index: None,
            source: source.to_string(),
            language: None,
            subtitle_type: descriptor.subtitle_type,
            stable_index: descriptor.stable_index,
            category: descriptor.category,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub format: Option<FormatSummary>,
    /// Set when the file itself is a subtitle file
    pub external_subtitle: Option<SubtitleSummary>,
    /// Container reported by ffprobe
    pub container: Option<String>,
    pub video: Option<VideoStreamInfo>,
    pub subtitles: Vec<SubtitleSummary>,
    /// Present for H.264 video only
    pub h264: Option<CompatibilityVerdict>,
}

/// Inspect a file on disk.
///
/// Extension-based classification always runs. Stream details need
/// ffprobe; when it is unavailable they are left empty and a warning is
/// logged.
pub async fn inspect_file(
    classifier: Arc<MediaClassifier>,
    config: &Config,
    path: &Path,
) -> Result<InspectReport> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {:?}", path);
    }

    let format = classifier.classify_file(path);

    let external_subtitle = format
        .filter(|d| d.category == FormatCategory::Subtitles)
        .and_then(|_| path.extension()?.to_str())
        .map(|ext| SubtitleSummary::new(ext, classifier.classify_subtitle(ext, false)));

    let mut report = InspectReport {
        path: path.to_path_buf(),
        format: format.map(FormatSummary::from),
        external_subtitle,
        container: None,
        video: None,
        subtitles: Vec::new(),
        h264: None,
    };

    let Some(media) = probe_media(config, path).await? else {
        return Ok(report);
    };

    report.subtitles = media
        .subtitles
        .iter()
        .map(|s| SubtitleSummary {
            stream_index: Some(s.index),
            language: s.language.clone(),
            ..SubtitleSummary::new(&s.codec, classifier.classify_subtitle(&s.codec, true))
        })
        .collect();

    if let Some(metadata) = media.h264_metadata(path) {
        report.h264 = Some(evaluate(classifier, config, metadata).await?);
    }

    report.container = media.container;
    report.video = media.video;

    Ok(report)
}

/// Run ffprobe on a file, or `None` when ffprobe is not installed.
pub async fn probe_media(config: &Config, path: &Path) -> Result<Option<ProbedMedia>> {
    let prober = match FfprobeProber::discover(config.tools.ffprobe_path.as_deref()) {
        Ok(prober) => prober,
        Err(e) => {
            tracing::warn!("Skipping stream inspection: {}", e);
            return Ok(None);
        }
    };

    let media = prober
        .probe_async(path, config.probe.timeout())
        .await
        .with_context(|| format!("Failed to probe {:?}", path))?;

    Ok(Some(media))
}

/// The bitstream probe selected by configuration.
pub fn bitstream_probe(config: &Config) -> Box<dyn BitstreamProbe> {
    if !config.probe.enabled {
        return Box::new(NoBitstreamProbe);
    }

    match FfmpegBitstreamProbe::discover(config.tools.ffmpeg_path.as_deref()) {
        Ok(probe) => Box::new(probe),
        Err(e) => {
            tracing::warn!("Bitstream probing disabled: {}", e);
            Box::new(NoBitstreamProbe)
        }
    }
}

/// Evaluate H.264 compatibility off the async executor; the bitstream probe
/// blocks for up to the probe timeout.
pub async fn evaluate(
    classifier: Arc<MediaClassifier>,
    config: &Config,
    metadata: H264Metadata,
) -> Result<CompatibilityVerdict> {
    let probe = bitstream_probe(config);

    let verdict = tokio::task::spawn_blocking(move || {
        classifier.evaluate_h264_compatibility(&metadata, probe.as_ref())
    })
    .await
    .context("H.264 evaluation task failed")?;

    Ok(verdict)
}
