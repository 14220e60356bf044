//! Media classification facade.

use std::path::Path;
use std::time::Duration;

use castforged_avc::{
    evaluate_h264_compatibility_with_limits, BitstreamProbe, CompatibilityVerdict, H264Limits,
    H264Metadata, DEFAULT_PROBE_TIMEOUT,
};
use castforged_formats::{
    FormatDescriptor, FormatRegistry, RegistryError, SubtitleTypeDescriptor, SubtitleTypeRegistry,
};

use crate::config::Config;

/// Format registry, subtitle registry and H.264 limits, built once and
/// shared read-only.
#[derive(Debug, Clone)]
pub struct MediaClassifier {
    formats: FormatRegistry,
    subtitles: SubtitleTypeRegistry,
    limits: H264Limits,
    probe_timeout: Duration,
}

impl MediaClassifier {
    /// Build both registries from the static tables with default limits.
    pub fn build() -> Result<Self, RegistryError> {
        let classifier = Self {
            formats: FormatRegistry::build()?,
            subtitles: SubtitleTypeRegistry::build()?,
            limits: H264Limits::default(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        };

        tracing::debug!(
            formats = classifier.formats.len(),
            subtitle_types = classifier.subtitles.iter().count(),
            "media classifier built"
        );

        Ok(classifier)
    }

    /// Build with limits and probe timeout taken from configuration.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        Ok(Self::build()?
            .with_limits(config.h264.limits())
            .with_probe_timeout(config.probe.timeout()))
    }

    pub fn with_limits(mut self, limits: H264Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn subtitles(&self) -> &SubtitleTypeRegistry {
        &self.subtitles
    }

    pub fn limits(&self) -> &H264Limits {
        &self.limits
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Classify by extension (case-insensitive, leading dot tolerated).
    pub fn classify_format(&self, extension: &str) -> Option<&FormatDescriptor> {
        self.formats.lookup_by_extension(extension)
    }

    /// Classify by the extension of a file name or path.
    pub fn classify_file(&self, path: impl AsRef<Path>) -> Option<&FormatDescriptor> {
        self.formats.lookup_by_filename(path)
    }

    /// Classify a subtitle by codec signature or by file extension.
    ///
    /// Never fails: unmatched input resolves to the `Unknown` descriptor.
    pub fn classify_subtitle(&self, value: &str, by_signature: bool) -> &SubtitleTypeDescriptor {
        if by_signature {
            self.subtitles.by_codec_signature(value)
        } else {
            self.subtitles.by_extension(value)
        }
    }

    /// Decide whether an H.264 track can be streamed to the renderer as is.
    pub fn evaluate_h264_compatibility(
        &self,
        metadata: &H264Metadata,
        probe: &dyn BitstreamProbe,
    ) -> CompatibilityVerdict {
        evaluate_h264_compatibility_with_limits(metadata, probe, &self.limits, self.probe_timeout)
    }
}
