//! Probes against real tools. Skipped when ffmpeg or ffprobe is missing.

use std::path::Path;
use std::time::Duration;

use castforged_av::{check_tool, Error, FfmpegBitstreamProbe, FfprobeProber};
use castforged_avc::{extract_header, BitstreamProbe, MediaInput};

#[test]
fn ffprobe_finds_no_h264_in_text_file() {
    if !check_tool("ffprobe").available {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.mkv");
    std::fs::write(&file, b"plain text, not matroska").unwrap();

    let prober = FfprobeProber::from_path().unwrap();
    match prober.probe(&file, Duration::from_secs(10)) {
        // Some builds detect text as a tty stream; it is never H.264.
        Ok(media) => assert!(media.h264_metadata(file.as_path()).is_none()),
        Err(err) => assert!(matches!(err, Error::ToolFailed { .. } | Error::ParseError { .. })),
    }
}

#[test]
fn ffmpeg_probe_of_text_file_has_no_header() {
    if !check_tool("ffmpeg").available {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.mp4");
    std::fs::write(&file, b"plain text, not mp4").unwrap();

    let probe = FfmpegBitstreamProbe::from_path().unwrap();
    let input = MediaInput::from(file.as_path());
    if let Some(frame) = probe.probe(&input, Duration::from_secs(10)) {
        assert!(extract_header(&frame).is_err());
    }
}

#[test]
fn ffmpeg_probe_of_missing_file_is_none() {
    let probe = FfmpegBitstreamProbe::discover(None)
        .unwrap_or_else(|_| FfmpegBitstreamProbe::new("/nonexistent/ffmpeg".into()));
    let input = MediaInput::from(Path::new("/nonexistent/movie.mkv"));
    assert!(probe.probe(&input, Duration::from_secs(5)).is_none());
}
