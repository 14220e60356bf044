//! End-to-end compatibility checks through the public API

use castforged_avc::{
    clean_header, evaluate_h264_compatibility, extract_header, AvcHeader, H264Limits,
    H264Metadata, IncompatibilityReason, Level, NoBitstreamProbe, ScanError,
    StaticBitstreamProbe,
};

/// AUD, SPS (Baseline, level 3.1, 6 reference frames), PPS, IDR slice.
fn baseline_frame() -> Vec<u8> {
    vec![
        0x00, 0x00, 0x00, 0x01, 0x09, 0xF0, //
        0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1F, 0xD9, 0xE0, //
        0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80, //
        0x00, 0x00, 0x01, 0x65, 0x88, 0x84, 0x00, 0x33, 0x91, 0x2A,
    ]
}

#[test]
fn high_level_is_accepted_without_probing() {
    let metadata = H264Metadata::new("movie.mkv", 1920, 1080)
        .with_level(Level::Level4_0)
        .with_ref_frames(4);

    let verdict = evaluate_h264_compatibility(&metadata, &NoBitstreamProbe);

    assert!(verdict.compatible);
    assert_eq!(verdict.reason, None);
}

#[test]
fn probed_reference_frames_exceed_limit() {
    let metadata = H264Metadata::new("movie.mp4", 1920, 1080).with_ref_frames(0);
    let probe = StaticBitstreamProbe::new(baseline_frame());

    let verdict = evaluate_h264_compatibility(&metadata, &probe);

    assert!(!verdict.compatible);
    assert_eq!(verdict.level, Some(Level::Level3_1));
    assert_eq!(verdict.reference_frame_count, Some(6));
    assert_eq!(verdict.max_reference_frames_for_resolution, Some(4));
    assert_eq!(verdict.reason, Some(IncompatibilityReason::ReferenceFrameCountExceeded));
}

#[test]
fn probed_stream_fits_smaller_resolution() {
    let metadata = H264Metadata::new("clip.ts", 1280, 720);
    let probe = StaticBitstreamProbe::new(baseline_frame());

    let verdict = evaluate_h264_compatibility(&metadata, &probe);

    assert!(verdict.compatible);
    assert_eq!(verdict.max_reference_frames_for_resolution, Some(11));
}

#[test]
fn failed_probe_leaves_level_missing() {
    let metadata = H264Metadata::new("movie.avi", 1920, 1080);

    let verdict = evaluate_h264_compatibility(&metadata, &NoBitstreamProbe);

    assert!(!verdict.compatible);
    assert_eq!(verdict.reason, Some(IncompatibilityReason::MissingLevel));
}

#[test]
fn garbage_probe_output_leaves_level_missing() {
    let metadata = H264Metadata::new("movie.avi", 1920, 1080);
    let probe = StaticBitstreamProbe::new(vec![0xFF; 128]);

    let verdict = evaluate_h264_compatibility(&metadata, &probe);

    assert_eq!(verdict.reason, Some(IncompatibilityReason::MissingLevel));
}

#[test]
fn extract_and_parse_header() {
    let frame = baseline_frame();
    let header = extract_header(&frame).unwrap();
    let cleaned = clean_header(header);

    assert_eq!(cleaned[0], 0x42);

    let parsed = AvcHeader::parse(cleaned);
    assert_eq!(parsed.level(), Some(Level::Level3_1));
    assert_eq!(parsed.reference_frame_count, Some(6));
}

#[test]
fn truncated_frames_have_no_keyframe() {
    let frame = baseline_frame();
    for len in 0..29 {
        assert_eq!(extract_header(&frame[..len]), Err(ScanError::NoKeyframe));
    }
}

#[test]
fn max_reference_frames_for_common_resolutions() {
    let limits = H264Limits::default();
    assert_eq!(limits.max_reference_frames(1920, 1080), Some(4));
    assert_eq!(limits.max_reference_frames(1280, 720), Some(11));
    assert_eq!(limits.max_reference_frames(720, 576), Some(24));
}
