//! CLI end-to-end tests
//!
//! Tests for castforged command-line interface.

use predicates::prelude::*;
use std::fs;
use assert_cmd::Command;
use tempfile::tempdir;

/// Get a command for the castforged binary
#[allow(deprecated)]
fn castforged_cmd() -> Command {
    Command::cargo_bin("castforged").unwrap()
}

/// AUD, SPS (Baseline, level 3.1, 6 reference frames), PPS, IDR slice.
const BASELINE_FRAME: &[u8] = &[
    0x00, 0x00, 0x00, 0x01, 0x09, 0xF0, //
    0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1F, 0xD9, 0xE0, //
    0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80, //
    0x00, 0x00, 0x01, 0x65, 0x88, 0x84, 0x00, 0x33,
];

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = castforged_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = castforged_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("castforged"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = castforged_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_format_by_extension() {
    let mut cmd = castforged_cmd();
    cmd.args(["format", ".MKV"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Format: mkv"))
        .stdout(predicate::str::contains("Category: container"))
        .stdout(predicate::str::contains("video/x-matroska"));
}

#[test]
fn test_cli_format_by_filename() {
    let mut cmd = castforged_cmd();
    cmd.args(["format", "/media/Concert.AC3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Format: ac3"))
        .stdout(predicate::str::contains("Secondary format: mpg"));
}

#[test]
fn test_cli_format_unknown_fails() {
    let mut cmd = castforged_cmd();
    cmd.args(["format", "xyz123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}

#[test]
fn test_cli_format_json() {
    let output = castforged_cmd()
        .args(["format", "m3u8", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["category"], "playlist");
    assert_eq!(json["transcodable"], false);
}

#[test]
fn test_cli_subtitle_by_codec() {
    let mut cmd = castforged_cmd();
    cmd.args(["subtitle", "S_HDMV/PGS", "--codec"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stable index: 12"))
        .stdout(predicate::str::contains("Category: picture"));
}

#[test]
fn test_cli_subtitle_unknown_is_not_an_error() {
    let mut cmd = castforged_cmd();
    cmd.args(["subtitle", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stable index: 0"));
}

#[test]
fn test_cli_formats_lists_table() {
    let mut cmd = castforged_cmd();
    cmd.arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("FORMAT"))
        .stdout(predicate::str::contains("flac"));
}

#[test]
fn test_cli_subtitles_json() {
    let output = castforged_cmd().args(["subtitles", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 18);
    assert!(entries
        .iter()
        .any(|e| e["stable_index"] == 13 && e["subtitle_type"] == "webvtt"));
}

#[test]
fn test_cli_h264_from_stdin_rejected_at_1080p() {
    let output = castforged_cmd()
        .args(["h264", "-", "--width", "1920", "--height", "1080", "--json"])
        .write_stdin(BASELINE_FRAME)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["compatible"], false);
    assert_eq!(json["max_reference_frames_for_resolution"], 4);

    // With ffmpeg the header is recovered and its 6 reference frames exceed
    // the 1080p maximum; without it the level stays unknown.
    let reason = json["reason"].as_str().unwrap();
    if json["level"].is_null() {
        assert_eq!(reason, "missing_level");
    } else {
        assert_eq!(json["level"], "3.1");
        assert_eq!(json["reference_frame_count"], 6);
        assert_eq!(reason, "reference_frame_count_exceeded");
    }
}

#[test]
fn test_cli_h264_known_metadata_without_probe() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("clip.mp4");
    fs::write(&file, b"").unwrap();

    castforged_cmd()
        .args(["h264", file.to_str().unwrap()])
        .args(["--width", "1280", "--height", "720", "--level", "3.1", "--ref-frames", "9"])
        .arg("--no-probe")
        .assert()
        .success()
        .stdout(predicate::str::contains("Max reference frames: 11"))
        .stdout(predicate::str::contains("Result: compatible"));
}

#[test]
fn test_cli_h264_missing_level_without_probe() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("clip.mp4");
    fs::write(&file, b"").unwrap();

    castforged_cmd()
        .args(["h264", file.to_str().unwrap(), "--width", "1920", "--height", "1080", "--no-probe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("incompatible: level is unknown"));
}

#[test]
fn test_cli_h264_stdin_requires_resolution() {
    castforged_cmd()
        .args(["h264", "-"])
        .write_stdin(BASELINE_FRAME)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--width and --height"));
}

#[test]
fn test_cli_h264_rejects_bad_level() {
    castforged_cmd()
        .args(["h264", "-", "--level", "banana"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid H.264 level"));
}

#[test]
fn test_cli_inspect_missing_file() {
    castforged_cmd()
        .args(["inspect", "/nonexistent/movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = castforged_cmd();
    cmd.arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").and(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("castforged.toml");
    fs::write(
        &config_path,
        r#"
[probe]
timeout_secs = 10

[h264]
level_threshold = "4.1"
"#,
    )
    .unwrap();

    castforged_cmd()
        .args(["validate", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("level threshold: 4.1"))
        .stdout(predicate::str::contains("timeout: 10s"));
}

#[test]
fn test_cli_validate_rejects_zero_budget() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("castforged.toml");
    fs::write(&config_path, "[h264]\ndpb_pixel_budget = 0\n").unwrap();

    castforged_cmd()
        .args(["validate", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pixel budget"));
}

#[test]
fn test_cli_global_config_flag_with_invalid_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("broken.toml");
    fs::write(&config_path, "this is not toml [").unwrap();

    castforged_cmd()
        .args(["--config", config_path.to_str().unwrap(), "check-tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
