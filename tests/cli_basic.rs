//! Integration tests for basic CLI behavior.
//!
//! None of these reach the speech provider or FFmpeg: they cover flag
//! parsing and the failures reported before a run starts.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

fn reels() -> Command {
    let mut cmd = Command::cargo_bin("bilingual-reels").expect("binary 'bilingual-reels' should be built");
    cmd.env_remove("SPEECH_API_KEY").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_flag_shows_usage() {
    reels()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: bilingual-reels"))
        .stdout(predicate::str::contains("--hook"))
        .stdout(predicate::str::contains("--body"))
        .stdout(predicate::str::contains("--pillar"))
        .stdout(predicate::str::contains("--keep-intermediates"));
}

#[test]
fn version_flag_prints_version() {
    reels()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_body_is_a_usage_error() {
    reels()
        .args(["--hook", "BITCOIN HITS SEVENTY THOUSAND!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--body"));
}

#[test]
fn blank_hook_fails_validation() {
    reels()
        .args(["--hook", "   ", "--body", "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627}"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("validation failed"))
        .stderr(predicate::str::contains("hook text is empty"));
}

#[test]
fn bad_run_id_fails_validation() {
    reels()
        .args(["--hook", "hi", "--body", "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627}", "--run-id", "../escape"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("run id '../escape'"));
}

#[test]
fn missing_api_key_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    reels()
        .args(["--hook", "hi", "--body", "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627}"])
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("speech.api_key"));
}

#[test]
fn missing_config_file_is_reported() {
    reels()
        .args(["--hook", "hi", "--body", "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627}"])
        .args(["--config", "/definitely/not/here/reels.toml"])
        .assert()
        .failure();
}
