use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn autoreply(workdir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_autoreply"));
    cmd.current_dir(workdir)
        .arg("--config")
        .arg(workdir.join("absent.yaml"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_API_KEYS")
        .env_remove("FB_ACCESS_TOKEN")
        .env_remove("FB_POST_ID")
        .env_remove("AUTOREPLY_OPERATOR_NAME")
        .env_remove("AUTOREPLY_DEFAULT_TEXT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn rehearse_reports_every_thread_as_json() {
    let workdir = tempdir().expect("temp dir");
    let assert = autoreply(workdir.path())
        .args(["--output", "json", "rehearse", "--name", "Page Admin", "-t", "hi"])
        .arg("--fixture")
        .arg(fixture("thread.yaml"))
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");

    let result = &value["report"]["result"];
    assert_eq!(result["attempted"].as_u64(), Some(4));
    assert_eq!(result["succeeded"].as_u64(), Some(1));
    assert_eq!(result["skipped"].as_u64(), Some(2));

    assert_eq!(value["report"]["discovery"]["sort"].as_str(), Some("switched"));
    assert_eq!(value["report"]["discovery"]["clicked"].as_u64(), Some(1));

    let submissions = value["submissions"].as_array().expect("submissions");
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["text"].as_str(), Some("hi"));

    let statuses: Vec<&str> = value["report"]["outcomes"]
        .as_array()
        .expect("outcomes")
        .iter()
        .filter_map(|outcome| outcome["status"].as_str())
        .collect();
    assert_eq!(
        statuses,
        ["replied", "skipped_duplicate", "skipped_duplicate", "failed"]
    );
}

#[test]
fn rehearse_without_default_text_sends_the_safety_reply() {
    let workdir = tempdir().expect("temp dir");
    let assert = autoreply(workdir.path())
        .args(["-o", "json", "rehearse"])
        .arg("--fixture")
        .arg(fixture("thread.yaml"))
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    // No operator name: nothing is treated as already answered.
    assert_eq!(value["report"]["result"]["skipped"].as_u64(), Some(0));
    let texts: Vec<&str> = value["submissions"]
        .as_array()
        .expect("submissions")
        .iter()
        .filter_map(|s| s["text"].as_str())
        .collect();
    assert_eq!(texts.len(), 3);
    assert!(texts
        .iter()
        .all(|text| *text == "Thanks so much for your comment!"));
}

#[test]
fn missing_fixture_fails_with_context() {
    let workdir = tempdir().expect("temp dir");
    let assert = autoreply(workdir.path())
        .args(["rehearse", "--fixture", "nope.yaml"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Failed to load fixture"), "stderr: {stderr}");
}

#[test]
fn graph_commands_require_an_access_token() {
    let workdir = tempdir().expect("temp dir");
    let assert = autoreply(workdir.path())
        .args(["comment", "--post-id", "1_2", "--message", "hello"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("FB_ACCESS_TOKEN"), "stderr: {stderr}");
}

#[test]
fn log_filter_from_env_file_applies() {
    let workdir = tempdir().expect("temp dir");
    std::fs::write(workdir.path().join(".env"), "RUST_LOG=debug\n").expect("write .env");

    let assert = autoreply(workdir.path())
        .args(["-o", "json", "rehearse"])
        .arg("--fixture")
        .arg(fixture("thread.yaml"))
        .assert()
        .success();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("settings resolved"), "stderr: {stderr}");
    assert!(stderr.contains("loaded environment from .env"), "stderr: {stderr}");
}
