//! Integration tests for the pcreg binary
//!
//! These tests run the CLI against a temporary workspace and check the
//! JSON envelope and what ends up in the store directory.

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn pcreg(workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pcreg"))
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .env_remove("PCREG_AUTOSAVE_DELAY_MS")
        .env_remove("PCREG_EXPORT_DIR")
        .env_remove("PCREG_AUTHOR")
        .output()
        .expect("Failed to execute pcreg")
}

fn json_of(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

fn init(dir: &TempDir) {
    let output = Command::new(env!("CARGO_BIN_EXE_pcreg"))
        .arg("init")
        .arg(dir.path())
        .output()
        .expect("Failed to execute pcreg");
    assert!(output.status.success(), "init failed: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_init_json_output_is_valid() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_pcreg"))
        .arg("init")
        .arg(dir.path())
        .arg("--json")
        .output()
        .expect("Failed to execute pcreg");

    assert!(output.status.success());
    let parsed = json_of(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["boot"], "initialized");

    assert!(dir.path().join(".pcreg/config.toml").exists());
    assert!(dir.path().join(".pcreg/store/PCREG_STATE_V2.json").exists());
}

#[test]
fn test_init_twice_requires_force() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_pcreg"))
        .arg("init")
        .arg(dir.path())
        .output()
        .expect("Failed to execute pcreg");
    assert!(!output.status.success());
}

#[test]
fn test_out_of_range_delay_is_clamped() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    let added = pcreg(dir.path(), &["--json", "train", "add", "SD92", "--mission", "M1", "--od", "A → B"]);
    assert!(added.status.success());
    let id = json_of(&added)["data"]["id"].as_str().unwrap().to_string();

    let delayed = pcreg(dir.path(), &["--json", "train", "delay", &id, "5000"]);
    assert!(delayed.status.success());
    let parsed = json_of(&delayed);
    assert_eq!(parsed["data"]["requested_min"], 5000);
    assert_eq!(parsed["data"]["stored_min"], 999);

    // A fresh process reads the committed value back from disk
    let listed = pcreg(dir.path(), &["--json", "train", "list"]);
    let parsed = json_of(&listed);
    assert_eq!(parsed["data"][0]["delay"], "+999 min");

    let logs = pcreg(dir.path(), &["--json", "log", "list", "--type", "decision"]);
    let parsed = json_of(&logs);
    let text = parsed["data"][0]["text"].as_str().unwrap();
    assert!(text.contains("+999 min"), "unexpected journal text: {}", text);
}

#[test]
fn test_invalid_import_fails_and_keeps_board() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    pcreg(dir.path(), &["train", "add", "TER 1", "--mission", "M", "--od", "X → Y"]);

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{ not json").unwrap();

    let output = pcreg(dir.path(), &["--json", "import", bad.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"error\""));

    let listed = json_of(&pcreg(dir.path(), &["--json", "train", "list"]));
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[test]
fn test_export_then_import_restores_board() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    pcreg(dir.path(), &["train", "add", "TER 1", "--mission", "M", "--od", "X → Y"]);

    let exported = json_of(&pcreg(dir.path(), &["--json", "export", "-o", "exports"]));
    let path = exported["data"]["path"].as_str().unwrap().to_string();
    assert!(Path::new(&path).exists());

    let reset = pcreg(dir.path(), &["reset", "--yes"]);
    assert!(reset.status.success());
    let listed = json_of(&pcreg(dir.path(), &["--json", "train", "list"]));
    assert!(listed["data"].as_array().unwrap().is_empty());

    let imported = json_of(&pcreg(dir.path(), &["--json", "import", &path]));
    assert_eq!(imported["data"]["trains"], 1);
}

#[test]
fn test_reset_without_confirmation_is_refused() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    pcreg(dir.path(), &["train", "add", "TER 1", "--mission", "M", "--od", "X → Y"]);

    let output = pcreg(dir.path(), &["reset"]);
    assert!(!output.status.success());

    let listed = json_of(&pcreg(dir.path(), &["--json", "train", "list"]));
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[test]
fn test_snapshot_restore_round_trip() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    pcreg(dir.path(), &["train", "add", "TER 1", "--mission", "M", "--od", "X → Y"]);

    let created = json_of(&pcreg(dir.path(), &["--json", "snapshot", "create", "before"]));
    let snap_id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["name"], "before");

    pcreg(dir.path(), &["train", "add", "TER 2", "--mission", "M", "--od", "X → Y"]);
    let restored = pcreg(dir.path(), &["snapshot", "restore", &snap_id]);
    assert!(restored.status.success());

    let listed = json_of(&pcreg(dir.path(), &["--json", "train", "list"]));
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let missing = pcreg(dir.path(), &["snapshot", "restore", "SNAP_missing"]);
    assert!(!missing.status.success());
}

#[test]
fn test_autosave_delay_flag_is_range_checked() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    let rejected = pcreg(dir.path(), &["--autosave-delay-ms", "18446744073709551615", "train", "list"]);
    assert!(!rejected.status.success());

    let accepted = pcreg(dir.path(), &["--json", "--autosave-delay-ms", "60000", "status", "--config"]);
    assert!(accepted.status.success());
    let parsed = json_of(&accepted);
    let entries = parsed["data"]["config"].as_array().unwrap();
    let delay = entries.iter().find(|e| e["key"] == "autosave_delay_ms").unwrap();
    assert_eq!(delay["value"], "60000 ms");
    assert_eq!(delay["source"], "Cli");
}

#[test]
fn test_missing_workspace_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = pcreg(dir.path(), &["status"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not in a pcreg workspace"));
}
