#![allow(deprecated)]

/// End-to-end tests for the `liftlog` binary
///
/// Only commands that need no terminal and no network: history, config
/// checks and one-shot listing against the in-memory backend.
use assert_cmd::Command;
use predicates::prelude::*;
mod common;

const LIFTLOG_ENV: [&str; 12] = [
    "LIFTLOG_FIREBASE_API_KEY",
    "LIFTLOG_FIREBASE_AUTH_DOMAIN",
    "LIFTLOG_FIREBASE_PROJECT_ID",
    "LIFTLOG_FIREBASE_STORAGE_BUCKET",
    "LIFTLOG_FIREBASE_SENDER_ID",
    "LIFTLOG_FIREBASE_APP_ID",
    "LIFTLOG_FIREBASE_MEASUREMENT_ID",
    "LIFTLOG_STORE_BACKEND",
    "LIFTLOG_STORE_COLLECTION",
    "LIFTLOG_LOG_LEVEL",
    "LIFTLOG_STORE_POLL_INTERVAL_MS",
    "LIFTLOG_JSON_LOGS",
];

fn liftlog(config_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("liftlog").unwrap();
    for var in LIFTLOG_ENV {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(config_path);
    cmd
}

#[test]
fn test_history_shows_sample_entries() {
    let (_temp_dir, config_path) = common::temp_config_file("logging:\n  level: warn\n");

    liftlog(&config_path)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Push-ups"))
        .stdout(predicate::str::contains("2024-02-18"))
        .stdout(predicate::str::contains("Squats"))
        .stdout(predicate::str::contains("2024-02-17"));
}

#[test]
fn test_check_config_lists_missing_keys() {
    let (_temp_dir, config_path) = common::temp_config_file(
        "firebase:\n  api_key: key\n  project_id: demo\nlogging:\n  level: warn\n",
    );

    liftlog(&config_path)
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("authDomain"))
        .stderr(predicate::str::contains("appId"))
        .stderr(predicate::str::contains("apiKey").not());
}

#[test]
fn test_check_config_complete() {
    let (_temp_dir, config_path) = common::temp_config_file(common::COMPLETE_FIREBASE_YAML);

    liftlog(&config_path)
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"));
}

#[test]
fn test_list_memory_backend_shows_empty_message() {
    let (_temp_dir, config_path) = common::temp_config_file(common::COMPLETE_FIREBASE_YAML);

    liftlog(&config_path)
        .args(["--backend", "memory", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises yet. Add one above!"));
}

#[test]
fn test_list_json_memory_backend_is_empty_array() {
    let (_temp_dir, config_path) = common::temp_config_file(common::COMPLETE_FIREBASE_YAML);

    let output = liftlog(&config_path)
        .args(["--backend", "memory", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn test_list_with_missing_keys_is_blocked() {
    let (_temp_dir, config_path) =
        common::temp_config_file("store:\n  backend: memory\nlogging:\n  level: error\n");

    liftlog(&config_path)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration Error"))
        .stderr(predicate::str::contains("Missing Firebase configuration keys"));
}

#[test]
fn test_invalid_log_level_rejected() {
    let (_temp_dir, config_path) = common::temp_config_file("logging:\n  level: loud\n");

    liftlog(&config_path).arg("history").assert().failure();
}

#[test]
fn test_unknown_backend_rejected_by_parser() {
    let (_temp_dir, config_path) = common::temp_config_file("logging:\n  level: warn\n");

    liftlog(&config_path)
        .args(["--backend", "sqlite", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sqlite"));
}

#[test]
fn test_startup_warnings_reach_stderr() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.yaml");

    liftlog(&missing)
        .env("HOME", temp_dir.path())
        .env("XDG_CONFIG_HOME", temp_dir.path())
        .env("LIFTLOG_JSON_LOGS", "maybe")
        .env("LIFTLOG_STORE_POLL_INTERVAL_MS", "abc")
        .arg("history")
        .assert()
        .success()
        .stderr(predicate::str::contains("Config file not found"))
        .stderr(predicate::str::contains("LIFTLOG_JSON_LOGS"))
        .stderr(predicate::str::contains("LIFTLOG_STORE_POLL_INTERVAL_MS"));
}

#[test]
fn test_check_config_reports_analytics() {
    let yaml = format!("{}  measurement_id: G-123\n", common::COMPLETE_FIREBASE_YAML);
    let (_temp_dir, config_path) = common::temp_config_file(&yaml);

    liftlog(&config_path)
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Analytics:  enabled (G-123)"));
}
