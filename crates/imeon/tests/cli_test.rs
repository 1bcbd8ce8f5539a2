//! Integration tests for the `imeon` CLI binary.
//!
//! These tests validate argument parsing, help output, the static
//! registry listings, and error handling — all without requiring a live
//! inverter.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `imeon` binary with env isolation.
///
/// Clears all `IMEON_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn imeon_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("imeon");
    cmd.env("HOME", "/tmp/imeon-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/imeon-cli-test-nonexistent")
        .env_remove("IMEON_CONFIG")
        .env_remove("IMEON_PASSWORD")
        .env_remove("IMEON_DEFAULT_DEVICE");
    cmd
}

/// Write a one-device config file and return its path. The directory
/// handle must outlive the command run.
fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"default_device = "garage"

[devices.garage]
address = "192.0.2.10"
username = "admin"
"#,
    )
    .unwrap();
    path
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = imeon_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    imeon_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Imeon")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("set"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    imeon_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("imeon"));
}

// ── Registry listings ───────────────────────────────────────────────

#[test]
fn test_fields_listing() {
    imeon_cmd().arg("fields").assert().success().stdout(
        predicate::str::contains("battery_soc")
            .and(predicate::str::contains("Grid Voltage L2"))
            .and(predicate::str::contains("numeric")),
    );
}

#[test]
fn test_actions_listing() {
    imeon_cmd().arg("actions").assert().success().stdout(
        predicate::str::contains("inverter_mode")
            .and(predicate::str::contains("mppt"))
            .and(predicate::str::contains("smg")),
    );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = imeon_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_status_unknown_device_exits_not_found() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let output = imeon_cmd()
        .args(["--config", config.to_str().unwrap(), "status", "rooftop"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4), "Expected exit code 4");
    let text = combined_output(&output);
    assert!(
        text.contains("not configured"),
        "Expected unknown-device diagnostic:\n{text}"
    );
}

#[test]
fn test_set_unknown_action_exits_not_found() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let output = imeon_cmd()
        .env("IMEON_PASSWORD", "pw")
        .args([
            "--config",
            config.to_str().unwrap(),
            "set",
            "garage",
            "warp_drive",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4), "Expected exit code 4");
    let text = combined_output(&output);
    assert!(
        text.contains("Unknown action"),
        "Expected unknown-action diagnostic:\n{text}"
    );
}

#[test]
fn test_set_invalid_argument_exits_usage() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    // low below the MPPT floor is rejected before any device contact
    let output = imeon_cmd()
        .env("IMEON_PASSWORD", "pw")
        .args([
            "--config",
            config.to_str().unwrap(),
            "set",
            "garage",
            "mppt",
            "100",
            "700",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Invalid argument"),
        "Expected invalid-argument diagnostic:\n{text}"
    );
}

#[test]
fn test_set_missing_arguments_exits_usage() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let output = imeon_cmd()
        .env("IMEON_PASSWORD", "pw")
        .args([
            "--config",
            config.to_str().unwrap(),
            "set",
            "garage",
            "mppt",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("argument"),
        "Expected argument-count diagnostic:\n{text}"
    );
}

// ── Config surface ──────────────────────────────────────────────────

#[test]
fn test_config_list_without_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    imeon_cmd()
        .args(["--config", config.to_str().unwrap(), "config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No devices configured"));
}

#[test]
fn test_config_list_shows_default_marker() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    imeon_cmd()
        .args(["--config", config.to_str().unwrap(), "config", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("garage")
                .and(predicate::str::contains("192.0.2.10"))
                .and(predicate::str::contains("*")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    imeon_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("add")
                .and(predicate::str::contains("edit"))
                .and(predicate::str::contains("list"))
                .and(predicate::str::contains("remove")),
        );
}
