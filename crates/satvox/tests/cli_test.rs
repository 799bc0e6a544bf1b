//! Integration tests for the `satvox` CLI binary.
//!
//! These tests cover argument parsing, completions, preview output and
//! error exit codes, all without a live broker.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `satvox` binary with env isolation.
fn satvox_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("satvox");
    cmd.env("HOME", "/tmp/satvox-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/satvox-cli-test-nonexistent")
        .env_remove("SATVOX_CONFIG")
        .env_remove("SATVOX_OUTPUT")
        .env_remove("SATVOX_LOG_JSON")
        .env_remove("SATVOX_MQTT_HOST")
        .env_remove("SATVOX_MQTT_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Write `body` to a `sites.yaml` in a fresh temp dir.
fn config_file(body: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.yaml");
    std::fs::write(&path, body).unwrap();
    (dir, path)
}

const MQTT: &str = "
mqtt:
  host: 127.0.0.1
  port: 1
  topic: satellites
publish:
  throttle_ms: 0
  connect_poll_secs: 1
  connect_retries: 1
intents:
  enabled: false
";

fn with_sites(sites: &str) -> String {
    format!("{MQTT}sites:\n{sites}")
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
    let output = satvox_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    satvox_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("publish")
            .and(predicate::str::contains("preview"))
            .and(predicate::str::contains("intents")),
    );
}

#[test]
fn test_version_flag() {
    satvox_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("satvox"));
}

#[test]
fn test_completions_zsh() {
    satvox_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_publish_help_mentions_reset() {
    satvox_cmd()
        .args(["publish", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--reset"));
}

// ── Preview ─────────────────────────────────────────────────────────

#[test]
fn test_preview_json_kitchen_lamp() {
    let (_dir, path) = config_file(&with_sites("  kitchen:\n    lights: [lamp]\n"));

    let output = satvox_cmd()
        .args(["preview", "-o", "json", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 12);
    assert_eq!(entries[0]["site"], "kitchen");
    assert_eq!(entries[0]["text"], "turn on the lamp");
    assert_eq!(entries[0]["phonetic"], "TkN nN jc LaMP");
    assert_eq!(entries[11]["text"], "deactivate lamp");
}

#[test]
fn test_preview_plain_filters_site() {
    let (_dir, path) = config_file(&with_sites(
        "  kitchen:\n    lights: [lamp]\n  porch:\n    lights: [spot]\n",
    ));

    let output = satvox_cmd()
        .args(["preview", "-o", "plain", "--site", "porch", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 12);
    assert!(stdout.lines().all(|l| l.starts_with("porch\t")));
}

#[test]
fn test_preview_unknown_site_is_usage_error() {
    let (_dir, path) = config_file(&with_sites("  kitchen:\n    lights: [lamp]\n"));

    satvox_cmd()
        .args(["preview", "--site", "attic", "--config"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("attic"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_missing_config_exit_code() {
    satvox_cmd()
        .args(["preview", "--config", "/tmp/satvox-cli-test-nonexistent/sites.yaml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_invalid_config_exit_code() {
    let (_dir, path) = config_file("mqtt:\n  host: broker.local\nsites: {}\n");

    satvox_cmd()
        .args(["preview", "--config"])
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("mqtt.topic"));
}

#[test]
fn test_oversized_site_fails_validation() {
    let lights: Vec<String> = (0..17).map(|i| format!("light {i}")).collect();
    let (_dir, path) = config_file(&with_sites(&format!(
        "  kitchen:\n    lights: [lamp]\n  hall:\n    lights: [{}]\n",
        lights.join(", ")
    )));

    satvox_cmd()
        .args(["publish", "--config"])
        .arg(&path)
        .assert()
        .code(5)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("hall").and(predicate::str::contains("204")));
}

#[test]
fn test_unreachable_broker_times_out() {
    let (_dir, path) = config_file(&with_sites("  kitchen:\n    lights: [lamp]\n"));

    satvox_cmd()
        .args(["publish", "--quiet", "--config"])
        .arg(&path)
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(8)
        .stderr(predicate::str::contains("Broker not connected"));
}

// ── Intents ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_intents_json_from_mock_source() {
    let server = MockServer::start().await;
    for (doc, body) in [
        (
            "homeassistant_HassTurnOff.yaml",
            "intents:\n  HassTurnOff:\n    data:\n      - sentences: [\"<turn> off {name}\"]\n",
        ),
        (
            "homeassistant_HassTurnOn.yaml",
            "intents:\n  HassTurnOn:\n    data:\n      - sentences: [\"<turn> on {name}\"]\n",
        ),
        ("_common.yaml", "expansion_rules:\n  turn: \"(turn|switch)\"\n"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/sentences/en/{doc}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }

    let (_dir, config) = config_file(&format!(
        "mqtt:\n  host: 127.0.0.1\n  topic: satellites\nintents:\n  base_url: {}/sentences/en/\nsites: {{}}\n",
        server.uri()
    ));

    let output = satvox_cmd()
        .args(["intents", "-o", "json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(catalog["intents"]["HassTurnOn"][0], "<turn> on {name}");
    assert_eq!(
        catalog["expansions"]["turn"],
        serde_json::json!(["turn", "switch"])
    );
}

#[tokio::test]
async fn test_intents_fetch_failure_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (_dir, config) = config_file(&format!(
        "mqtt:\n  host: 127.0.0.1\n  topic: satellites\nintents:\n  base_url: {}/\nsites: {{}}\n",
        server.uri()
    ));

    satvox_cmd()
        .args(["intents", "--config"])
        .arg(&config)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("homeassistant_HassTurnOff.yaml"));
}
