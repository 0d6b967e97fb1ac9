//! Integration tests for the `frontier` CLI binary.
//!
//! Argument parsing, help output, and completions run without a radio;
//! the device tests point the binary at a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `frontier` binary with env isolation.
///
/// Clears all `FRONTIER_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
/// The PIN comes from the environment so the keyring is never consulted.
fn frontier_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("frontier");
    cmd.env("HOME", "/tmp/frontier-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/frontier-cli-test-nonexistent")
        .env("FRONTIER_PIN", "1234")
        .env_remove("FRONTIER_PROFILE")
        .env_remove("FRONTIER_HOST")
        .env_remove("FRONTIER_PORT")
        .env_remove("FRONTIER_OUTPUT")
        .env_remove("FRONTIER_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn fs_ok(value: &str) -> String {
    format!("<fsapiResponse><status>FS_OK</status><value>{value}</value></fsapiResponse>")
}

async fn mount_get(server: &MockServer, node: &str, value: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/fsapi/GET/{node}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(fs_ok(value)))
        .mount(server)
        .await;
}

async fn mount_radio(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/fsapi/CREATE_SESSION"))
        .and(query_param("pin", "1234"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<fsapiResponse><status>FS_OK</status><sessionId>7</sessionId></fsapiResponse>",
        ))
        .mount(server)
        .await;
    mount_get(server, "netRemote.sys.power", "<u8>1</u8>").await;
    mount_get(server, "netRemote.sys.audio.volume", "<u8>8</u8>").await;
    mount_get(server, "netRemote.sys.caps.volumeSteps", "<u8>32</u8>").await;
    mount_get(server, "netRemote.sys.mode", "<u32>4</u32>").await;
    mount_get(server, "netRemote.play.status", "<u8>2</u8>").await;
    mount_get(server, "netRemote.play.info.name", "<c8_array>Jazz FM</c8_array>").await;
    mount_get(server, "netRemote.sys.info.friendlyName", "<c8_array>Kitchen</c8_array>").await;
}

fn device_args(server: &MockServer) -> Vec<String> {
    let addr = server.address();
    vec![
        "--host".to_owned(),
        addr.ip().to_string(),
        "--port".to_owned(),
        addr.port().to_string(),
        "--timeout".to_owned(),
        "2".to_owned(),
    ]
}

/// Run the binary against `server` off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut argv = device_args(server);
    argv.extend(args.iter().map(|a| (*a).to_owned()));
    tokio::task::spawn_blocking(move || frontier_cmd().args(argv).output().unwrap())
        .await
        .unwrap()
}

/// Like [`run_against`] without the device flags, with config files under
/// `config_home`.
async fn run_with_config(config_home: &Path, argv: Vec<String>) -> std::process::Output {
    let home = config_home.to_owned();
    tokio::task::spawn_blocking(move || {
        frontier_cmd()
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", &home)
            .args(argv)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn config_file(config_home: &Path) -> PathBuf {
    config_home.join("frontier").join("config.toml")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = frontier_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    frontier_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Frontier Silicon")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("volume"))
            .and(predicate::str::contains("preset")),
    );
}

#[test]
fn test_version_flag() {
    frontier_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("frontier"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    frontier_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_invalid_shell() {
    frontier_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .code(2);
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_volume_requires_target() {
    frontier_cmd().arg("volume").assert().failure().code(2);
}

#[test]
fn test_volume_rejects_words() {
    frontier_cmd()
        .args(["volume", "loud"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("'up' or 'down'"));
}

#[test]
fn test_volume_percent_out_of_range() {
    frontier_cmd()
        .args(["volume", "--percent", "150"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_power_requires_state() {
    frontier_cmd()
        .args(["power", "sideways"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_invalid_output_format() {
    frontier_cmd()
        .args(["--output", "xml", "status"])
        .assert()
        .failure()
        .code(2);
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_status_without_radio_configured() {
    let output = frontier_cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No radio configured"), "{text}");
}

#[test]
fn test_unknown_profile() {
    let output = frontier_cmd()
        .args(["--profile", "attic", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("attic"));
}

#[test]
fn test_config_show_defaults() {
    frontier_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[defaults]").and(predicate::str::contains("timeout = 5")),
        );
}

// ── Against a radio ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = MockServer::start().await;
    mount_radio(&server).await;

    let output = run_against(&server, &["--output", "json-compact", "status"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["available"], true);
    assert_eq!(json["power"], true);
    assert_eq!(json["volume"], 8);
    assert_eq!(json["station_name"], "Jazz FM");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_info_table() {
    let server = MockServer::start().await;
    mount_radio(&server).await;

    let output = run_against(&server, &["info"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Kitchen"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_volume_percent_sets_step() {
    let server = MockServer::start().await;
    mount_radio(&server).await;
    Mock::given(method("GET"))
        .and(path("/fsapi/SET/netRemote.sys.audio.volume"))
        .and(query_param("value", "16"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<fsapiResponse><status>FS_OK</status></fsapiResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["volume", "--percent", "50"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_write_exit_code() {
    let server = MockServer::start().await;
    mount_radio(&server).await;
    Mock::given(method("GET"))
        .and(path("/fsapi/SET/netRemote.sys.audio.mute"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<fsapiResponse><status>FS_NODE_BLOCKED</status></fsapiResponse>",
        ))
        .mount(&server)
        .await;

    let output = run_against(&server, &["mute"]).await;
    assert_eq!(output.status.code(), Some(5), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_output_default_comes_from_config() {
    let server = MockServer::start().await;
    mount_radio(&server).await;
    let home = tempfile::tempdir().unwrap();
    let addr = server.address();
    std::fs::create_dir_all(home.path().join("frontier")).unwrap();
    std::fs::write(
        config_file(home.path()),
        format!(
            "default_profile = \"kitchen\"\n\n[defaults]\noutput = \"json-compact\"\n\n\
             [profiles.kitchen]\nhost = \"{}\"\nport = {}\n",
            addr.ip(),
            addr.port()
        ),
    )
    .unwrap();

    let output = run_with_config(home.path(), vec!["status".to_owned()]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["station_name"], "Jazz FM");
}

// ── Setup ───────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_config_init_checks_radio_before_saving() {
    let server = MockServer::start().await;
    mount_radio(&server).await;
    let home = tempfile::tempdir().unwrap();

    let mut argv = device_args(&server);
    argv.extend(["config", "init", "--name", "kitchen"].map(str::to_owned));
    let output = run_with_config(home.path(), argv).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Found Kitchen"));

    let saved = std::fs::read_to_string(config_file(home.path())).unwrap();
    assert!(saved.contains("default_profile = \"kitchen\""), "{saved}");
    assert!(saved.contains(&format!("port = {}", server.address().port())), "{saved}");
    // The factory PIN is never written out.
    assert!(!saved.contains("pin"), "{saved}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_init_refused_session_saves_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fsapi/CREATE_SESSION"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let mut argv = device_args(&server);
    argv.extend(["--pin", "9999", "config", "init", "--plaintext-pin"].map(str::to_owned));
    let output = run_with_config(home.path(), argv).await;
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("not answering"));
    assert!(!config_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_init_no_verify_skips_radio() {
    let home = tempfile::tempdir().unwrap();
    let argv = ["--host", "radio.invalid", "config", "init", "--no-verify"].map(str::to_owned);

    let output = run_with_config(home.path(), argv.to_vec()).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let saved = std::fs::read_to_string(config_file(home.path())).unwrap();
    assert!(saved.contains("[profiles.default]"), "{saved}");
    assert!(saved.contains("host = \"radio.invalid\""), "{saved}");
}
