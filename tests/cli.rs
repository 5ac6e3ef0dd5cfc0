use assert_cmd::prelude::*;
use serde_json::Value;
use std::io::Write;
use std::process::Command;

/// Binary isolated from the caller's configuration directory and overrides
fn evalfill(config_home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("evalfill").expect("binary built");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("EVALFILL_BATCH__MAX_ATTEMPTS")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    let assert = evalfill(&home).arg("--help").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for command in ["run", "extract", "check-login", "config"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn config_show_prints_embedded_profile() {
    let home = tempfile::tempdir().unwrap();
    let value = stdout_json(evalfill(&home).args(["--output", "json", "config", "show"]));
    assert_eq!(value["batch"]["max_attempts"].as_u64(), Some(100));
    assert_eq!(value["form"]["comment_text"].as_str(), Some("无"));
    assert!(value["portal"]["home_url"]
        .as_str()
        .unwrap()
        .starts_with("https://"));
}

#[test]
fn user_file_and_environment_override_defaults() {
    let home = tempfile::tempdir().unwrap();
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "batch:\n  max_attempts: 7\nform:\n  comment_text: fine\n").unwrap();

    let value = stdout_json(
        evalfill(&home)
            .args(["--output", "json", "--config"])
            .arg(file.path())
            .args(["config", "show"]),
    );
    assert_eq!(value["batch"]["max_attempts"].as_u64(), Some(7));
    assert_eq!(value["form"]["comment_text"].as_str(), Some("fine"));

    let value = stdout_json(
        evalfill(&home)
            .env("EVALFILL_BATCH__MAX_ATTEMPTS", "9")
            .args(["--output", "json", "--headless", "config", "show"]),
    );
    assert_eq!(value["batch"]["max_attempts"].as_u64(), Some(9));
    assert_eq!(value["browser"]["headless"].as_bool(), Some(true));
}

#[test]
fn config_validate_accepts_embedded_profile() {
    let home = tempfile::tempdir().unwrap();
    let assert = evalfill(&home).args(["config", "validate"]).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Configuration OK"));
}

#[test]
fn shown_yaml_loads_back() {
    let home = tempfile::tempdir().unwrap();
    let assert = evalfill(&home).args(["config", "show"]).assert().success();
    let shown = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(shown.contains("- xpath: "));
    assert!(!shown.contains("!xpath"));
    assert!(!shown.contains("!css"));

    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(shown.as_bytes()).unwrap();
    let assert = evalfill(&home)
        .arg("--config")
        .arg(file.path())
        .args(["config", "validate"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Configuration OK"));
}

#[test]
fn missing_config_file_fails() {
    let home = tempfile::tempdir().unwrap();
    evalfill(&home)
        .args(["--config", "/nonexistent/evalfill.yaml", "config", "show"])
        .assert()
        .failure();
}

#[test]
fn invalid_log_level_fails() {
    let home = tempfile::tempdir().unwrap();
    evalfill(&home)
        .args(["--log-level", "chatty", "config", "show"])
        .assert()
        .failure();
}
