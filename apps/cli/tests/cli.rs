//! End-to-end tests for the `tend` binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_init_writes_config_and_reports_id() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    Command::cargo_bin("tend")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "init", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("User account created"));

    let raw = std::fs::read_to_string(&config).unwrap();
    assert!(raw.contains("user_name = \"alice\""));
}

#[test]
fn test_run_todo_list_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "user_id = \"u1\"\nuser_name = \"alice\"\n").unwrap();

    Command::cargo_bin("tend")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "run", "todo", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Todos:"));
}

#[test]
fn test_run_without_config_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("missing.toml");

    Command::cargo_bin("tend")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "run", "todo", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tend init"));
}

#[test]
fn test_session_dispatches_piped_lines() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "user_id = \"u1\"\nuser_name = \"alice\"\n").unwrap();

    Command::cargo_bin("tend")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "session"])
        .write_stdin("todo new\nBuy milk\nn\nn\ntodo list\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Task created"))
        .stdout(predicate::str::contains("Buy milk"));
}
