//! Integration tests for the CLI interface

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn take_bot(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("take-bot").unwrap();
    cmd.current_dir(dir.path()).env_clear();
    cmd
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    take_bot(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    take_bot(&dir)
        .args(["--config", "does-not-exist.toml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_missing_credentials_are_all_reported() {
    let dir = TempDir::new().unwrap();
    take_bot(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("league.league_id is required"))
        .stderr(predicate::str::contains("forum.client_id is required"))
        .stderr(predicate::str::contains("llm.api_key is required"));
}

#[test]
fn test_invalid_toml_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("take-bot.toml");
    fs::write(&path, "[league\nleague_id = ").unwrap();

    take_bot(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}

#[test]
fn test_env_overrides_fill_in_file_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("take-bot.toml"),
        r#"
[league]
league_id = "not-a-number"
"#,
    )
    .unwrap();

    take_bot(&dir)
        .env("ESPN_LEAGUE_ID", "also-bad")
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be numeric, got 'also-bad'"))
        .stderr(predicate::str::contains("webhook").not());
}

#[test]
fn test_invalid_flag() {
    let dir = TempDir::new().unwrap();
    take_bot(&dir)
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
