//! End-to-end tests for the `testpack` binary.

#![allow(clippy::disallowed_methods)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../testpack/tests/fixtures")
}

fn expected() -> Vec<u8> {
    fs::read(fixtures().join("expected.txt")).unwrap()
}

fn testpack(cwd: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("testpack").unwrap();
    cmd.current_dir(cwd.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("TESTPACK_PATTERN")
        .env_remove("TESTPACK_OUT");
    cmd
}

#[test]
fn test_bundle_to_stdout() {
    let temp = TempDir::new().unwrap();

    let output = testpack(&temp)
        .arg(fixtures())
        .args(["--pattern", "index.js"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, expected());
}

#[test]
fn test_bundle_to_file() {
    let temp = TempDir::new().unwrap();

    testpack(&temp)
        .arg(fixtures())
        .args(["-p", "index.js", "-o", "bundle.js"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Bundled"));

    assert_eq!(fs::read(temp.path().join("bundle.js")).unwrap(), expected());
}

#[test]
fn test_quiet_suppresses_success_line() {
    let temp = TempDir::new().unwrap();

    testpack(&temp)
        .arg(fixtures())
        .args(["-q", "-p", "index.js", "-o", "bundle.js"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_config_file_is_used() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("testpack.toml"), "pattern = \"index.js\"\n").unwrap();

    let output = testpack(&temp).arg(fixtures()).output().unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, expected());
}

#[test]
fn test_env_overrides_config_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("testpack.toml"), "pattern = \"error.js\"\n").unwrap();

    let output = testpack(&temp)
        .env("TESTPACK_PATTERN", "index.js")
        .arg(fixtures())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, expected());
}

#[test]
fn test_invalid_source_fails() {
    let temp = TempDir::new().unwrap();

    testpack(&temp)
        .arg(fixtures())
        .args(["-p", "error.js"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn test_out_in_missing_directory_fails() {
    let temp = TempDir::new().unwrap();

    testpack(&temp)
        .arg(fixtures())
        .args(["-p", "index.js", "-o", "nonexisting/bundle.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to write bundle"));

    assert!(!temp.path().join("nonexisting").exists());
}

#[test]
fn test_invalid_glob_fails() {
    let temp = TempDir::new().unwrap();

    testpack(&temp)
        .arg(fixtures())
        .args(["-p", "["])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}

#[test]
fn test_missing_config_fails() {
    let temp = TempDir::new().unwrap();

    testpack(&temp)
        .arg(fixtures())
        .args(["-c", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_directory_is_required() {
    let temp = TempDir::new().unwrap();

    testpack(&temp).assert().failure();
}
