//! CLI surface tests.
//!
//! These only exercise argument handling and the config-load error path;
//! nothing here may reach the orchestrator on a developer machine.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn fast_reboot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fast-reboot"))
}

#[test]
fn test_help() {
    fast_reboot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("warm reboot").or(predicate::str::contains("new kernel")))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--keep"));
}

#[test]
fn test_version() {
    fast_reboot()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fast-reboot"));
}

#[test]
fn test_missing_config_file_fails() {
    fast_reboot()
        .args(["--config", "/nonexistent/fast-reboot.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("boot config"));
}

#[test]
fn test_malformed_config_file_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{definitely not json").unwrap();

    fast_reboot()
        .args(["--config", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse"));
}

#[test]
fn test_unknown_flag_rejected() {
    fast_reboot()
        .arg("--frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}
