//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("invex").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_batch_rejects_empty_glob() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = format!("{}/*.pdf", dir.path().display());

    let mut cmd = Command::cargo_bin("invex").unwrap();
    cmd.args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_process_reports_corrupt_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.pdf");
    std::fs::write(&path, b"not a pdf").unwrap();

    let mut cmd = Command::cargo_bin("invex").unwrap();
    cmd.args(["process", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("processing failed"));
}

#[test]
fn test_config_init_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut cmd = Command::cargo_bin("invex").unwrap();
    cmd.args(["config", "init", "--output", path.to_str().unwrap()])
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("total_keywords"));
}
