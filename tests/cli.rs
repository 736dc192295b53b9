//! End-to-end CLI coverage (mirrors the teacher's `tests/main_tests.rs`):
//! drives the `flowguard` binary itself via `assert_cmd`, not the library.

use assert_cmd::Command;
use predicates::str::contains;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_yaml(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{contents}").expect("write yaml");
    file
}

#[test]
fn run_succeeds_on_a_terminal_root() {
    let yaml = r#"
workflows:
  w:
    root: SUCCESS
    edges: []
"#;
    let file = write_yaml(yaml);

    Command::cargo_bin("flowguard")
        .unwrap()
        .arg("run")
        .arg(file.path())
        .arg("w")
        .assert()
        .success()
        .stdout(contains("SUCCESS"));
}

#[test]
fn run_reports_cycle_error_at_construction() {
    let yaml = r#"
steps:
  a:
    type: Noop
  b:
    type: Noop
workflows:
  w:
    root: a
    edges:
      - from: a
        to: b
      - from: b
        to: a
"#;
    let file = write_yaml(yaml);

    Command::cargo_bin("flowguard")
        .unwrap()
        .arg("run")
        .arg(file.path())
        .arg("w")
        .assert()
        .failure()
        .stderr(contains("error:"))
        .stderr(contains("Circular dependency"));
}

#[test]
fn run_reports_missing_file() {
    Command::cargo_bin("flowguard")
        .unwrap()
        .arg("run")
        .arg("config/does_not_exist.yaml")
        .arg("w")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn analyze_prints_deterministic_report() {
    let yaml = r#"
steps:
  a:
    type: Noop
  b:
    type: Noop
workflows:
  w:
    root: a
    edges:
      - from: a
        to: b
      - from: b
        to: SUCCESS
"#;
    let file = write_yaml(yaml);

    Command::cargo_bin("flowguard")
        .unwrap()
        .arg("analyze")
        .arg(file.path())
        .arg("w")
        .assert()
        .success()
        .stdout(contains("workflow: w"))
        .stdout(contains("a -> b"))
        .stdout(contains("b -> SUCCESS"));
}

#[test]
fn analyze_reports_unknown_workflow() {
    let yaml = r#"
workflows:
  w:
    root: SUCCESS
    edges: []
"#;
    let file = write_yaml(yaml);

    Command::cargo_bin("flowguard")
        .unwrap()
        .arg("analyze")
        .arg(file.path())
        .arg("does-not-exist")
        .assert()
        .failure()
        .stderr(contains("error:"));
}
