//! End-to-end CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
}

fn scorer_command() -> String {
    format!("sh {}", testdata("score.sh").display())
}

fn courtside_with(out: &Path, data: &Path, scorer: &str) -> Command {
    let mut cmd = Command::cargo_bin("courtside").expect("binary not found");
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--data")
        .arg(data)
        .arg("--output-dir")
        .arg(out)
        .arg("--scorer")
        .arg(scorer);
    cmd
}

fn courtside(out: &Path) -> Command {
    courtside_with(out, &testdata("shots.json"), &scorer_command())
}

const SVM_SEARCH: &str = r#"{"command": "ml", "model": "svm", "params": ["C"], "param_range": [[1, 5, 9]]}"#;

#[test]
fn help_flag() {
    Command::cargo_bin("courtside")
        .expect("binary not found")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MODE"))
        .stdout(predicate::str::contains("--queue-capacity"));
}

#[test]
fn version_flag() {
    Command::cargo_bin("courtside")
        .expect("binary not found")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("courtside"));
}

#[test]
fn malformed_mode_is_usage_error() {
    for bad in ["p=0", "foo", "p="] {
        Command::cargo_bin("courtside")
            .expect("binary not found")
            .arg(bad)
            .write_stdin("")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid value"));
    }
}

#[test]
fn two_positional_arguments_are_rejected() {
    Command::cargo_bin("courtside")
        .expect("binary not found")
        .args(["p=2", "p=4"])
        .write_stdin("")
        .assert()
        .code(2);
}

#[test]
fn empty_input_succeeds() {
    let out = tempfile::tempdir().unwrap();
    courtside(out.path())
        .arg("-q")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn sequential_search_reports_best_candidate() {
    let out = tempfile::tempdir().unwrap();
    courtside(out.path())
        .arg("-q")
        .write_stdin(format!("{SVM_SEARCH}\n"))
        .assert()
        .success()
        .stdout("Model: svm\nC : 5\nAccuracy: 0.9\n\n");
}

#[test]
fn parallel_search_matches_sequential() {
    let out = tempfile::tempdir().unwrap();
    courtside(out.path())
        .args(["p=4", "-q"])
        .write_stdin(format!("{SVM_SEARCH}\n"))
        .assert()
        .success()
        .stdout("Model: svm\nC : 5\nAccuracy: 0.9\n\n");
}

#[test]
fn parallel_batch_reports_every_search() {
    let out = tempfile::tempdir().unwrap();
    let input: String = (0..6).map(|_| format!("{SVM_SEARCH}\n")).collect();
    let assert = courtside(out.path())
        .args(["p=3", "-q"])
        .write_stdin(input)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.matches("Model: svm\nC : 5\nAccuracy: 0.9\n\n").count(), 6);
}

#[test]
fn render_writes_chart() {
    let out = tempfile::tempdir().unwrap();
    courtside(out.path())
        .write_stdin("{\"command\": \"visualize\", \"specs\": [\"Period: 2\"]}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Period: 2.png"))
        .stdout(predicate::str::contains("1 made, 2 missed"));

    let chart = std::fs::read(out.path().join("Period: 2.png")).unwrap();
    assert_eq!(&chart[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn render_without_specs_uses_default_name() {
    let out = tempfile::tempdir().unwrap();
    courtside(out.path())
        .arg("p=2")
        .write_stdin("{\"command\": \"visualize\"}\n")
        .assert()
        .success();
    assert!(out.path().join("All_Shots.png").is_file());
}

#[test]
fn output_directory_is_created() {
    let out = tempfile::tempdir().unwrap();
    let nested = out.path().join("charts").join("today");
    courtside(&nested).arg("-q").write_stdin("").assert().success();
    assert!(nested.is_dir());
}

#[test]
fn unknown_command_fails_the_batch_but_not_the_run() {
    let out = tempfile::tempdir().unwrap();
    courtside(out.path())
        .arg("-q")
        .write_stdin(format!("{{\"command\": \"plot\"}}\n{SVM_SEARCH}\n"))
        .assert()
        .code(5)
        .stdout(predicate::str::contains("Model: svm"))
        .stderr(predicate::str::contains("job 1:"));
}

#[test]
fn malformed_line_is_reported() {
    let out = tempfile::tempdir().unwrap();
    courtside(out.path())
        .arg("-q")
        .write_stdin("{\"command\": \n")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("job 1:"));
}

#[test]
fn queue_overflow_rejects_extra_lines() {
    let out = tempfile::tempdir().unwrap();
    let input: String = (0..3).map(|_| format!("{SVM_SEARCH}\n")).collect();
    let assert = courtside(out.path())
        .args(["-q", "--queue-capacity", "2"])
        .write_stdin(input)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("job 3:"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.matches("Model: svm").count(), 2);
}

#[test]
fn summary_goes_to_stderr() {
    let out = tempfile::tempdir().unwrap();
    courtside(out.path())
        .write_stdin(format!("{SVM_SEARCH}\n"))
        .assert()
        .success()
        .stderr(predicate::str::contains("1 jobs"));
}

#[test]
fn empty_scorer_command_is_config_error() {
    let out = tempfile::tempdir().unwrap();
    courtside_with(out.path(), &testdata("shots.json"), "  ")
        .write_stdin("")
        .assert()
        .code(4);
}

#[test]
fn malformed_data_set_is_config_error() {
    let out = tempfile::tempdir().unwrap();
    let data = out.path().join("broken.json");
    std::fs::write(&data, "[{").unwrap();
    courtside_with(out.path(), &data, &scorer_command())
        .write_stdin("")
        .assert()
        .code(4);
}

#[test]
fn completion_bash() {
    Command::cargo_bin("courtside")
        .expect("binary not found")
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("courtside"));
}
