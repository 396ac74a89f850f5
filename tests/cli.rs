//! CLI behavior tests: exit codes, output formats, init.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn report_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_looper-report"))
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Two samples: frog_1 completed, frog_2 failed
fn fake_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "looper-report.json",
        r#"{"name": "frogs", "samples": ["frog_1", "frog_2"], "subprojects": {"small": {"samples": ["frog_1"]}}}"#,
    );
    write(root, "results_pipeline/frog_1/pipe_completed.flag", "");
    write(
        root,
        "results_pipeline/frog_1/pipe_log.md",
        "> `Time`\t0:05:32\t_RES_\n* Peak memory used: 1.3 GB\n",
    );
    write(root, "results_pipeline/frog_2/pipe_failed.flag", "");
    write(
        root,
        "frogs_stats_summary.tsv",
        "sample_name\tTime\nfrog_1\t0:05:32\nfrog_2\t\n",
    );
    dir
}

#[test]
fn report_prints_index_path() {
    let dir = fake_project();
    report_cmd()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::ends_with("frogs_summary.html\n"));
    assert!(dir.path().join("frogs_summary.html").is_file());
    assert!(dir.path().join("reports/status.html").is_file());
    assert!(dir.path().join("reports/frog_1.html").is_file());
}

#[test]
fn report_subcommand_matches_default() {
    let dir = fake_project();
    report_cmd().arg("report").arg(dir.path()).assert().success();
    assert!(dir.path().join("reports/samples.html").is_file());
}

#[test]
fn subproject_gets_its_own_reports_folder() {
    let dir = fake_project();
    report_cmd()
        .arg(dir.path())
        .arg("--subproject")
        .arg("small")
        .assert()
        .success()
        .stdout(predicate::str::contains("frogs_small_summary.html"));
    assert!(dir.path().join("reports_small/frog_1.html").is_file());
    assert!(!dir.path().join("reports_small/frog_2.html").exists());
}

#[test]
fn missing_project_folder_exit_2() {
    let dir = TempDir::new().unwrap();
    report_cmd()
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Project folder not found"));
}

#[test]
fn invalid_config_exit_2() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "looper-report.json", "{ not json");
    report_cmd()
        .arg(dir.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn check_with_failed_sample_exit_1() {
    let dir = fake_project();
    report_cmd()
        .arg("check")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("frog_2"))
        .stdout(predicate::str::contains("Failed: 1"));
}

#[test]
fn check_all_completed_exit_0() {
    let dir = fake_project();
    report_cmd()
        .arg("check")
        .arg(dir.path())
        .arg("--subproject")
        .arg("small")
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: 1"));
}

#[test]
fn check_json_output_valid() {
    let dir = fake_project();
    let output = report_cmd()
        .arg("check")
        .arg(dir.path())
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let s = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(s.trim()).expect("valid JSON");
    assert_eq!(value["project"], "frogs");
    assert_eq!(value["summary"]["total"], 2);
    assert_eq!(value["samples"][1]["status"], "Failed");
}

#[test]
fn check_custom_flag_only() {
    let dir = fake_project();
    let output = report_cmd()
        .arg("check")
        .arg(dir.path())
        .arg("--flag")
        .arg("completed")
        .arg("--json")
        .output()
        .unwrap();
    let value: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(value["samples"][0]["status"], "Completed");
    assert_eq!(value["samples"][1]["status"], "Missing");
}

#[test]
fn check_reports_unrecognized_flag_as_unknown() {
    let dir = fake_project();
    fs::remove_file(dir.path().join("results_pipeline/frog_2/pipe_failed.flag")).unwrap();
    write(dir.path(), "results_pipeline/frog_2/pipe_waiting.flag", "");
    let output = report_cmd()
        .arg("check")
        .arg(dir.path())
        .arg("--json")
        .output()
        .unwrap();
    let value: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(value["samples"][0]["status"], "Completed");
    assert_eq!(value["samples"][1]["status"], "Unknown");
    assert_eq!(value["samples"][1]["flags"][0], "waiting");
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("looper-report.json");
    report_cmd()
        .arg("init")
        .arg("--name")
        .arg("toads")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success();
    assert!(config_path.exists(), "looper-report.json should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("\"toads\""));
    assert!(content.contains("results_pipeline"));
}

#[test]
fn init_keeps_existing_config() {
    let dir = fake_project();
    report_cmd()
        .arg("init")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
    let content = fs::read_to_string(dir.path().join("looper-report.json")).unwrap();
    assert!(content.contains("frogs"));
}
