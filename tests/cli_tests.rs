//! Integration tests for the jtbd CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const NOTES: &str = "Interview 1\nWe wait forever for support and it costs too much.\n\nInterview 2\nThe price is way too high every month.\n";

/// Test helper to get the CLI binary
fn jtbd_cmd() -> Command {
    Command::cargo_bin("jtbd").unwrap()
}

#[test]
fn test_cli_help() {
    jtbd_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("cluster"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_cli_version() {
    jtbd_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_extract_from_file_prints_matrix_json() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, NOTES).unwrap();

    let output = jtbd_cmd().arg("extract").arg(&notes).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let matrix = json["matrix"].as_array().unwrap();
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix[0][0], "i1");
    assert!(matrix[1][1]["cost"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_extract_reads_stdin() {
    jtbd_cmd()
        .arg("extract")
        .arg("-")
        .write_stdin(NOTES)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cost\""));
}

#[test]
fn test_cluster_small_matrix_falls_back() {
    jtbd_cmd()
        .arg("cluster")
        .write_stdin(r#"[["a", {"cost": 1}], ["b", {"trust": "high"}]]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"k_selected\": 1"))
        .stdout(predicate::str::contains("Small-N fallback"));
}

#[test]
fn test_cluster_malformed_payload_is_not_fatal() {
    jtbd_cmd()
        .arg("cluster")
        .write_stdin("{not json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"k_selected\": 0"))
        .stdout(predicate::str::contains("Could not read"));
}

#[test]
fn test_cluster_separated_groups_with_reference() {
    let mut rows = Vec::new();
    for i in 0..5 {
        rows.push(serde_json::json!([format!("c{i}"), {"cost": 1.0}]));
    }
    for i in 0..5 {
        rows.push(serde_json::json!([format!("t{i}"), {"trust": 1.0}]));
    }
    let payload = serde_json::json!({ "matrix": rows }).to_string();

    let output = jtbd_cmd()
        .args(["cluster", "--reference", "cost", "--k-max", "3"])
        .write_stdin(payload)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["k_selected"], 2);
    assert_eq!(json["validity"]["alt"].as_array().unwrap().len(), 2);
    let ps: Vec<f64> = json["clusters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["ps_match"].as_f64().unwrap())
        .collect();
    assert!(ps.contains(&1.0));
    assert!(ps.contains(&0.0));
}

#[test]
fn test_run_table_output() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, NOTES).unwrap();

    jtbd_cmd()
        .args(["run", "--format", "table"])
        .arg(&notes)
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction:"))
        .stdout(predicate::str::contains("Clustering:"))
        .stdout(predicate::str::contains("cost"));
}

#[test]
fn test_run_rejects_inverted_k_range() {
    jtbd_cmd()
        .args(["run", "--k-min", "4", "--k-max", "2", "-"])
        .write_stdin(NOTES)
        .assert()
        .failure();
}

#[test]
fn test_missing_input_file_fails() {
    jtbd_cmd()
        .args(["extract", "/definitely/not/here.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read input file"));
}

#[test]
fn test_print_default_config() {
    jtbd_cmd()
        .arg("print-default-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("clustering:"))
        .stdout(predicate::str::contains("gated_themes:"));
}

#[test]
fn test_init_config_then_validate() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("jtbd.yml");

    jtbd_cmd()
        .args(["init-config", "--output"])
        .arg(&config_path)
        .assert()
        .success();
    assert!(config_path.exists());

    // Refuses to overwrite without --force
    jtbd_cmd()
        .args(["init-config", "--output"])
        .arg(&config_path)
        .assert()
        .failure();

    jtbd_cmd()
        .arg("validate-config")
        .arg(&config_path)
        .arg("--details")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_validate_config_rejects_bad_range() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bad.yml");
    fs::write(&config_path, "clustering:\n  k_min: 5\n  k_max: 2\n").unwrap();

    jtbd_cmd()
        .arg("validate-config")
        .arg(&config_path)
        .assert()
        .failure();
}

#[test]
fn test_config_flag_changes_behaviour() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("jtbd.yml");
    fs::write(&config_path, "extraction:\n  max_interviews: 1\n").unwrap();

    let output = jtbd_cmd()
        .args(["extract", "--config"])
        .arg(&config_path)
        .arg("-")
        .write_stdin(NOTES)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["matrix"].as_array().unwrap().len(), 1);
}
