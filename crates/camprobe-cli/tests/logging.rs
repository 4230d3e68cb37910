use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_log_format_text() {
    let mut cmd = cargo_bin_cmd!("camprobe");
    cmd.arg("--log-format")
        .arg("text")
        .arg("--log-level")
        .arg("info");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("INFO"))
        .stderr(predicate::str::contains("Initialization complete"))
        .stderr(predicate::str::contains("Detection finished"));
}

#[test]
fn test_log_format_json() {
    let mut cmd = cargo_bin_cmd!("camprobe");
    cmd.arg("--log-format")
        .arg("json")
        .arg("--log-level")
        .arg("info");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    // Every stderr line is a JSON log record
    let stderr = String::from_utf8(output.stderr).unwrap();
    let log_lines: Vec<Value> = stderr
        .lines()
        .map(|line| serde_json::from_str(line).expect("stderr line should be valid JSON"))
        .collect();

    let messages: Vec<&str> = log_lines
        .iter()
        .filter(|line| line["level"].as_str() == Some("INFO"))
        .filter_map(|line| line["fields"]["message"].as_str())
        .collect();

    assert_eq!(
        messages,
        vec![
            "Initialization complete. Starting detection.",
            "Detection finished."
        ]
    );
}

#[test]
fn test_log_level_error_is_quiet() {
    let mut cmd = cargo_bin_cmd!("camprobe");
    cmd.arg("--log-level").arg("error");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Initialization complete").not());
}

#[test]
fn test_log_level_from_env() {
    let mut cmd = cargo_bin_cmd!("camprobe");
    cmd.env("CAMPROBE_LOG_LEVEL", "error");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("INFO").not());
}
