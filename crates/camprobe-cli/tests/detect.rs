use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

const STATUSES: [&str; 3] = ["active", "inactive", "unknown"];

#[test]
fn text_output_reports_one_status() {
    let mut cmd = cargo_bin_cmd!("camprobe");
    cmd.arg("--log-level").arg("error");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("camera : "))
        .stdout(predicate::function(|out: &str| {
            STATUSES
                .iter()
                .any(|status| out.starts_with(&format!("camera : {status}")))
        }));
}

#[test]
fn json_output_uses_report_envelope() {
    let mut cmd = cargo_bin_cmd!("camprobe");
    cmd.arg("--log-level").arg("error").arg("--json");

    let output = cmd.output().expect("camprobe should run");
    assert!(
        output.status.success(),
        "expected success, stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let parsed: Value = serde_json::from_str(&stdout).expect("stdout should be valid json");

    let schema_id = parsed
        .get("schema_id")
        .and_then(Value::as_str)
        .expect("schema_id should be present");
    assert!(
        schema_id.contains("activity-report.schema.json"),
        "unexpected schema_id: {schema_id}"
    );

    let status = parsed
        .get("status")
        .and_then(Value::as_str)
        .expect("status should be present");
    assert!(STATUSES.contains(&status), "unexpected status: {status}");

    assert_eq!(
        parsed.get("platform").and_then(Value::as_str),
        Some(std::env::consts::OS)
    );
    assert!(parsed.get("timestamp").and_then(Value::as_str).is_some());
    assert!(parsed.get("warnings").and_then(Value::as_array).is_some());
}

#[test]
fn exit_status_matches_reported_status() {
    let mut cmd = cargo_bin_cmd!("camprobe");
    cmd.arg("--log-level")
        .arg("error")
        .arg("--json")
        .arg("--exit-status");

    let output = cmd.output().expect("camprobe should run");
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("valid json");

    let expected = match parsed["status"].as_str() {
        Some("active") => 0,
        Some("inactive") => 1,
        Some("unknown") => 2,
        other => panic!("unexpected status: {other:?}"),
    };
    assert_eq!(output.status.code(), Some(expected));
}
