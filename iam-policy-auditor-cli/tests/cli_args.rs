use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

// Reference document shared across the tests: one service, one action with
// a resource-type pattern, one action that only accepts the * resource.
const SERVICE_AUTH: &str = r#"[
    {
        "servicePrefix": "s3",
        "resourceTypes": [
            {"name": "object", "arnPattern": "arn:aws:s3:us-east-1:123456789012:${Bucket}/${Key}"}
        ],
        "actions": [
            {"name": "GetObject", "resourceTypes": [{"resourceType": "object"}]},
            {"name": "ListAllMyBuckets", "resourceTypes": []}
        ]
    }
]"#;

const VIOLATING_POLICY: &str = r#"{
    "Statement": [
        {"Action": "s3:GetObject", "Resource": ["arn:aws:ec2:us-east-1:123:instance/i-1"]}
    ]
}"#;

const COMPLIANT_POLICY: &str = r#"{
    "Statement": {"Action": "s3:GetObject", "Resource": "arn:aws:s3:us-east-1:123:bucket/key"}
}"#;

fn workspace_with(policy: &str) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    fs::write(dir.path().join("service-auth.json"), SERVICE_AUTH)
        .expect("failed to write reference");
    fs::write(dir.path().join("policy.json"), policy).expect("failed to write policy");
    dir
}

fn auditor(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"));
    cmd.current_dir(dir);
    cmd
}

#[test]
fn test_requires_input_flag() {
    Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_single_mode_with_findings_exits_one() {
    let dir = workspace_with(VIOLATING_POLICY);
    let out = auditor(dir.path())
        .args(["--input", "policy.json", "--single"])
        .output()
        .expect("failed to run auditor");

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Output saved in results.json"),
        "stdout was: {}",
        stdout
    );

    let report = fs::read_to_string(dir.path().join("results.json")).expect("missing report");
    let value: serde_json::Value = serde_json::from_str(&report).expect("report is not JSON");
    // Single mode keys findings by the output base name.
    assert!(value["results"]["errors"][0]
        .as_str()
        .expect("finding should be a string")
        .starts_with("Resource type may not be support for s3:GetObject"));
}

#[test]
fn test_single_mode_compliant_exits_zero() {
    let dir = workspace_with(COMPLIANT_POLICY);
    let out = auditor(dir.path())
        .args(["--input", "policy.json", "--single"])
        .output()
        .expect("failed to run auditor");

    assert_eq!(out.status.code(), Some(0));
    let report = fs::read_to_string(dir.path().join("results.json")).expect("missing report");
    assert_eq!(report, "{}");
}

#[test]
fn test_csv_output_writes_table() {
    let dir = workspace_with(VIOLATING_POLICY);
    let out = auditor(dir.path())
        .args(["-i", "policy.json", "-s", "-c", "-o", "audit"])
        .output()
        .expect("failed to run auditor");

    assert_eq!(out.status.code(), Some(1));
    let report = fs::read_to_string(dir.path().join("audit.csv")).expect("missing csv report");
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "IAM Entity,Error");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("audit,"), "row was: {}", lines[1]);
}

#[test]
fn test_account_export_mode_keys_by_role_arn() {
    let dir = TempDir::new().expect("failed to create temp dir");
    fs::write(dir.path().join("service-auth.json"), SERVICE_AUTH)
        .expect("failed to write reference");
    fs::write(
        dir.path().join("export.json"),
        r#"{
            "RoleDetailList": [
                {
                    "RoleName": "app-role",
                    "Arn": "arn:aws:iam::123456789012:role/app-role",
                    "RolePolicyList": [
                        {"PolicyDocument": {"Statement": [{"Action": "s3:ListAllMyBuckets", "Resource": ["arn:aws:s3:::b"]}]}},
                        {"PolicyDocument": {"Statement": [{"Action": "foo:bar", "Resource": ["arn:aws:foo:::x"]}]}}
                    ]
                }
            ],
            "Policies": []
        }"#,
    )
    .expect("failed to write export");

    let out = auditor(dir.path())
        .args(["--input", "export.json"])
        .output()
        .expect("failed to run auditor");
    assert_eq!(out.status.code(), Some(1));

    let report = fs::read_to_string(dir.path().join("results.json")).expect("missing report");
    let value: serde_json::Value = serde_json::from_str(&report).expect("report is not JSON");
    // Both inline policies report under the one role arn, in order.
    let errors = value["arn:aws:iam::123456789012:role/app-role"]["errors"]
        .as_array()
        .expect("errors should be an array");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], "s3:ListAllMyBuckets requires * resource");
    assert_eq!(errors[1], "foo:bar is not found in aws reference list");
}

#[test]
fn test_malformed_export_is_fatal_and_writes_nothing() {
    let dir = workspace_with(r#"{"NotAStatementKey": true}"#);
    let out = auditor(dir.path())
        .args(["--input", "policy.json"])
        .output()
        .expect("failed to run auditor");

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("structural error"),
        "stderr was: {}",
        stderr
    );
    assert!(
        !dir.path().join("results.json").exists(),
        "no partial output on fatal errors"
    );
}

#[test]
fn test_missing_reference_is_fatal() {
    let dir = TempDir::new().expect("failed to create temp dir");
    fs::write(dir.path().join("policy.json"), COMPLIANT_POLICY).expect("failed to write policy");

    let out = auditor(dir.path())
        .args(["--input", "policy.json", "--single"])
        .output()
        .expect("failed to run auditor");

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("service-auth.json"),
        "stderr was: {}",
        stderr
    );
}
