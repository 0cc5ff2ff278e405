//! Drives the built `auditctl` binary end to end.

use serde_json::Value;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn auditctl(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_auditctl"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn responses(output: &Output) -> Vec<Value> {
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn single_request_from_stdin() {
    let output = auditctl(
        &["run"],
        r#"{"task":"calculate_materiality","parameters":{"financialData":{"profitBeforeTax":1000000}}}"#,
    );
    assert!(output.status.success());
    let responses = responses(&output);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["data"]["overallMateriality"], "50000");
}

#[test]
fn batch_keeps_one_response_per_line() {
    let input = concat!(
        r#"{"task":"identify_significant_risks","context":{"groupAudit":true}}"#,
        "\n",
        "not json\n",
        r#"{"task":"outlier_detection","parameters":{"figures":[10,12,11,13,9,1000]}}"#,
        "\n",
    );
    let output = auditctl(&["run", "--batch"], input);
    assert_eq!(output.status.code(), Some(2));

    let responses = responses(&output);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["success"], true);
    assert_eq!(responses[1]["success"], false);
    assert_eq!(responses[2]["data"]["outliers"][0]["value"], 1000.0);
}

#[test]
fn tasks_lists_every_task() {
    let output = auditctl(&["tasks"], "");
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(output.status.success());
    assert_eq!(text.lines().count(), 12);
    assert!(text.contains("evaluate_sample_results"));
}

#[test]
fn environment_overrides_ruleset() {
    let output = Command::new(env!("CARGO_BIN_EXE_auditctl"))
        .arg("ruleset")
        .env("AUDIT_RULESET__SAMPLING__MINIMUM_SAMPLE_SIZE", "30")
        .output()
        .unwrap();
    assert!(output.status.success());
    let ruleset: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ruleset["sampling"]["minimum_sample_size"], 30);
}
