//! Runs the built binary and checks that stdout carries nothing but JSON.

use std::path::PathBuf;
use std::process::Command;

use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::Value;

#[fixture]
fn path_to_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../tests/data/vcf")
}

fn pgxguard() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pgxguard"))
}

#[rstest]
fn test_analyze_stdout_is_json(path_to_data: PathBuf) {
    let output = pgxguard()
        .arg("analyze")
        .arg("--vcf")
        .arg(path_to_data.join("cyp2d6_pm.vcf"))
        .args(["--drugs", "Codeine,Warfarin", "--explain", "--verbose"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = value["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0]["report"]["classifications"][0]["drug"],
        "Codeine"
    );
    assert_eq!(results[0]["explanations"].as_array().unwrap().len(), 2);

    // log lines go to stderr
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Analyzing 1 file(s) for 2 drug(s)"));
}

#[rstest]
fn test_failed_input_still_prints_json(path_to_data: PathBuf) {
    let output = pgxguard()
        .arg("analyze")
        .arg("--vcf")
        .arg(path_to_data.join("does_not_exist.vcf"))
        .args(["--drugs", "Codeine"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["results"][0]["error"].is_string());
}

#[rstest]
fn test_catalog_stdout_is_json() {
    let output = pgxguard().arg("catalog").output().unwrap();

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["genes"].as_array().unwrap().len(), 6);
    assert_eq!(value["drugs"].as_array().unwrap().len(), 10);
}
