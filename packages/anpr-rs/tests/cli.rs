//! Integration tests for the CLI commands

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const FRAGMENTS: &str = r#"[
  {"polygon": [[0, 0], [20, 0], [20, 10], [0, 10]], "text": "AB-", "confidence": 0.8},
  {"polygon": [[25, 0], [45, 0], [45, 10], [25, 10]], "text": "12", "confidence": 0.5},
  {"polygon": [[46, 4], [48, 4], [48, 6], [46, 6]], "text": ".", "confidence": 0.1}
]"#;

fn fragments_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_version_subcommand_matches_flag() {
    let expected = format!("anpr {}\n", env!("CARGO_PKG_VERSION"));
    for args in [&["version"][..], &["--version"][..]] {
        let output = cargo_bin_cmd!("anpr").args(args).output().unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
    }
}

#[test]
fn test_consolidate_prints_reading() {
    let file = fragments_file(FRAGMENTS);
    let output = cargo_bin_cmd!("anpr")
        .arg("consolidate")
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let reading: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reading["text"], "AB12");
    let confidence = reading["confidence"].as_f64().unwrap();
    assert!((confidence - 0.4).abs() < 1e-6);
    assert_eq!(reading["polygon"], serde_json::json!([[0, 0], [45, 0], [45, 10], [0, 10]]));
}

#[test]
fn test_consolidate_with_box_prints_number_plate() {
    let file = fragments_file(FRAGMENTS);
    let output = cargo_bin_cmd!("anpr")
        .args(["consolidate", "--det-box", "50", "100", "200", "180", "--det-conf", "0.75"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let plate: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plate["det_box"], serde_json::json!([50, 100, 200, 180]));
    assert_eq!(plate["det_conf"], 0.75);
    assert_eq!(plate["rec_text"], "AB12");
    assert_eq!(plate["rec_poly"][0], serde_json::json!([50, 100]));
}

#[test]
fn test_consolidate_without_fragments_prints_null() {
    let file = fragments_file("[]");
    let mut cmd = cargo_bin_cmd!("anpr");
    cmd.arg("consolidate").arg(file.path());

    cmd.assert().success().stdout(predicate::str::starts_with("null"));
}

#[test]
fn test_consolidate_reads_stdin() {
    let mut cmd = cargo_bin_cmd!("anpr");
    cmd.args(["consolidate", "-"]).write_stdin(
        r#"[{"polygon": [[0, 0], [9, 0], [9, 4]], "text": "XY 99", "confidence": 0.9}]"#,
    );

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"XY99\""));
}

#[test]
fn test_consolidate_rejects_malformed_json() {
    let file = fragments_file("{not json");
    let mut cmd = cargo_bin_cmd!("anpr");
    cmd.arg("consolidate").arg(file.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid fragments"));
}

#[test]
fn test_det_box_requires_det_conf() {
    let file = fragments_file(FRAGMENTS);
    let mut cmd = cargo_bin_cmd!("anpr");
    cmd.args(["consolidate", "--det-box", "0", "0", "10", "10"]).arg(file.path());

    cmd.assert().failure();
}

#[test]
fn test_det_conf_outside_unit_range_is_rejected() {
    let file = fragments_file(FRAGMENTS);
    let mut cmd = cargo_bin_cmd!("anpr");
    cmd.args(["consolidate", "--det-box", "0", "0", "10", "10", "--det-conf", "7.5"])
        .arg(file.path());

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--det-conf must be within [0, 1]"));
}

#[test]
fn test_consolidate_with_box_rejects_unrepresentable_offset() {
    let file = fragments_file(
        r#"[{"polygon": [[2147483647, 0], [0, 4]], "text": "AB1", "confidence": 0.9}]"#,
    );
    let mut cmd = cargo_bin_cmd!("anpr");
    cmd.args(["consolidate", "--det-box", "10", "10", "20", "20", "--det-conf", "0.5"])
        .arg(file.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("image coordinate range"));
}

#[test]
fn test_consolidate_handles_extreme_coordinates() {
    let file = fragments_file(
        r#"[
  {"polygon": [[-2147483648, 0], [2147483647, 0], [2147483647, 10], [-2147483648, 10]], "text": "AB", "confidence": 0.5},
  {"polygon": [[0, -2147483648], [5, -2147483648], [5, 2147483647], [0, 2147483647]], "text": "12", "confidence": 0.5}
]"#,
    );
    let output = cargo_bin_cmd!("anpr").arg("consolidate").arg(file.path()).output().unwrap();
    assert!(output.status.success());

    let reading: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reading["text"], "AB12");
    assert_eq!(reading["polygon"][0], serde_json::json!([-2147483648, 0]));
}

#[test]
fn test_config_prints_defaults() {
    let mut cmd = cargo_bin_cmd!("anpr");
    cmd.arg("config");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"max_concurrent_recognitions\": 4"));
}

#[test]
fn test_config_loads_file() {
    let file = fragments_file(r#"{"max_concurrent_recognitions": 8, "recognition_timeout_ms": 500}"#);
    let mut cmd = cargo_bin_cmd!("anpr");
    cmd.arg("config").arg("--config").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"max_concurrent_recognitions\": 8"))
        .stdout(predicate::str::contains("\"recognition_timeout_ms\": 500"));
}
