//! Integration tests for `wmdr evaluate` and `wmdr metrics`

mod support;

use predicates::prelude::*;
use std::fs;
use support::{evaluate, fixture, stdout_json, wmdr};
use tempfile::tempdir;

const IDENTIFIER: &str = "0-20000-0-06610";

// ============================================================================
// Single record
// ============================================================================

#[test]
fn test_evaluate_json_report() {
    let output = evaluate()
        .args(["--format", "json"])
        .arg(fixture("station.xml"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = stdout_json(&output);
    for key in ["kpi_10", "kpi_20", "kpi_30", "kpi_31", "kpi_33", "kpi_40", "kpi_41", "kpi_60"] {
        assert!(report.get(key).is_some(), "missing {key}");
    }
    assert_eq!(report["kpi_10"]["score"], 1.0);
    assert_eq!(report["kpi_21"]["comments"][0], "not implemented");
    assert_eq!(report["summary"]["identifier"], IDENTIFIER);

    let grade = report["summary"]["grade"].as_str().unwrap();
    assert!(["A", "B", "C", "D", "E", "F"].contains(&grade), "grade {grade}");
}

#[test]
fn test_evaluate_human_output() {
    evaluate()
        .arg(fixture("station.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains(IDENTIFIER))
        .stdout(predicate::str::contains("kpi_20"))
        .stdout(predicate::str::contains("summary:"));
}

#[test]
fn test_evaluate_summary_only() {
    let output = evaluate()
        .args(["--format", "json", "--summary"])
        .arg(fixture("station.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary = stdout_json(&output);
    assert_eq!(summary["identifier"], IDENTIFIER);
    assert!(summary.get("kpi_20").is_none());
}

#[test]
fn test_evaluate_grouped() {
    let output = evaluate()
        .args(["--format", "json", "--group"])
        .arg(fixture("station.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let grouped = stdout_json(&output);
    assert!(grouped["station_characteristics"].get("kpi_20").is_some());
    assert!(grouped["observations_measurements"].get("kpi_31").is_some());
    assert!(grouped["station_contacts"].get("kpi_40").is_some());
    assert!(grouped["station_characteristics"].get("summary").is_some());
    assert_eq!(grouped["summary"]["identifier"], IDENTIFIER);
}

#[test]
fn test_evaluate_skip_schema() {
    let output = evaluate()
        .args(["--format", "json", "--skip-schema"])
        .arg(fixture("station.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert!(report.get("kpi_10").is_none());
    assert_ne!(report["summary"]["grade"], "U");
}

#[test]
fn test_evaluate_invalid_schema_verdict() {
    let dir = tempdir().unwrap();
    let verdict = dir.path().join("verdict.json");
    fs::write(&verdict, r#"{"valid": false, "errors": ["cvc-complex-type.2.4.a"]}"#).unwrap();

    let output = evaluate()
        .args(["--format", "json", "--schema-verdict"])
        .arg(&verdict)
        .arg(fixture("station.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["kpi_10"]["score"], 0.0);
    assert_eq!(report["summary"]["grade"], "U");
}

// ============================================================================
// Rule selection
// ============================================================================

#[test]
fn test_evaluate_single_sub_rule() {
    let output = evaluate()
        .args(["--format", "json", "--rule", "2-0-06"])
        .arg(fixture("station.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    let keys: Vec<&String> = report.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["kpi_2006"]);
}

#[test]
fn test_evaluate_summary_with_single_rule_shows_results() {
    let output = evaluate()
        .args(["--format", "json", "--summary", "--rule", "20"])
        .arg(fixture("station.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert!(!report.is_null());
    assert!(report.get("kpi_20").is_some());
    assert!(report.get("summary").is_none());

    evaluate()
        .args(["--summary", "--rule", "20"])
        .arg(fixture("station.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("kpi_20"));
}

#[test]
fn test_evaluate_unknown_rule() {
    evaluate()
        .args(["--rule", "99"])
        .arg(fixture("station.xml"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown rule"));
}

#[test]
fn test_evaluate_invalid_reference_time() {
    wmdr()
        .arg("--resources")
        .arg(support::resources())
        .args(["evaluate", "--reference-time", "yesterday"])
        .arg(fixture("station.xml"))
        .assert()
        .code(2);
}

// ============================================================================
// Inputs and resources
// ============================================================================

#[test]
fn test_evaluate_missing_resources() {
    let dir = tempdir().unwrap();
    wmdr()
        .arg("--resources")
        .arg(dir.path().join("absent"))
        .arg("evaluate")
        .arg(fixture("station.xml"))
        .assert()
        .code(3);
}

#[test]
fn test_evaluate_missing_input() {
    evaluate()
        .arg("no-such-record.xml")
        .assert()
        .code(3);
}

#[test]
fn test_evaluate_directory_skips_non_wmdr() {
    let dir = tempdir().unwrap();
    fs::copy(fixture("station.xml"), dir.path().join("a.xml")).unwrap();
    fs::copy(fixture("station.xml"), dir.path().join("b.xml")).unwrap();
    fs::write(dir.path().join("c.xml"), "<note><to>nobody</to></note>").unwrap();
    fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

    let output = evaluate()
        .args(["--format", "json"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let by_path = stdout_json(&output);
    let by_path = by_path.as_object().unwrap();
    assert_eq!(by_path.len(), 2);
    assert!(by_path.keys().all(|path| !path.ends_with("c.xml")));
    for report in by_path.values() {
        assert_eq!(report["summary"]["identifier"], IDENTIFIER);
    }
}

#[test]
fn test_evaluate_no_xml_files() {
    let dir = tempdir().unwrap();
    evaluate().arg(dir.path()).assert().code(2);
}

// ============================================================================
// Written reports and batch statistics
// ============================================================================

#[test]
fn test_evaluate_output_dir_and_metrics() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("reports");
    let metrics = dir.path().join("metrics.json");

    evaluate()
        .arg("--output-dir")
        .arg(&out)
        .arg("--metrics")
        .arg(&metrics)
        .arg(fixture("station.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 report(s)"));

    let written = fs::read_to_string(out.join("station.xml_eval.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(report["summary"]["identifier"], IDENTIFIER);

    let stats: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&metrics).unwrap()).unwrap();
    assert_eq!(stats["count"], 1);
    assert_eq!(stats["identifier"][0], IDENTIFIER);
    assert_eq!(stats["kpi"]["kpi_20"]["count"], 1);
    assert!(stats["percentiles"].get("50").is_some());
}

#[test]
fn test_evaluate_output_dir_keeps_same_named_records_apart() {
    let dir = tempdir().unwrap();
    let records = dir.path().join("records");
    fs::create_dir_all(records.join("a")).unwrap();
    fs::create_dir_all(records.join("b")).unwrap();
    fs::copy(fixture("station.xml"), records.join("a").join("x.xml")).unwrap();
    fs::copy(fixture("station.xml"), records.join("b").join("x.xml")).unwrap();
    let out = dir.path().join("reports");

    evaluate()
        .arg("--output-dir")
        .arg(&out)
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 report(s)"));

    assert!(out.join("a_x.xml_eval.json").is_file());
    assert!(out.join("b_x.xml_eval.json").is_file());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
}

#[test]
fn test_metrics_from_written_reports() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("reports");
    let records = dir.path().join("records");
    fs::create_dir_all(&records).unwrap();
    fs::copy(fixture("station.xml"), records.join("one.xml")).unwrap();
    fs::copy(fixture("station.xml"), records.join("two.xml")).unwrap();

    evaluate()
        .arg("--quiet")
        .arg("--output-dir")
        .arg(&out)
        .arg(&records)
        .assert()
        .success();

    let output = wmdr()
        .args(["--format", "json", "metrics"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats = stdout_json(&output);
    assert_eq!(stats["count"], 2);
    assert_eq!(stats["grades"].as_array().unwrap().len(), 2);

    wmdr()
        .arg("metrics")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reports: 2"))
        .stdout(predicate::str::contains("kpi_20"));
}

#[test]
fn test_metrics_ignores_foreign_json() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("list.json"), "[1, 2, 3]").unwrap();

    wmdr().arg("metrics").arg(dir.path()).assert().code(2);
}
