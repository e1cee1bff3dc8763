//! Integration tests for CSV and JSON export.

mod common;

use common::TestEnv;
use predicates::prelude::*;

// === CSV Tests ===

#[test]
fn test_export_csv_to_stdout() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["export", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\"id\",\"sourceCode\""))
        .stdout(predicate::str::contains("\"CB-001\""))
        .stdout(predicate::str::contains("\"Bacillus subtilis\""));
}

#[test]
fn test_export_csv_quotes_every_field() {
    let env = TestEnv::logged_in();

    let output = env.bix().args(["export", "csv"]).output().unwrap();
    let csv = String::from_utf8(output.stdout).unwrap();
    let header = csv.lines().next().unwrap();
    assert!(header.split(',').all(|f| f.starts_with('"') && f.ends_with('"')));
}

#[test]
fn test_export_csv_to_file() {
    let env = TestEnv::logged_in();
    let out = env.data_path().join("catalog.csv");

    env.bix()
        .args(["export", "csv", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"records\":14"));

    let csv = std::fs::read_to_string(&out).unwrap();
    // header plus one row per record
    assert_eq!(csv.lines().count(), 15);
}

#[test]
fn test_export_csv_filtered_subset() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["export", "csv", "--location", "Pune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"CB-001\""))
        .stdout(predicate::str::contains("\"CB-003\"").not());
}

#[test]
fn test_export_csv_empty_catalog_fails() {
    let env = TestEnv::new();
    let seed = env.write_seed("[]");

    env.bix()
        .env("BIX_SEED_FILE", &seed)
        .args(["login", "curator@example.org", "s3cret"])
        .assert()
        .success();

    env.bix()
        .env("BIX_SEED_FILE", &seed)
        .args(["export", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no records to export"));
}

// === JSON Tests ===

#[test]
fn test_export_json_metadata_reports_inactive_filters_as_none() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["export", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"search\": \"none\""))
        .stdout(predicate::str::contains("\"location\": \"none\""))
        .stdout(predicate::str::contains("\"riskGroup\": \"none\""))
        .stdout(predicate::str::contains("\"records\": 14"));
}

#[test]
fn test_export_json_carries_active_filters_and_subset() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["export", "json", "--search", "bacillus", "--location", "Pune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"search\": \"bacillus\""))
        .stdout(predicate::str::contains("\"location\": \"Pune\""))
        .stdout(predicate::str::contains("\"records\": 1"))
        .stdout(predicate::str::contains("\"id\": \"CB-001\""));
}

#[test]
fn test_export_json_to_file() {
    let env = TestEnv::logged_in();
    let out = env.data_path().join("subset.json");

    env.bix()
        .args(["export", "json", "--risk-group", "RG - 2", "--output"])
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["metadata"]["records"], 4);
    assert_eq!(value["metadata"]["riskGroup"], "RG - 2");
    assert_eq!(value["data"].as_array().unwrap().len(), 4);
    assert!(value["metadata"]["exported"].is_string());
}
