//! Integration tests for record CRUD operations via the CLI.
//!
//! These tests verify that record commands work correctly through the CLI:
//! - `bix record add/list/show/update/delete` all work
//! - JSON and human-readable output formats are correct
//! - ids are generated when omitted and immutable afterwards

mod common;

use common::TestEnv;
use predicates::prelude::*;

// === Add Tests ===

#[test]
fn test_record_add_json() {
    let env = TestEnv::logged_in();

    env.bix()
        .args([
            "record",
            "add",
            "--id",
            "CB-900",
            "--set",
            "primarySpecies=Bacillus velezensis",
            "--set",
            "location=Anand (GJ)",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\":\"CB-900\""))
        .stdout(predicate::str::contains("Bacillus velezensis"));
}

#[test]
fn test_record_add_human() {
    let env = TestEnv::logged_in();

    env.bix()
        .args([
            "-H",
            "record",
            "add",
            "--id",
            "CB-901",
            "--set",
            "primarySpecies=Pseudomonas stutzeri",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added record CB-901"))
        .stdout(predicate::str::contains("Pseudomonas stutzeri"));
}

#[test]
fn test_record_add_generates_id_when_omitted() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "add", "--set", "primarySpecies=Bacillus clausii"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\":\"NEW_"));
}

#[test]
fn test_record_add_rejects_unknown_field() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "add", "--set", "speciez=typo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn test_record_add_with_custom_fields() {
    let env = TestEnv::logged_in();

    env.bix()
        .args([
            "record",
            "add",
            "--id",
            "CB-902",
            "--field",
            "Soil type=Vertisol",
            "--field",
            "Notes=isolated after monsoon:textarea",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"customFields\""))
        .stdout(predicate::str::contains("\"Soil type\""))
        .stdout(predicate::str::contains("\"textarea\""));
}

// === List Tests ===

#[test]
fn test_record_list_shows_seeded_catalog() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\":14"))
        .stdout(predicate::str::contains("CB-001"));
}

#[test]
fn test_record_list_limit() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "list", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"showing\":3"))
        .stdout(predicate::str::contains("\"total\":14"));
}

#[test]
fn test_record_list_human() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["-H", "record", "list", "--search", "Trichoderma"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1 of 14 records"))
        .stdout(predicate::str::contains("Trichoderma harzianum"));
}

// === Show Tests ===

#[test]
fn test_record_show_by_id() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "show", "CB-005"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rhizobium leguminosarum"));
}

#[test]
fn test_record_show_missing_id_fails() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "show", "CB-999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Record not found: CB-999"));
}

#[test]
fn test_record_show_surfaces_migrated_bioagents() {
    // CB-003 ships with the deprecated `compatibility` key; the load
    // migration moves it before anything is displayed.
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "show", "CB-003"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bioagents\""))
        .stdout(predicate::str::contains("Pseudomonas consortia"))
        .stdout(predicate::str::contains("compatibility").not());
}

// === Update Tests ===

#[test]
fn test_record_update_merges_fields() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "update", "CB-001", "--set", "location=Satara (MH)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"location\":\"Satara (MH)\""))
        // untouched fields survive the merge
        .stdout(predicate::str::contains("Bacillus subtilis"));
}

#[test]
fn test_record_update_human() {
    let env = TestEnv::logged_in();

    env.bix()
        .args([
            "-H",
            "record",
            "update",
            "CB-002",
            "--set",
            "riskGroup=RG - 2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated record CB-002"));
}

#[test]
fn test_record_update_missing_id_fails() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "update", "CB-999", "--set", "location=Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Record not found: CB-999"));
}

#[test]
fn test_record_update_without_changes_fails() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "update", "CB-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to update"));
}

#[test]
fn test_record_update_merges_custom_fields() {
    let env = TestEnv::logged_in();

    // CB-013 ships with two custom fields; adding a third keeps them
    env.bix()
        .args(["record", "update", "CB-013", "--field", "Altitude=650m"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Altitude\""))
        .stdout(predicate::str::contains("\"Soil type\""))
        .stdout(predicate::str::contains("\"Trial plot\""));
}

#[test]
fn test_record_update_persists_across_invocations() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "update", "CB-001", "--set", "host=Barley"])
        .assert()
        .success();

    env.bix()
        .args(["record", "show", "CB-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"host\": \"Barley\""));
}

// === Delete Tests ===

#[test]
fn test_record_delete() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "delete", "CB-004"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"removed\":1"));

    env.bix()
        .args(["record", "show", "CB-004"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Record not found"));
}

#[test]
fn test_record_delete_missing_id_fails() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["record", "delete", "CB-999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Record not found: CB-999"));
}

#[test]
fn test_record_delete_human() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["-H", "record", "delete", "CB-012"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 record(s) with id CB-012"));
}
