//! Integration tests for the demo login gate and session marker.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_login_resolves_name_from_email() {
    let env = TestEnv::new();

    env.bix()
        .args(["login", "a@b.com", "abcd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"email\":\"a@b.com\""))
        .stdout(predicate::str::contains("\"name\":\"a\""));
}

#[test]
fn test_login_rejects_short_password() {
    let env = TestEnv::new();

    env.bix()
        .args(["login", "a@b.com", "ab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn test_login_rejects_email_without_at() {
    let env = TestEnv::new();

    env.bix()
        .args(["login", "not-an-email", "abcd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn test_catalog_commands_are_gated() {
    let env = TestEnv::new();

    for args in [
        vec!["record", "list"],
        vec!["record", "show", "CB-001"],
        vec!["stats"],
        vec!["export", "csv"],
        vec!["system", "reset", "--force"],
    ] {
        env.bix()
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"));
    }
}

#[test]
fn test_whoami_before_and_after_login() {
    let env = TestEnv::new();

    env.bix()
        .args(["-H", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));

    env.bix()
        .args(["login", "maya@example.org", "s3cret"])
        .assert()
        .success();

    env.bix()
        .args(["-H", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as maya (maya@example.org)"));
}

#[test]
fn test_logout_clears_session() {
    let env = TestEnv::logged_in();

    env.bix()
        .args(["logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"was_logged_in\":true"));

    env.bix()
        .args(["record", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));

    // logging out again is not an error
    env.bix()
        .args(["logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"was_logged_in\":false"));
}

#[test]
fn test_corrupt_session_marker_reads_as_logged_out() {
    let env = TestEnv::new();
    std::fs::write(env.data_path().join("session.json"), "{oops").unwrap();

    env.bix()
        .args(["record", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_login_and_whoami_work_without_catalog_access() {
    // the auth surface never touches the catalog slot
    let env = TestEnv::new();

    env.bix()
        .args(["whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"session\":null"));
}
