//! Integration tests for configuration management.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_config_get_unset_key() {
    let env = TestEnv::new();

    env.bix()
        .args(["config", "get", "output-format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"value\":null"));
}

#[test]
fn test_config_set_and_get() {
    let env = TestEnv::new();

    env.bix()
        .args(["config", "set", "output-format", "human"])
        .assert()
        .success();

    env.bix()
        .args(["config", "get", "output-format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"value\":\"human\""));
}

#[test]
fn test_config_rejects_invalid_output_format() {
    let env = TestEnv::new();

    env.bix()
        .args(["config", "set", "output-format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("output-format"));
}

#[test]
fn test_configured_output_format_applies_by_default() {
    let env = TestEnv::new();

    env.bix()
        .args(["config", "set", "output-format", "human"])
        .assert()
        .success();

    // whoami now defaults to the human rendering
    env.bix()
        .args(["whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_config_list() {
    let env = TestEnv::new();

    env.bix()
        .args(["config", "set", "output-format", "json"])
        .assert()
        .success();
    env.bix()
        .args(["config", "set", "favorite-species", "Bacillus subtilis"])
        .assert()
        .success();

    env.bix()
        .args(["-H", "config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output-format = json"))
        .stdout(predicate::str::contains("favorite-species = Bacillus subtilis"));
}
