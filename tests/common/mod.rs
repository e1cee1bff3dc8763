//! Common test utilities for bix integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's real data directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates a temporary data directory and passes it to the
/// binary via `BIX_DATA_DIR` per invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment and log in with demo credentials, so
    /// gated catalog commands work.
    pub fn logged_in() -> Self {
        let env = Self::new();
        env.bix()
            .args(["login", "curator@example.org", "s3cret"])
            .assert()
            .success();
        env
    }

    /// Get a Command for the bix binary with the isolated data directory.
    pub fn bix(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_bix"));
        cmd.env("BIX_DATA_DIR", self.data_dir.path());
        cmd
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Write a custom seed dataset and return its path for `BIX_SEED_FILE`.
    pub fn write_seed(&self, contents: &str) -> std::path::PathBuf {
        let path = self.data_dir.path().join("test_seed.json");
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
