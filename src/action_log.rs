//! Action logging for bix commands.
//!
//! Every invocation appends one structured entry to `actions.jsonl` in the
//! data directory. Logging is best-effort: a full disk or a read-only
//! directory must never break the command that was being logged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::store::ACTIONS_FILE;

/// Represents a single action log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// ISO 8601 timestamp when the action occurred
    pub timestamp: DateTime<Utc>,

    /// Command name (e.g., "record add", "stats")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,
}

/// Append an action to the log file. Errors are reported to the caller but
/// expected to be ignored.
pub fn log_action(
    data_dir: &Path,
    command: &str,
    args: serde_json::Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) -> std::io::Result<()> {
    let entry = ActionLog {
        timestamp: Utc::now(),
        command: command.to_string(),
        args,
        success,
        error,
        duration_ms,
    };

    std::fs::create_dir_all(data_dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(ACTIONS_FILE))?;
    let json = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_log_action_appends_jsonl() {
        let env = TestEnv::new();
        log_action(
            env.data_path(),
            "record add",
            serde_json::json!({"id": "CB-1"}),
            true,
            None,
            12,
        )
        .unwrap();
        log_action(
            env.data_path(),
            "record delete",
            serde_json::json!({"id": "CB-1"}),
            false,
            Some("Record not found: CB-1".to_string()),
            3,
        )
        .unwrap();

        let text = std::fs::read_to_string(env.data_path().join(ACTIONS_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ActionLog = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.command, "record add");
        assert!(first.success);
        assert!(first.error.is_none());

        let second: ActionLog = serde_json::from_str(lines[1]).unwrap();
        assert!(!second.success);
        assert!(second.error.as_deref().unwrap().contains("CB-1"));
    }
}
