//! Tool preferences, stored as flat string pairs in `config.json`.
//!
//! Recognized key: `output-format` (`json` or `human`), consulted when the
//! `-H` flag is not passed. Unknown keys are stored verbatim so older
//! binaries tolerate newer settings. A corrupt file reads as empty.

use crate::store::CONFIG_FILE;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Preference key controlling the default output format.
pub const OUTPUT_FORMAT_KEY: &str = "output-format";

/// Load all preferences. Absent or corrupt config reads as empty.
pub fn load(data_dir: &Path) -> BTreeMap<String, String> {
    fs::read_to_string(data_dir.join(CONFIG_FILE))
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default()
}

/// Get one preference value.
pub fn get(data_dir: &Path, key: &str) -> Option<String> {
    load(data_dir).get(key).cloned()
}

/// Set one preference value. `output-format` is validated; other keys are
/// stored verbatim.
pub fn set(data_dir: &Path, key: &str, value: &str) -> Result<()> {
    if key == OUTPUT_FORMAT_KEY && value != "json" && value != "human" {
        return Err(Error::InvalidInput(format!(
            "{OUTPUT_FORMAT_KEY} must be \"json\" or \"human\", got \"{value}\""
        )));
    }

    let mut config = load(data_dir);
    config.insert(key.to_string(), value.to_string());

    fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(data_dir.join(CONFIG_FILE), json)?;
    Ok(())
}

/// True when the configured output format is human-readable.
pub fn prefers_human(data_dir: &Path) -> bool {
    get(data_dir, OUTPUT_FORMAT_KEY).as_deref() == Some("human")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_set_and_get_round_trip() {
        let env = TestEnv::new();
        set(env.data_path(), OUTPUT_FORMAT_KEY, "human").unwrap();
        assert_eq!(
            get(env.data_path(), OUTPUT_FORMAT_KEY).as_deref(),
            Some("human")
        );
        assert!(prefers_human(env.data_path()));
    }

    #[test]
    fn test_invalid_output_format_rejected() {
        let env = TestEnv::new();
        let err = set(env.data_path(), OUTPUT_FORMAT_KEY, "yaml").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_keys_stored_verbatim() {
        let env = TestEnv::new();
        set(env.data_path(), "favorite-species", "Bacillus subtilis").unwrap();
        assert_eq!(
            get(env.data_path(), "favorite-species").as_deref(),
            Some("Bacillus subtilis")
        );
    }

    #[test]
    fn test_corrupt_config_reads_empty() {
        let env = TestEnv::new();
        std::fs::write(env.data_path().join(CONFIG_FILE), "{oops").unwrap();
        assert!(load(env.data_path()).is_empty());
        // and setting over it recovers the file
        set(env.data_path(), "k", "v").unwrap();
        assert_eq!(get(env.data_path(), "k").as_deref(), Some("v"));
    }
}
