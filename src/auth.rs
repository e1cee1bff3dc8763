//! Demo login gate.
//!
//! A non-production stand-in: credentials are checked locally with minimal
//! rules after a fixed simulated server latency, and the resulting session
//! is a plain JSON marker in the data directory. There is no token, no
//! expiry, and no server validation.

use crate::store::SESSION_FILE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Simulated server latency for the demo login.
const LOGIN_LATENCY: Duration = Duration::from_millis(700);

/// The demo-authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub name: String,
}

/// Validate demo credentials: the email must contain `@` and the password
/// must be at least 4 characters. The session name is the local part of
/// the email.
pub fn validate_credentials(email: &str, password: &str) -> Result<Session> {
    if email.contains('@') && password.chars().count() >= 4 {
        let name = email.split('@').next().unwrap_or_default().to_string();
        Ok(Session {
            email: email.to_string(),
            name,
        })
    } else {
        Err(Error::InvalidCredentials(
            "use an email and a password of length >= 4".to_string(),
        ))
    }
}

/// Authenticate with the demo rules after the simulated latency.
pub fn authenticate(email: &str, password: &str) -> Result<Session> {
    std::thread::sleep(LOGIN_LATENCY);
    validate_credentials(email, password)
}

/// Read the session marker. Absent or corrupt markers read as "not logged
/// in" rather than an error.
pub fn current_session(data_dir: &Path) -> Option<Session> {
    let text = fs::read_to_string(data_dir.join(SESSION_FILE)).ok()?;
    serde_json::from_str(&text).ok()
}

/// Persist the session marker.
pub fn save_session(data_dir: &Path, session: &Session) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(session)?;
    fs::write(data_dir.join(SESSION_FILE), json)?;
    Ok(())
}

/// Remove the session marker. Removing an absent marker is fine.
pub fn clear_session(data_dir: &Path) -> Result<()> {
    match fs::remove_file(data_dir.join(SESSION_FILE)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Fail with `NotAuthenticated` unless a session marker is present.
pub fn require_session(data_dir: &Path) -> Result<Session> {
    current_session(data_dir).ok_or(Error::NotAuthenticated)
}
