//! BioIntelX - a microbial-culture catalog library.
//!
//! This library provides the core functionality for the `bix` CLI tool:
//! the persistent catalog store, the shared filter/aggregation engine,
//! CSV/JSON export, and the demo login gate.

pub mod action_log;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod models;
pub mod store;
pub mod views;


/// Library-level error type for BioIntelX operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt catalog state: {0}")]
    CorruptState(String),

    #[error("Failed to persist catalog: {0}")]
    Persistence(String),

    #[error("Seed dataset unavailable: {0}")]
    Seed(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Not logged in: run `bix login <email> <password>` first")]
    NotAuthenticated,

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for BioIntelX operations.
pub type Result<T> = std::result::Result<T, Error>;
