//! CLI argument definitions for bix.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BioIntelX - explore and curate a microbial-culture catalog.
///
/// Start with `bix login`, then `bix record list` to browse the catalog.
#[derive(Parser, Debug)]
#[command(name = "bix")]
#[command(author, version, about = "A CLI tool for exploring and curating a microbial-culture catalog", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Data directory holding the catalog, session, and preferences.
    /// Can also be set via the BIX_DATA_DIR environment variable.
    #[arg(long = "data-dir", global = true, env = "BIX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record management commands
    Record {
        #[command(subcommand)]
        command: RecordCommands,
    },

    /// Summary statistics over the (optionally filtered) catalog
    Stats {
        /// Free-text search across the standard search fields
        #[arg(short, long)]
        search: Option<String>,

        /// Location filter (parenthetical suffixes ignored, e.g. "Pune"
        /// matches "Pune (MH)")
        #[arg(short, long)]
        location: Option<String>,

        /// Risk-group filter (exact match, e.g. "RG - 1")
        #[arg(short, long)]
        risk_group: Option<String>,

        /// How many groups to keep in top-N breakdowns
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Export the catalog as CSV or JSON
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },

    /// Log in with demo credentials (email containing '@', password of
    /// 4+ characters)
    Login {
        /// Email address
        email: String,

        /// Password
        password: String,
    },

    /// Remove the current session
    Logout,

    /// Show the current session
    Whoami,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// System administration commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

/// Record subcommands
#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    /// Add a new record
    Add {
        /// Explicit record id; omitted ids get a generated NEW_<timestamp>
        #[arg(long)]
        id: Option<String>,

        /// Set a fixed schema field, e.g. --set primarySpecies="Bacillus subtilis"
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Add a custom extension field, e.g. --field "Soil type=Vertisol"
        /// (append :text or :textarea to pick the input kind)
        #[arg(long = "field", value_name = "NAME=VALUE[:TYPE]")]
        field: Vec<String>,
    },

    /// List records, optionally filtered
    List {
        /// Free-text search across the standard search fields
        #[arg(short, long)]
        search: Option<String>,

        /// Location filter (parenthetical suffixes ignored)
        #[arg(short, long)]
        location: Option<String>,

        /// Risk-group filter (exact match)
        #[arg(short, long)]
        risk_group: Option<String>,

        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one record by id
    Show {
        /// Record id (e.g. CB-001)
        id: String,
    },

    /// Update a record (fields merge over the existing values; the id
    /// cannot be changed)
    Update {
        /// Record id
        id: String,

        /// Set a fixed schema field, e.g. --set location="Pune (MH)"
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Add or replace a custom extension field
        #[arg(long = "field", value_name = "NAME=VALUE[:TYPE]")]
        field: Vec<String>,
    },

    /// Delete a record by id
    Delete {
        /// Record id
        id: String,
    },
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export as CSV (full catalog by default)
    Csv {
        /// Export the filtered subset instead of the full catalog
        #[arg(long)]
        filtered: bool,

        /// Free-text search (implies --filtered)
        #[arg(short, long)]
        search: Option<String>,

        /// Location filter (implies --filtered)
        #[arg(short, long)]
        location: Option<String>,

        /// Risk-group filter (implies --filtered)
        #[arg(short, long)]
        risk_group: Option<String>,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the filtered subset as JSON with export metadata
    Json {
        /// Free-text search across the standard search fields
        #[arg(short, long)]
        search: Option<String>,

        /// Location filter (parenthetical suffixes ignored)
        #[arg(short, long)]
        location: Option<String>,

        /// Risk-group filter (exact match)
        #[arg(short, long)]
        risk_group: Option<String>,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. output-format)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration values
    List,
}

/// System subcommands
#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Discard all local edits and restore the bundled dataset
    Reset {
        /// Confirm discarding local edits
        #[arg(long)]
        force: bool,
    },

    /// Show data directory, catalog provenance, and build info
    Info,
}
