//! Storage layer for the culture catalog.
//!
//! The catalog lives in a single JSON document (`culture_bank.json`) inside
//! the tool's data directory, alongside the session marker, the preferences
//! file, and the action log. `CatalogStore` owns the in-memory collection
//! for the lifetime of a process: it loads (seeding from the bundled dataset
//! on first run), runs the legacy field migration, and persists after every
//! mutation with an atomic temp-file-and-rename write.
//!
//! Mutations roll back the in-memory collection when the write fails, so
//! memory and the durable slot never diverge.

use crate::models::Record;
use crate::{Error, Result};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The durable slot holding the serialized collection.
pub const CATALOG_FILE: &str = "culture_bank.json";
/// The session marker written by `bix login`.
pub const SESSION_FILE: &str = "session.json";
/// Tool preferences.
pub const CONFIG_FILE: &str = "config.json";
/// Append-only audit log of executed commands.
pub const ACTIONS_FILE: &str = "actions.jsonl";

/// Environment variable overriding the data directory (used by tests).
pub const DATA_DIR_ENV: &str = "BIX_DATA_DIR";
/// Environment variable overriding the seed dataset path (used by tests).
pub const SEED_FILE_ENV: &str = "BIX_SEED_FILE";

/// The bundled default dataset, embedded at compile time.
const EMBEDDED_SEED: &str = include_str!("../../data/culture_bank.json");

/// Where the collection adopted at load time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Deserialized from the durable slot.
    Stored,
    /// First run or corrupt slot; seeded from the default dataset.
    Seed,
    /// Seed unavailable too; the collection starts empty.
    Empty,
}

impl LoadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Seed => "seed",
            Self::Empty => "empty",
        }
    }
}

/// Authoritative owner of the record collection.
pub struct CatalogStore {
    /// Data directory holding the durable slot
    root: PathBuf,
    /// Seed override path, if any
    seed_path: Option<PathBuf>,
    /// The in-memory working copy
    records: Vec<Record>,
    /// Provenance of the loaded collection
    source: LoadSource,
    /// Recoverable load problem, surfaced to the user as a warning
    warning: Option<String>,
}

impl CatalogStore {
    /// Open the store against the default data directory, honoring the
    /// `BIX_DATA_DIR` and `BIX_SEED_FILE` environment overrides.
    pub fn open() -> Result<Self> {
        Self::open_at(&get_data_dir()?)
    }

    /// Open the store against an explicit data directory, honoring the
    /// `BIX_SEED_FILE` override.
    pub fn open_at(dir: &Path) -> Result<Self> {
        let seed = std::env::var_os(SEED_FILE_ENV).map(PathBuf::from);
        Self::open_with_options(dir, seed.as_deref())
    }

    /// Open the store against an explicit data directory (DI for tests).
    pub fn open_with_data_dir(dir: &Path) -> Result<Self> {
        Self::open_with_options(dir, None)
    }

    /// Open the store with an explicit data directory and optional seed
    /// override. `None` uses the bundled dataset.
    pub fn open_with_options(dir: &Path, seed_path: Option<&Path>) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let mut store = Self {
            root: dir.to_path_buf(),
            seed_path: seed_path.map(Path::to_path_buf),
            records: Vec::new(),
            source: LoadSource::Empty,
            warning: None,
        };
        store.load();
        Ok(store)
    }

    /// Load the collection: durable slot first, seed dataset as fallback.
    ///
    /// Runs the legacy migration on whatever was adopted and writes the
    /// result back so the persisted form heals itself. All failures here
    /// are recoverable: a corrupt slot falls through to the seed, a missing
    /// seed leaves the collection empty, and either case is recorded as a
    /// warning instead of an error.
    fn load(&mut self) {
        let slot = self.catalog_path();

        if slot.exists() {
            match read_catalog(&slot) {
                Ok(records) => {
                    self.records = records;
                    self.source = LoadSource::Stored;
                }
                Err(e) => {
                    self.warning =
                        Some(format!("{e}; reloading the default dataset"));
                    self.adopt_seed();
                }
            }
        } else {
            self.adopt_seed();
        }

        migrate_collection(&mut self.records);

        // Self-healing write-back; a failure here downgrades to a warning
        // so a read-only data dir still yields a usable session.
        if self.source != LoadSource::Empty {
            if let Err(e) = self.persist() {
                self.push_warning(format!("could not write back catalog: {e}"));
            }
        }
    }

    fn adopt_seed(&mut self) {
        match self.load_seed() {
            Ok(records) => {
                self.records = records;
                self.source = LoadSource::Seed;
            }
            Err(e) => {
                self.push_warning(e.to_string());
                self.records = Vec::new();
                self.source = LoadSource::Empty;
            }
        }
    }

    /// Read the seed dataset: the override file when configured, otherwise
    /// the bundled resource.
    fn load_seed(&self) -> Result<Vec<Record>> {
        let text = match &self.seed_path {
            Some(path) => fs::read_to_string(path)
                .map_err(|e| Error::Seed(format!("{}: {e}", path.display())))?,
            None => EMBEDDED_SEED.to_string(),
        };
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| Error::Seed(format!("malformed seed JSON: {e}")))?;
        parse_records(value).map_err(|e| Error::Seed(e.to_string()))
    }

    /// Path of the durable slot.
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    /// Data directory this store was opened against.
    pub fn data_dir(&self) -> &Path {
        &self.root
    }

    /// Read-only view of the collection.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Provenance of the collection adopted at load time.
    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// Recoverable load problem, if any.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Add a record, assigning a fallback id when the caller omitted one.
    ///
    /// Explicit ids are taken as-is, duplicates included; only generated
    /// ids are guarded against collisions. Returns the stored record.
    pub fn add(&mut self, mut record: Record) -> Result<Record> {
        if record.id.trim().is_empty() {
            record.id = self.fallback_id(Utc::now().timestamp_millis());
        }
        record.sanitize_extensions();

        let previous = self.records.clone();
        self.records.push(record.clone());
        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e);
        }
        Ok(record)
    }

    /// Shallow-merge a patch over every record matching `id`. The id itself
    /// cannot be changed through this path. Returns the first updated
    /// record.
    pub fn update(
        &mut self,
        id: &str,
        patch: &serde_json::Map<String, Value>,
    ) -> Result<Record> {
        let mut updated: Option<Record> = None;
        let mut next = self.records.clone();
        for record in next.iter_mut() {
            if record.id == id {
                *record = record.merge_patch(patch)?;
                if updated.is_none() {
                    updated = Some(record.clone());
                }
            }
        }

        let updated = updated.ok_or_else(|| Error::NotFound(id.to_string()))?;

        let previous = std::mem::replace(&mut self.records, next);
        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e);
        }
        Ok(updated)
    }

    /// Remove every record matching `id`, preserving the order of the rest.
    /// Returns how many records were removed.
    pub fn delete(&mut self, id: &str) -> Result<usize> {
        let before = self.records.len();
        let previous = self.records.clone();
        self.records.retain(|r| r.id != id);
        let removed = before - self.records.len();
        if removed == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e);
        }
        Ok(removed)
    }

    /// Discard all local edits and reload the seed dataset. Returns the
    /// record count after the reset.
    pub fn reset(&mut self) -> Result<usize> {
        let mut records = self.load_seed()?;
        migrate_collection(&mut records);

        let previous = std::mem::replace(&mut self.records, records);
        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e);
        }
        self.source = LoadSource::Seed;
        Ok(self.records.len())
    }

    /// Serialize the whole collection and atomically replace the durable
    /// slot. Failures surface as `Persistence` and leave the previous slot
    /// contents intact.
    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| Error::Persistence(e.to_string()))?;

        let tmp = NamedTempFile::new_in(&self.root)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        fs::write(tmp.path(), json).map_err(|e| Error::Persistence(e.to_string()))?;
        tmp.persist(self.catalog_path())
            .map_err(|e| Error::Persistence(e.to_string()))?;
        Ok(())
    }

    /// Generate a fallback id for a record added without one.
    ///
    /// `NEW_<unix-ms>`, with the smallest free `_<n>` suffix appended when
    /// two records land in the same millisecond.
    fn fallback_id(&self, now_ms: i64) -> String {
        let base = format!("NEW_{now_ms}");
        if self.get(&base).is_none() {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}_{n}");
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    fn push_warning(&mut self, message: String) {
        match &mut self.warning {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(&message);
            }
            None => self.warning = Some(message),
        }
    }
}

/// Read and parse the durable slot.
fn read_catalog(path: &Path) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| Error::CorruptState(e.to_string()))?;
    parse_records(value)
}

/// Parse a collection out of a dataset document. Accepts a bare array or a
/// `{"data": [...]}` wrapper, the two shapes dataset exports come in.
fn parse_records(value: Value) -> Result<Vec<Record>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::CorruptState(
                    "expected an array of records".to_string(),
                ));
            }
        },
        _ => {
            return Err(Error::CorruptState(
                "expected an array of records".to_string(),
            ));
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<Record>(item)
                .map_err(|e| Error::CorruptState(e.to_string()))
        })
        .collect()
}

/// Run the legacy field migration over a collection. Returns true if any
/// record changed.
pub fn migrate_collection(records: &mut [Record]) -> bool {
    let mut changed = false;
    for record in records {
        changed |= record.migrate_legacy();
    }
    changed
}

/// Resolve the data directory: `BIX_DATA_DIR` when set, otherwise the
/// platform data dir.
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("biointelx"))
}
