//! Command implementations for the bix CLI.
//!
//! Each function opens the store, performs one operation, and returns a
//! result struct implementing [`Output`]. Catalog commands are gated on the
//! demo session marker; `login`, `logout`, `whoami`, `config`, and
//! `system info` are exempt.

use crate::auth::{self, Session};
use crate::config;
use crate::export;
use crate::models::{ExtensionField, FIXED_FIELDS, Record};
use crate::store::{CatalogStore, get_data_dir};
use crate::views::{self, FilterSet};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_of<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Open the store, surfacing recoverable load problems as warnings.
fn open_store(data_dir: &Path) -> Result<CatalogStore> {
    let store = CatalogStore::open_at(data_dir)?;
    if let Some(warning) = store.warning() {
        eprintln!("Warning: {warning}");
    }
    Ok(store)
}

/// Open the store behind the session gate.
fn open_gated(data_dir: &Path) -> Result<CatalogStore> {
    auth::require_session(data_dir)?;
    open_store(data_dir)
}

/// Build a filter set from optional CLI arguments.
pub fn filter_set(
    search: Option<String>,
    location: Option<String>,
    risk_group: Option<String>,
) -> FilterSet {
    FilterSet {
        search: search.unwrap_or_default(),
        location: location.unwrap_or_default(),
        risk_group: risk_group.unwrap_or_default(),
    }
}

/// Parse `--set FIELD=VALUE` pairs into a patch object. Keys must belong to
/// the fixed schema; the id has its own flag and cannot be set here.
fn parse_set_pairs(pairs: &[String]) -> Result<serde_json::Map<String, Value>> {
    let mut map = serde_json::Map::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            Error::InvalidInput(format!("expected FIELD=VALUE, got \"{pair}\""))
        })?;
        if key == "id" {
            return Err(Error::InvalidInput(
                "the record id cannot be set through --set".to_string(),
            ));
        }
        if !FIXED_FIELDS.contains(&key) {
            return Err(Error::InvalidInput(format!(
                "unknown field \"{key}\" (see the fixed schema for valid names)"
            )));
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(map)
}

/// Parse `--field NAME=VALUE[:TYPE]` pairs into extension fields. The kind
/// suffix is only split off when it names a known input kind, so values may
/// contain colons.
fn parse_field_pairs(pairs: &[String]) -> Result<BTreeMap<String, ExtensionField>> {
    const KINDS: &[&str] = &["text", "textarea", "number"];

    let mut fields = BTreeMap::new();
    for pair in pairs {
        let (name, rest) = pair.split_once('=').ok_or_else(|| {
            Error::InvalidInput(format!("expected NAME=VALUE[:TYPE], got \"{pair}\""))
        })?;
        if name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "extension field names must be non-empty".to_string(),
            ));
        }
        let (value, kind) = match rest.rsplit_once(':') {
            Some((value, kind)) if KINDS.contains(&kind) => (value, kind),
            _ => (rest, "text"),
        };
        fields.insert(
            name.to_string(),
            ExtensionField {
                value: value.to_string(),
                kind: kind.to_string(),
            },
        );
    }
    Ok(fields)
}

// === Record commands ===

#[derive(Debug, Serialize)]
pub struct AddResult {
    pub record: Record,
}

impl Output for AddResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Added record {} ({})",
            self.record.id,
            self.record.primary_species.as_deref().unwrap_or("unnamed")
        )
    }
}

/// Add a new record built from `--set` and `--field` pairs.
pub fn record_add(
    data_dir: &Path,
    id: Option<String>,
    set: &[String],
    field: &[String],
) -> Result<AddResult> {
    let mut store = open_gated(data_dir)?;

    let fields = parse_set_pairs(set)?;
    let mut record: Record = serde_json::from_value(Value::Object(fields))?;
    record.id = id.unwrap_or_default();
    record.custom_fields = parse_field_pairs(field)?;

    let record = store.add(record)?;
    Ok(AddResult { record })
}

#[derive(Debug, Serialize)]
pub struct ListResult {
    pub total: usize,
    pub showing: usize,
    pub filters: FilterSet,
    pub records: Vec<Record>,
}

impl Output for ListResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Showing {} of {} records",
            self.showing, self.total
        )];
        for record in &self.records {
            lines.push(format!(
                "  {:<12} {:<30} {:<16} {}",
                record.id,
                record.primary_species.as_deref().unwrap_or("-"),
                record.location.as_deref().unwrap_or("-"),
                record.risk_group.as_deref().unwrap_or("-"),
            ));
        }
        lines.join("\n")
    }
}

/// List records, filtered and optionally truncated.
pub fn record_list(
    data_dir: &Path,
    filters: FilterSet,
    limit: Option<usize>,
) -> Result<ListResult> {
    let store = open_gated(data_dir)?;
    let mut records = views::apply_filters(store.records(), &filters);
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    Ok(ListResult {
        total: store.len(),
        showing: records.len(),
        filters,
        records,
    })
}

#[derive(Debug, Serialize)]
pub struct ShowResult {
    pub record: Record,
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let record = &self.record;
        let mut lines = vec![format!("Record {}", record.id)];
        let rows = [
            ("Species", record.primary_species.as_deref()),
            ("Location", record.location.as_deref()),
            ("Host", record.host.as_deref()),
            ("Risk group", record.risk_group.as_deref()),
            ("Role", record.beneficial_role.as_deref()),
            ("Uses", record.uses.as_deref()),
        ];
        for (label, value) in rows {
            if let Some(value) = value {
                lines.push(format!("  {label}: {value}"));
            }
        }
        for (name, field) in &record.custom_fields {
            lines.push(format!("  {name}: {}", field.value));
        }
        lines.join("\n")
    }
}

/// Show one record by id.
pub fn record_show(data_dir: &Path, id: &str) -> Result<ShowResult> {
    let store = open_gated(data_dir)?;
    let record = store
        .get(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    Ok(ShowResult { record })
}

#[derive(Debug, Serialize)]
pub struct UpdateResult {
    pub record: Record,
}

impl Output for UpdateResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!("Updated record {}", self.record.id)
    }
}

/// Update a record: `--set` pairs merge over the existing fields, `--field`
/// pairs merge into the existing extension map.
pub fn record_update(
    data_dir: &Path,
    id: &str,
    set: &[String],
    field: &[String],
) -> Result<UpdateResult> {
    let mut store = open_gated(data_dir)?;

    let mut patch = parse_set_pairs(set)?;
    if !field.is_empty() {
        let existing = store
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let mut merged = existing.custom_fields.clone();
        merged.extend(parse_field_pairs(field)?);
        patch.insert("customFields".to_string(), serde_json::to_value(&merged)?);
    }
    if patch.is_empty() {
        return Err(Error::InvalidInput(
            "nothing to update: pass --set and/or --field".to_string(),
        ));
    }

    let record = store.update(id, &patch)?;
    Ok(UpdateResult { record })
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub id: String,
    pub removed: usize,
}

impl Output for DeleteResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!("Deleted {} record(s) with id {}", self.removed, self.id)
    }
}

/// Delete every record with the given id.
pub fn record_delete(data_dir: &Path, id: &str) -> Result<DeleteResult> {
    let mut store = open_gated(data_dir)?;
    let removed = store.delete(id)?;
    Ok(DeleteResult {
        id: id.to_string(),
        removed,
    })
}

// === Stats ===

#[derive(Debug, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
}

impl From<(String, usize)> for GroupCount {
    fn from((label, count): (String, usize)) -> Self {
        Self { label, count }
    }
}

#[derive(Debug, Serialize)]
pub struct EnzymeStat {
    pub enzyme: String,
    /// Records with a recorded activity for this enzyme
    pub active: usize,
    /// Mean 0-5 activity score over the subset
    pub mean_score: f64,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResult {
    pub total: usize,
    pub showing: usize,
    pub filters: FilterSet,
    pub unique_species: usize,
    pub with_location: usize,
    pub pgpr: usize,
    pub risk_groups: Vec<GroupCount>,
    pub top_locations: Vec<GroupCount>,
    pub top_species: Vec<GroupCount>,
    pub enzymes: Vec<EnzymeStat>,
    pub monthly_trend: Vec<GroupCount>,
}

impl Output for StatsResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Records: {} of {}", self.showing, self.total),
            format!("Unique species: {}", self.unique_species),
            format!("With location: {}", self.with_location),
            format!("PGPR: {}", self.pgpr),
            "Risk groups:".to_string(),
        ];
        for group in &self.risk_groups {
            lines.push(format!("  {:<20} {}", group.label, group.count));
        }
        lines.push("Top locations:".to_string());
        for group in &self.top_locations {
            lines.push(format!("  {:<20} {}", group.label, group.count));
        }
        lines.push("Enzyme activity:".to_string());
        for stat in &self.enzymes {
            lines.push(format!(
                "  {:<12} {} active, mean score {:.1} ({})",
                stat.enzyme, stat.active, stat.mean_score, stat.label
            ));
        }
        lines.join("\n")
    }
}

/// Compute summary statistics over the filtered subset.
pub fn stats(data_dir: &Path, filters: FilterSet, top: usize) -> Result<StatsResult> {
    let store = open_gated(data_dir)?;
    let subset = views::apply_filters(store.records(), &filters);

    let enzymes = views::enzyme_activity_counts(&subset)
        .into_iter()
        .map(|(enzyme, active)| {
            let mean = if subset.is_empty() {
                0.0
            } else {
                subset
                    .iter()
                    .map(|r| views::activity_score(r.enzyme(enzyme)))
                    .sum::<f64>()
                    / subset.len() as f64
            };
            EnzymeStat {
                enzyme: enzyme.to_string(),
                active,
                mean_score: (mean * 100.0).round() / 100.0,
                label: views::score_label(mean).to_string(),
            }
        })
        .collect();

    Ok(StatsResult {
        total: store.len(),
        showing: subset.len(),
        unique_species: views::distinct_count(&subset, |r| r.primary_species.as_deref()),
        with_location: views::non_empty_count(&subset, |r| r.location.as_deref()),
        pgpr: views::pgpr_count(&subset),
        risk_groups: views::grouped_counts(&subset, |r| r.risk_group.as_deref(), false)
            .into_iter()
            .map(Into::into)
            .collect(),
        top_locations: views::top_n(
            views::grouped_counts(&subset, |r| r.location.as_deref(), true),
            top,
        )
        .into_iter()
        .map(Into::into)
        .collect(),
        top_species: views::top_n(
            views::grouped_counts(&subset, |r| r.primary_species.as_deref(), false),
            top,
        )
        .into_iter()
        .map(Into::into)
        .collect(),
        enzymes,
        monthly_trend: views::monthly_trend(&subset)
            .into_iter()
            .map(Into::into)
            .collect(),
        filters,
    })
}

// === Export ===

#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub format: String,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Export payload when writing to stdout
    #[serde(skip)]
    pub content: Option<String>,
}

impl Output for ExportResult {
    fn to_json(&self) -> String {
        match &self.content {
            Some(content) => content.clone(),
            None => json_of(self),
        }
    }

    fn to_human(&self) -> String {
        match &self.content {
            Some(content) => content.clone(),
            None => format!(
                "Exported {} record(s) as {} to {}",
                self.records,
                self.format,
                self.path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
        }
    }
}

fn finish_export(
    format: &str,
    records: usize,
    content: String,
    output: Option<PathBuf>,
) -> Result<ExportResult> {
    match output {
        Some(path) => {
            std::fs::write(&path, content)?;
            Ok(ExportResult {
                format: format.to_string(),
                records,
                path: Some(path),
                content: None,
            })
        }
        None => Ok(ExportResult {
            format: format.to_string(),
            records,
            path: None,
            content: Some(content),
        }),
    }
}

/// Export as CSV: the full catalog by default, the filtered subset with
/// `--filtered` or any filter flag.
pub fn export_csv(
    data_dir: &Path,
    filtered: bool,
    filters: FilterSet,
    output: Option<PathBuf>,
) -> Result<ExportResult> {
    let store = open_gated(data_dir)?;
    let records = if filtered || !filters.is_empty() {
        views::apply_filters(store.records(), &filters)
    } else {
        store.records().to_vec()
    };
    let csv = export::csv_string(&records)?;
    finish_export("csv", records.len(), csv, output)
}

/// Export the filtered subset as JSON wrapped with export metadata.
pub fn export_json(
    data_dir: &Path,
    filters: FilterSet,
    output: Option<PathBuf>,
) -> Result<ExportResult> {
    let store = open_gated(data_dir)?;
    let subset = views::apply_filters(store.records(), &filters);
    let envelope = export::json_envelope(subset, &filters);
    let json = serde_json::to_string_pretty(&envelope)?;
    finish_export("json", envelope.metadata.records, json, output)
}

// === Auth ===

#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub email: String,
    pub name: String,
}

impl Output for LoginResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!("Logged in as {} ({})", self.name, self.email)
    }
}

/// Authenticate with the demo rules and persist the session marker.
pub fn login(data_dir: &Path, email: &str, password: &str) -> Result<LoginResult> {
    let session = auth::authenticate(email, password)?;
    auth::save_session(data_dir, &session)?;
    Ok(LoginResult {
        email: session.email,
        name: session.name,
    })
}

#[derive(Debug, Serialize)]
pub struct LogoutResult {
    pub was_logged_in: bool,
}

impl Output for LogoutResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.was_logged_in {
            "Logged out".to_string()
        } else {
            "No active session".to_string()
        }
    }
}

/// Remove the session marker.
pub fn logout(data_dir: &Path) -> Result<LogoutResult> {
    let was_logged_in = auth::current_session(data_dir).is_some();
    auth::clear_session(data_dir)?;
    Ok(LogoutResult { was_logged_in })
}

#[derive(Debug, Serialize)]
pub struct WhoamiResult {
    pub session: Option<Session>,
}

impl Output for WhoamiResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        match &self.session {
            Some(session) => format!("Logged in as {} ({})", session.name, session.email),
            None => "Not logged in".to_string(),
        }
    }
}

/// Show the current session, if any.
pub fn whoami(data_dir: &Path) -> Result<WhoamiResult> {
    Ok(WhoamiResult {
        session: auth::current_session(data_dir),
    })
}

// === Config ===

#[derive(Debug, Serialize)]
pub struct ConfigGetResult {
    pub key: String,
    pub value: Option<String>,
}

impl Output for ConfigGetResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        match &self.value {
            Some(value) => format!("{} = {}", self.key, value),
            None => format!("{} is not set", self.key),
        }
    }
}

pub fn config_get(data_dir: &Path, key: &str) -> Result<ConfigGetResult> {
    Ok(ConfigGetResult {
        key: key.to_string(),
        value: config::get(data_dir, key),
    })
}

#[derive(Debug, Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {}", self.key, self.value)
    }
}

pub fn config_set(data_dir: &Path, key: &str, value: &str) -> Result<ConfigSetResult> {
    config::set(data_dir, key, value)?;
    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct ConfigListResult {
    pub entries: BTreeMap<String, String>,
}

impl Output for ConfigListResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No configuration set".to_string();
        }
        self.entries
            .iter()
            .map(|(k, v)| format!("{k} = {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn config_list(data_dir: &Path) -> Result<ConfigListResult> {
    Ok(ConfigListResult {
        entries: config::load(data_dir),
    })
}

// === System ===

#[derive(Debug, Serialize)]
pub struct ResetResult {
    pub records: usize,
}

impl Output for ResetResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!("Catalog restored to the bundled dataset ({} records)", self.records)
    }
}

/// Discard local edits and restore the bundled dataset.
pub fn system_reset(data_dir: &Path, force: bool) -> Result<ResetResult> {
    if !force {
        return Err(Error::InvalidInput(
            "this discards all local edits; pass --force to confirm".to_string(),
        ));
    }
    let mut store = open_gated(data_dir)?;
    let records = store.reset()?;
    Ok(ResetResult { records })
}

#[derive(Debug, Serialize)]
pub struct InfoResult {
    pub data_dir: PathBuf,
    pub records: usize,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub version: String,
    pub build_timestamp: String,
    pub git_commit: String,
}

impl Output for InfoResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Data directory: {}", self.data_dir.display()),
            format!("Records: {} (source: {})", self.records, self.source),
            format!(
                "bix {} ({} built {})",
                self.version, self.git_commit, self.build_timestamp
            ),
        ];
        if let Some(warning) = &self.warning {
            lines.push(format!("Warning: {warning}"));
        }
        lines.join("\n")
    }
}

/// Show the data directory, catalog provenance, and build info.
pub fn system_info(data_dir: &Path) -> Result<InfoResult> {
    let store = CatalogStore::open_at(data_dir)?;
    Ok(InfoResult {
        data_dir: data_dir.to_path_buf(),
        records: store.len(),
        source: store.source().as_str().to_string(),
        warning: store.warning().map(str::to_string),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_timestamp: env!("BIX_BUILD_TIMESTAMP").to_string(),
        git_commit: env!("BIX_GIT_COMMIT").to_string(),
    })
}

/// Resolve the data directory from the CLI flag or the environment.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => get_data_dir(),
    }
}
