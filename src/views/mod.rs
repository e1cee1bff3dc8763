//! Derived views over the catalog: filtering and summary aggregates.
//!
//! Every page of the original dashboard re-derived its own filtered subset
//! and counters; this module is the single shared implementation. Nothing
//! here is incremental - callers hand in the full collection and get a
//! fresh derivation back, O(n) per predicate.

use crate::models::{ENZYMES, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group label for records with no value in the grouped field.
pub const UNKNOWN_BUCKET: &str = "Unknown";
/// Group label absorbing everything past a top-N cutoff.
pub const OTHERS_BUCKET: &str = "Others";

/// The current search/location/risk-group constraints. Empty strings mean
/// "no constraint from this stage".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Case-insensitive substring match over the fixed search fields
    #[serde(default)]
    pub search: String,

    /// Location equality after parenthetical-suffix stripping
    #[serde(default)]
    pub location: String,

    /// Raw, case-sensitive risk-group equality
    #[serde(default)]
    pub risk_group: String,
}

impl FilterSet {
    pub fn new(search: &str, location: &str, risk_group: &str) -> Self {
        Self {
            search: search.to_string(),
            location: location.to_string(),
            risk_group: risk_group.to_string(),
        }
    }

    /// True when no stage constrains anything.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.location.is_empty() && self.risk_group.is_empty()
    }

    /// Stage 1: free-text search across the fixed field set.
    pub fn matches_search(&self, record: &Record) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        record
            .search_haystacks()
            .any(|hay| hay.to_lowercase().contains(&needle))
    }

    /// Stage 2: normalized location equality. Records without a location
    /// never match a non-empty filter.
    pub fn matches_location(&self, record: &Record) -> bool {
        if self.location.is_empty() {
            return true;
        }
        match record.location.as_deref() {
            Some(location) => {
                normalize_location(location).to_lowercase() == self.location.to_lowercase()
            }
            None => false,
        }
    }

    /// Stage 3: raw risk-group equality, case-sensitive, no normalization.
    pub fn matches_risk_group(&self, record: &Record) -> bool {
        if self.risk_group.is_empty() {
            return true;
        }
        record.risk_group.as_deref() == Some(self.risk_group.as_str())
    }

    /// All three stages, conjunctive.
    pub fn matches(&self, record: &Record) -> bool {
        self.matches_search(record)
            && self.matches_location(record)
            && self.matches_risk_group(record)
    }
}

/// Strip any parenthesized suffixes from a location value and trim the
/// remainder: `"Pune (MH)"` becomes `"Pune"`.
pub fn normalize_location(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Compute the filtered subset for display.
pub fn apply_filters(records: &[Record], filters: &FilterSet) -> Vec<Record> {
    records
        .iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect()
}

/// Count distinct trimmed values of a field; empty and absent excluded.
pub fn distinct_count<F>(records: &[Record], field: F) -> usize
where
    F: Fn(&Record) -> Option<&str>,
{
    let mut seen = std::collections::BTreeSet::new();
    for record in records {
        if let Some(value) = field(record) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                seen.insert(trimmed.to_string());
            }
        }
    }
    seen.len()
}

/// Count records with a non-empty value in a field.
pub fn non_empty_count<F>(records: &[Record], field: F) -> usize
where
    F: Fn(&Record) -> Option<&str>,
{
    records
        .iter()
        .filter(|r| field(r).is_some_and(|v| !v.trim().is_empty()))
        .count()
}

/// Tally normalized field values into (value, count) pairs, descending by
/// count with ties broken by name. Empty values land in the "Unknown"
/// bucket. `normalize` applies the location parenthetical-stripping rule;
/// plain fields are only trimmed.
pub fn grouped_counts<F>(records: &[Record], field: F, normalize: bool) -> Vec<(String, usize)>
where
    F: Fn(&Record) -> Option<&str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let raw = field(record).unwrap_or("");
        let key = if normalize {
            normalize_location(raw)
        } else {
            raw.trim().to_string()
        };
        let key = if key.is_empty() {
            UNKNOWN_BUCKET.to_string()
        } else {
            key
        };
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

/// Keep the first `n` groups and collapse the tail into an "Others" bucket.
pub fn top_n(groups: Vec<(String, usize)>, n: usize) -> Vec<(String, usize)> {
    if groups.len() <= n {
        return groups;
    }
    let mut top: Vec<(String, usize)> = groups[..n].to_vec();
    let rest: usize = groups[n..].iter().map(|(_, c)| c).sum();
    if rest > 0 {
        top.push((OTHERS_BUCKET.to_string(), rest));
    }
    top
}

/// Tally records by the `YYYY-MM` prefix of their collection date, sorted
/// by month. Records without a date are skipped.
pub fn monthly_trend(records: &[Record]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date_of_collection.as_deref() {
            if let Some(month) = date.get(..7) {
                *counts.entry(month.to_string()).or_insert(0) += 1;
            }
        }
    }
    counts.into_iter().collect()
}

/// Count records whose beneficial role mentions PGPR.
pub fn pgpr_count(records: &[Record]) -> usize {
    records
        .iter()
        .filter(|r| {
            r.beneficial_role
                .as_deref()
                .is_some_and(|role| role.to_lowercase().contains("pgpr"))
        })
        .count()
}

/// Per-enzyme count of records with a recorded activity (non-empty and not
/// the "-" placeholder), in display order.
pub fn enzyme_activity_counts(records: &[Record]) -> Vec<(&'static str, usize)> {
    ENZYMES
        .iter()
        .map(|&enzyme| {
            let count = records
                .iter()
                .filter(|r| {
                    r.enzyme(enzyme)
                        .is_some_and(|v| !v.trim().is_empty() && v.trim() != "-")
                })
                .count();
            (enzyme, count)
        })
        .collect()
}

/// Map a qualitative enzyme-activity value onto the canonical 0-5 score.
///
/// Numeric strings pass through clamped to the scale; anything
/// unrecognized scores 0.
pub fn activity_score(value: Option<&str>) -> f64 {
    let value = match value {
        Some(v) => v.trim(),
        None => return 0.0,
    };
    match value {
        "" | "-" => 0.0,
        "Yes" | "+" => 2.0,
        "Low" => 1.0,
        "Moderate" => 3.0,
        "High" => 5.0,
        "Low-Moderate" => 2.0,
        "Variable" => 3.0,
        other => other.parse::<f64>().map_or(0.0, |n| n.clamp(0.0, 5.0)),
    }
}

/// Label for a 0-5 activity score.
pub fn score_label(score: f64) -> &'static str {
    if score == 0.0 {
        "Not Present"
    } else if score < 1.5 {
        "Low"
    } else if score < 2.5 {
        "Low-Moderate"
    } else if score < 3.5 {
        "Moderate"
    } else if score < 4.5 {
        "Mod-High"
    } else {
        "High"
    }
}
