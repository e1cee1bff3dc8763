//! Export serializers for the catalog: CSV and JSON with export metadata.

use crate::models::{FIXED_FIELDS, Record};
use crate::views::FilterSet;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Render records as CSV.
///
/// The header is the fixed schema in declaration order followed by the
/// first record's extension-field names; every field is quoted, with
/// embedded quotes doubled. Fields a record does not carry render empty.
pub fn csv_string(records: &[Record]) -> Result<String> {
    let first = records
        .first()
        .ok_or_else(|| Error::InvalidInput("no records to export".to_string()))?;

    let custom_headers: Vec<String> = first.custom_fields.keys().cloned().collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    let mut header: Vec<&str> = FIXED_FIELDS.to_vec();
    header.extend(custom_headers.iter().map(String::as_str));
    writer
        .write_record(&header)
        .map_err(|e| Error::Other(e.to_string()))?;

    for record in records {
        let object = match serde_json::to_value(record)? {
            Value::Object(map) => map,
            _ => unreachable!("records serialize to objects"),
        };
        let mut row: Vec<String> = FIXED_FIELDS
            .iter()
            .map(|&field| object.get(field).map(display_value).unwrap_or_default())
            .collect();
        for key in &custom_headers {
            row.push(
                record
                    .custom_fields
                    .get(key)
                    .map(|f| f.value.clone())
                    .unwrap_or_default(),
            );
        }
        writer
            .write_record(&row)
            .map_err(|e| Error::Other(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
}

/// Coerce a JSON scalar to its CSV cell text. Integral numbers render
/// without a trailing `.0`.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Metadata attached to a JSON export: when it was produced, how many
/// records it holds, and which predicates were active ("none" otherwise).
#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    pub exported: DateTime<Utc>,
    pub records: usize,
    pub search: String,
    pub location: String,
    #[serde(rename = "riskGroup")]
    pub risk_group: String,
}

/// A filtered subset wrapped with its export metadata.
#[derive(Debug, Serialize)]
pub struct ExportEnvelope {
    pub metadata: ExportMetadata,
    pub data: Vec<Record>,
}

/// Wrap a filtered subset for JSON export.
pub fn json_envelope(records: Vec<Record>, filters: &FilterSet) -> ExportEnvelope {
    fn or_none(value: &str) -> String {
        if value.is_empty() {
            "none".to_string()
        } else {
            value.to_string()
        }
    }

    ExportEnvelope {
        metadata: ExportMetadata {
            exported: Utc::now(),
            records: records.len(),
            search: or_none(&filters.search),
            location: or_none(&filters.location),
            risk_group: or_none(&filters.risk_group),
        },
        data: records,
    }
}
