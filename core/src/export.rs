//! CSV export of the full collection.
//!
//! Columns follow the persisted key order of the first record; keys that only
//! later records carry are appended in first-seen order so every row lines up
//! with the header. Every field is double-quoted.

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::record::ApplicationRecord;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data to export.")]
    Empty,

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

pub fn export_file_name(now_ms: i64) -> String {
    format!("engine_room_export_{now_ms}.csv")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render the collection as CSV text (rows joined by `\n`).
pub fn export_csv(records: &[ApplicationRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let objects = records
        .iter()
        .map(|record| match serde_json::to_value(record)? {
            Value::Object(map) => Ok(map),
            other => Err(ExportError::Encode(serde::ser::Error::custom(format!(
                "record serialized to {other}"
            )))),
        })
        .collect::<Result<Vec<_>, ExportError>>()?;

    let mut headers: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut lines = Vec::with_capacity(objects.len() + 1);
    lines.push(headers.join(","));
    for object in &objects {
        let row: Vec<String> = headers
            .iter()
            .map(|key| quote(&cell(object.get(key))))
            .collect();
        lines.push(row.join(","));
    }
    tracing::info!("exported {} records", records.len());
    Ok(lines.join("\n"))
}

/// Write an export into `dir` and return its path.
pub fn write_export(
    dir: &Path,
    records: &[ApplicationRecord],
    now_ms: i64,
) -> Result<PathBuf, ExportError> {
    let csv = export_csv(records)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now_ms));
    std::fs::write(&path, csv)?;
    Ok(path)
}
