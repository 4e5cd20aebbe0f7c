//! Series file loading and validation.
//!
//! A series lives in `<data_dir>/<series_id>.json`:
//!
//! ```text
//! {"data": [{"datetime": "2019-12-01T00:00:00Z", "carbon_intensity": 312}, ...]}
//! ```
//!
//! The whole file is validated before anything is returned, so callers never
//! compute over a partially valid series. Files are re-read on every call.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::time::parse_timestamp;
use crate::domain::{Record, SeriesId};
use crate::error::AppError;

pub const DATETIME_KEY: &str = "datetime";
pub const INTENSITY_KEY: &str = "carbon_intensity";

/// Read-only access to series files in one directory.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    data_dir: PathBuf,
}

impl SeriesStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, id: &SeriesId) -> PathBuf {
        self.data_dir.join(format!("{}.json", id.as_str()))
    }

    /// Load and validate a series. Record order follows the file.
    pub fn load(&self, id: &SeriesId) -> Result<Vec<Record>, AppError> {
        let path = self.path_for(id);
        let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("File not found: {}", path.display())),
            _ => AppError::Format(format!("Failed to read '{}': {e}", path.display())),
        })?;

        let records = parse_series(&text)?;
        tracing::debug!(series = %id, records = records.len(), "loaded series");
        Ok(records)
    }

    /// Latest timestamp present in the series.
    pub fn last_available(&self, id: &SeriesId) -> Result<DateTime<Utc>, AppError> {
        self.load(id)?
            .iter()
            .map(|r| r.timestamp)
            .max()
            .ok_or_else(|| AppError::EmptyRange(format!("Series '{id}' has no records.")))
    }
}

/// Parse and validate series JSON text.
pub fn parse_series(text: &str) -> Result<Vec<Record>, AppError> {
    let root: Value =
        serde_json::from_str(text).map_err(|e| AppError::Format(format!("Error decoding JSON: {e}")))?;

    // A missing `data` key is an empty series, an explicit non-list is not.
    let entries = match root.get("data") {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(AppError::Format("Invalid format: 'data' must be a list".into())),
    };

    let mut records = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        records.push(parse_record(idx, entry)?);
    }
    Ok(records)
}

fn parse_record(idx: usize, entry: &Value) -> Result<Record, AppError> {
    let Some(obj) = entry.as_object() else {
        return Err(AppError::Format(format!(
            "Invalid record format: record {idx} must be an object, found {}",
            json_type_name(entry)
        )));
    };

    let (Some(raw_ts), Some(raw_value)) = (obj.get(DATETIME_KEY), obj.get(INTENSITY_KEY)) else {
        return Err(AppError::Format(format!(
            "Invalid record format: record {idx} must contain '{DATETIME_KEY}' and '{INTENSITY_KEY}' keys"
        )));
    };

    let timestamp = raw_ts
        .as_str()
        .and_then(parse_timestamp)
        .ok_or_else(|| AppError::Format(format!("Invalid record format: record {idx} has an unparsable datetime {raw_ts}")))?;

    let value = raw_value.as_f64().filter(|v| v.is_finite());

    Ok(Record { timestamp, value })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn store_with(name: &str, body: &str) -> (TempDir, SeriesStore, SeriesId) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(format!("{name}.json")), body).unwrap();
        let store = SeriesStore::new(dir.path());
        (dir, store, SeriesId::parse(name).unwrap())
    }

    #[test]
    fn loads_records_in_file_order() {
        let (_dir, store, id) = store_with(
            "grid",
            r#"{"data": [
                {"datetime": "2020-01-02T00:00:00Z", "carbon_intensity": 200},
                {"datetime": "2020-01-01T00:00:00Z", "carbon_intensity": 150.5}
            ]}"#,
        );
        let records = store.load(&id).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(records[1].value, Some(150.5));
        assert_eq!(
            store.last_available(&id).unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path());
        let err = store.load(&SeriesId::parse("absent").unwrap()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn malformed_json_is_format_error() {
        let (_dir, store, id) = store_with("broken", "{\"data\": [");
        assert!(matches!(store.load(&id), Err(AppError::Format(_))));
    }

    #[test]
    fn data_must_be_a_list() {
        let err = parse_series(r#"{"data": {"datetime": "2020-01-01"}}"#).unwrap_err();
        assert_eq!(err, AppError::Format("Invalid format: 'data' must be a list".into()));
    }

    #[test]
    fn missing_intensity_key_is_format_error() {
        let err = parse_series(
            r#"{"data": [
                {"datetime": "2020-01-01T00:00:00Z", "carbon_intensity": 1},
                {"datetime": "2020-01-01T01:00:00Z"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Format(msg) if msg.contains("carbon_intensity")));
    }

    #[test]
    fn non_object_record_is_format_error() {
        let err = parse_series(r#"{"data": [42]}"#).unwrap_err();
        assert!(matches!(err, AppError::Format(msg) if msg.contains("number")));
    }

    #[test]
    fn non_numeric_intensity_is_kept_as_missing() {
        let records = parse_series(
            r#"{"data": [{"datetime": "2020-01-01T00:00:00Z", "carbon_intensity": "high"}]}"#,
        )
        .unwrap();
        assert_eq!(records[0].value, None);
    }

    #[test]
    fn absent_data_key_is_an_empty_series() {
        assert!(parse_series("{}").unwrap().is_empty());
    }
}
