//! JSON exports: forecasts and generated series files.

use std::fs::{self, File};
use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::data::loader::{DATETIME_KEY, INTENSITY_KEY};
use crate::domain::{MonthlyForecast, Record};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ForecastFile<'a> {
    series: &'a str,
    model: &'static str,
    start: &'a str,
    end: &'a str,
    #[serde(flatten)]
    forecast: &'a MonthlyForecast,
}

/// Write a forecast with its labelled steps and monthly means.
pub fn write_forecast_json(
    path: &Path,
    series: &str,
    start: &str,
    end: &str,
    forecast: &MonthlyForecast,
) -> Result<(), AppError> {
    let file = create(path)?;
    let doc = ForecastFile {
        series,
        model: "SARIMA(1,1,1)(1,1,1)[12]",
        start,
        end,
        forecast,
    };
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::Io(format!("Failed to write forecast JSON: {e}")))?;
    tracing::info!(path = %path.display(), "wrote forecast export");
    Ok(())
}

/// Write records in the series file format read by the loader.
pub fn write_series_file(path: &Path, records: &[Record]) -> Result<(), AppError> {
    let data: Vec<_> = records
        .iter()
        .map(|r| {
            json!({
                DATETIME_KEY: r.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                INTENSITY_KEY: r.value,
            })
        })
        .collect();

    let file = create(path)?;
    serde_json::to_writer(file, &json!({ "data": data }))
        .map_err(|e| AppError::Io(format!("Failed to write series file: {e}")))?;
    tracing::info!(path = %path.display(), records = records.len(), "wrote series file");
    Ok(())
}

fn create(path: &Path) -> Result<File, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    File::create(path).map_err(|e| AppError::Io(format!("Failed to create '{}': {e}", path.display())))
}
