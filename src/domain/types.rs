//! Shared domain types.
//!
//! Result types derive `Serialize` so the HTTP layer and JSON exports can
//! emit them directly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::time::parse_timestamp;
use crate::error::AppError;

/// One carbon-intensity reading.
///
/// `value` is `None` when the file holds a non-numeric intensity; such
/// readings are skipped (with a warning) by every computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Record {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }
}

/// Validated series identifier.
///
/// Only ASCII alphanumerics, `_` and `-` are allowed so an identifier always
/// names a file directly inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesId(String);

impl SeriesId {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(AppError::Validation("Series identifier must not be empty.".into()));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(AppError::Validation(format!(
                "Invalid series identifier '{id}': use letters, digits, '_' or '-'."
            )));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open query window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Parse both bounds from ISO-8601 strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        let start = parse_bound(start)?;
        let end = parse_bound(end)?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// Parse a user-supplied date bound.
pub fn parse_bound(raw: &str) -> Result<DateTime<Utc>, AppError> {
    parse_timestamp(raw).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid datetime format '{raw}'. Use ISO 8601 format, e.g. 2019-12-01T00:00:00Z."
        ))
    })
}

/// Range statistics exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Max,
    Min,
    Average,
    Variance,
}

impl Statistic {
    /// Response field name and route segment.
    pub fn key(self) -> &'static str {
        match self {
            Statistic::Max => "max",
            Statistic::Min => "min",
            Statistic::Average => "average",
            Statistic::Variance => "variance",
        }
    }
}

/// All range statistics for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummary {
    pub count: usize,
    pub max: f64,
    pub min: f64,
    pub average: f64,
    /// Absent when only one record is in range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
}

/// Output of the seasonal-minimum predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonalPrediction {
    pub year: i32,
    pub month: u32,
    pub predicted_value: i64,
}

/// One labelled step of a monthly forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub period_end: NaiveDate,
    pub value: f64,
}

/// Mean forecast for one calendar month across the horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthMean {
    pub month: u32,
    pub value: f64,
}

/// Output of the SARIMA forecaster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyForecast {
    pub month: u32,
    pub predicted_value: i64,
    pub points: Vec<ForecastPoint>,
    pub monthly_means: Vec<MonthMean>,
    /// Months filled by interpolation before fitting.
    pub interpolated_months: usize,
}

/// What a natural-language prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    AverageCarbonIntensity,
    MaximumCarbonIntensity,
    MinimumCarbonIntensity,
    PredictLeastCarbon,
}

impl Concept {
    pub const ALL: [Concept; 4] = [
        Concept::AverageCarbonIntensity,
        Concept::MaximumCarbonIntensity,
        Concept::MinimumCarbonIntensity,
        Concept::PredictLeastCarbon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Concept::AverageCarbonIntensity => "average_carbon_intensity",
            Concept::MaximumCarbonIntensity => "maximum_carbon_intensity",
            Concept::MinimumCarbonIntensity => "minimum_carbon_intensity",
            Concept::PredictLeastCarbon => "predict_least_carbon",
        }
    }
}

impl FromStr for Concept {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Concept::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| AppError::ExternalProcess(format!("Unknown concept '{needle}'.")))
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reading of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub concept: Concept,
}
