//! Shared query logic used by both the CLI and the HTTP server.
//!
//! Every call loads the series fresh from disk, so the front-ends only deal
//! with argument parsing and presentation:
//! series id -> load -> aggregate / predict / forecast

use chrono::{DateTime, Utc};

use crate::analysis;
use crate::data::SeriesStore;
use crate::domain::{MonthlyForecast, RangeSummary, Record, SeasonalPrediction, SeriesId, Statistic, Window, parse_bound};
use crate::error::AppError;
use crate::fit::FitOptions;

/// Query front door over one data directory.
#[derive(Debug, Clone)]
pub struct CarbonService {
    store: SeriesStore,
    fit: FitOptions,
}

impl CarbonService {
    pub fn new(store: SeriesStore) -> Self {
        Self {
            store,
            fit: FitOptions::default(),
        }
    }

    pub fn with_fit_options(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    fn load(&self, ts_id: &str) -> Result<Vec<Record>, AppError> {
        let id = SeriesId::parse(ts_id)?;
        self.store.load(&id)
    }

    /// One of max / min / average / variance over `[start, end)`.
    pub fn statistic(&self, ts_id: &str, stat: Statistic, start: &str, end: &str) -> Result<f64, AppError> {
        let window = Window::parse(start, end)?;
        let records = self.load(ts_id)?;
        analysis::statistic(&records, &window, stat)
    }

    pub fn summary(&self, ts_id: &str, start: &str, end: &str) -> Result<RangeSummary, AppError> {
        let window = Window::parse(start, end)?;
        let records = self.load(ts_id)?;
        analysis::summarize(&records, &window)
    }

    /// Seasonal-minimum month for next calendar year.
    pub fn predict_least_carbon(&self, ts_id: &str) -> Result<SeasonalPrediction, AppError> {
        let records = self.load(ts_id)?;
        analysis::predict_least_carbon_next_year(&records)
    }

    /// SARIMA forecast over `[start_date, end_date]`.
    pub fn predict_advanced(&self, ts_id: &str, start_date: &str, end_date: &str) -> Result<MonthlyForecast, AppError> {
        let start = parse_bound(start_date)?;
        let end = parse_bound(end_date)?;
        let records = self.load(ts_id)?;
        tracing::info!(series = ts_id, records = records.len(), "fitting seasonal forecast");
        analysis::forecast_least_carbon(&records, start, end, &self.fit)
    }

    pub fn last_available(&self, ts_id: &str) -> Result<DateTime<Utc>, AppError> {
        let id = SeriesId::parse(ts_id)?;
        self.store.last_available(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn service_with(json: &str) -> (TempDir, CarbonService) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("grid.json"), json).unwrap();
        let service = CarbonService::new(SeriesStore::new(dir.path()));
        (dir, service)
    }

    const SMALL: &str = r#"{"data": [
        {"datetime": "2020-01-01T00:00:00Z", "carbon_intensity": 300},
        {"datetime": "2020-01-01T01:00:00Z", "carbon_intensity": 280},
        {"datetime": "2020-04-01T00:00:00Z", "carbon_intensity": 150}
    ]}"#;

    #[test]
    fn statistic_reads_the_named_series() {
        let (_dir, svc) = service_with(SMALL);
        let v = svc
            .statistic("grid", Statistic::Max, "2020-01-01T00:00:00Z", "2020-02-01T00:00:00Z")
            .unwrap();
        assert_eq!(v, 300.0);
    }

    #[test]
    fn bad_dates_are_rejected_before_loading() {
        let (_dir, svc) = service_with(SMALL);
        assert!(matches!(
            svc.statistic("missing", Statistic::Min, "not-a-date", "2020-02-01"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn unknown_series_is_not_found() {
        let (_dir, svc) = service_with(SMALL);
        assert!(matches!(
            svc.summary("nope", "2020-01-01", "2020-02-01"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.summary("../grid", "2020-01-01", "2020-02-01"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn seasonal_prediction_and_last_available() {
        let (_dir, svc) = service_with(SMALL);
        let p = svc.predict_least_carbon("grid").unwrap();
        assert_eq!((p.month, p.predicted_value), (4, 150));
        assert_eq!(
            svc.last_available("grid").unwrap().to_rfc3339(),
            "2020-04-01T00:00:00+00:00"
        );
    }
}
