//! Seasonal-minimum prediction.
//!
//! For each calendar month we take the average of every year in which that
//! month was observed, keep the smallest of those yearly averages, and
//! predict the month whose smallest average is lowest overall. Ties go to
//! the lowest month number.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::{Record, SeasonalPrediction};
use crate::error::AppError;
use crate::math::stats::round_half_even;

/// Running sum and count for one `(year, month)` bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyAggregate {
    pub sum: f64,
    pub count: usize,
}

impl MonthlyAggregate {
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Group numeric readings by `(year, month)`.
///
/// Readings without a numeric value are skipped with a warning.
pub fn monthly_totals(records: &[Record]) -> BTreeMap<(i32, u32), MonthlyAggregate> {
    let mut totals: BTreeMap<(i32, u32), MonthlyAggregate> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(value) = record.value else {
            skipped += 1;
            continue;
        };
        let bucket = totals
            .entry((record.timestamp.year(), record.timestamp.month()))
            .or_default();
        bucket.sum += value;
        bucket.count += 1;
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipping records with non-numeric carbon intensity");
    }
    totals
}

/// Month (1..=12) → smallest yearly average observed for that month.
pub fn min_monthly_averages(totals: &BTreeMap<(i32, u32), MonthlyAggregate>) -> BTreeMap<u32, f64> {
    let mut out: BTreeMap<u32, f64> = BTreeMap::new();
    for (&(_, month), agg) in totals {
        let Some(avg) = agg.mean() else {
            continue;
        };
        out.entry(month)
            .and_modify(|current| *current = current.min(avg))
            .or_insert(avg);
    }
    out
}

/// Predict the lowest-intensity month of `target_year`.
pub fn predict_least_carbon(records: &[Record], target_year: i32) -> Result<SeasonalPrediction, AppError> {
    let minima = min_monthly_averages(&monthly_totals(records));

    // Strict `<` over ascending months keeps the lowest month on ties.
    let mut best: Option<(u32, f64)> = None;
    for (&month, &value) in &minima {
        match best {
            Some((_, current)) if value >= current => {}
            _ => best = Some((month, value)),
        }
    }

    let (month, value) =
        best.ok_or_else(|| AppError::EmptyRange("No numeric carbon intensity records to predict from.".into()))?;

    Ok(SeasonalPrediction {
        year: target_year,
        month,
        predicted_value: round_half_even(value),
    })
}

/// Prediction for the calendar year after today's (UTC).
pub fn predict_least_carbon_next_year(records: &[Record]) -> Result<SeasonalPrediction, AppError> {
    predict_least_carbon(records, chrono::Utc::now().year() + 1)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(y: i32, m: u32, d: u32, v: f64) -> Record {
        Record::new(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(), v)
    }

    #[test]
    fn averages_within_year_then_minimum_across_years() {
        let records = vec![
            // March 2020 averages 200, March 2021 averages 150.
            at(2020, 3, 1, 180.0),
            at(2020, 3, 2, 220.0),
            at(2021, 3, 1, 140.0),
            at(2021, 3, 2, 160.0),
            // April only observed once at 170.
            at(2020, 4, 1, 170.0),
        ];
        let totals = monthly_totals(&records);
        assert_eq!(totals[&(2020, 3)], MonthlyAggregate { sum: 400.0, count: 2 });

        let minima = min_monthly_averages(&totals);
        assert_eq!(minima[&3], 150.0);
        assert_eq!(minima[&4], 170.0);

        let prediction = predict_least_carbon(&records, 2030).unwrap();
        assert_eq!(
            prediction,
            SeasonalPrediction {
                year: 2030,
                month: 3,
                predicted_value: 150
            }
        );
    }

    #[test]
    fn predicted_value_is_the_rounded_global_minimum() {
        let records = vec![at(2020, 1, 1, 300.4), at(2020, 7, 1, 182.5), at(2021, 7, 1, 190.0)];
        let minima = min_monthly_averages(&monthly_totals(&records));
        let global = minima.values().copied().fold(f64::INFINITY, f64::min);

        let prediction = predict_least_carbon(&records, 2026).unwrap();
        assert_eq!(prediction.month, 7);
        assert_eq!(prediction.predicted_value, round_half_even(global));
        assert_eq!(prediction.predicted_value, 182);
    }

    #[test]
    fn ties_go_to_lowest_month() {
        let records = vec![at(2020, 9, 1, 100.0), at(2020, 2, 1, 100.0), at(2020, 5, 1, 120.0)];
        assert_eq!(predict_least_carbon(&records, 2021).unwrap().month, 2);
    }

    #[test]
    fn non_numeric_records_are_skipped() {
        let mut records = vec![at(2020, 6, 1, 210.0)];
        records.push(Record {
            timestamp: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            value: None,
        });
        assert_eq!(predict_least_carbon(&records, 2021).unwrap().month, 6);
    }

    #[test]
    fn no_numeric_records_is_an_error() {
        assert!(matches!(predict_least_carbon(&[], 2021), Err(AppError::EmptyRange(_))));
    }

    #[test]
    fn next_year_wrapper_reads_the_clock() {
        let records = vec![at(2020, 6, 1, 210.0)];
        let prediction = predict_least_carbon_next_year(&records).unwrap();
        assert_eq!(prediction.year, Utc::now().year() + 1);
    }
}
