//! Range statistics over a half-open window.

use crate::domain::{RangeSummary, Record, Statistic, Window};
use crate::error::AppError;
use crate::math::stats;

pub const EMPTY_RANGE_MESSAGE: &str = "No data available for the given range";

/// Numeric values with `start <= timestamp < end`, in file order.
///
/// Readings without a numeric value are skipped with a warning.
pub fn window_values(records: &[Record], window: &Window) -> Vec<f64> {
    let mut skipped = 0usize;
    let values: Vec<f64> = records
        .iter()
        .filter(|r| window.contains(r.timestamp))
        .filter_map(|r| {
            if r.value.is_none() {
                skipped += 1;
            }
            r.value
        })
        .collect();

    if skipped > 0 {
        tracing::warn!(skipped, "skipping records with non-numeric carbon intensity");
    }
    values
}

/// Compute one statistic over the window.
pub fn statistic(records: &[Record], window: &Window, stat: Statistic) -> Result<f64, AppError> {
    let values = window_values(records, window);
    if values.is_empty() {
        return Err(AppError::EmptyRange(EMPTY_RANGE_MESSAGE.into()));
    }

    match stat {
        Statistic::Max => stats::max(&values),
        Statistic::Min => stats::min(&values),
        Statistic::Average => stats::mean(&values),
        Statistic::Variance => Some(variance(&values)?),
    }
    .ok_or_else(|| AppError::EmptyRange(EMPTY_RANGE_MESSAGE.into()))
}

/// All statistics in one pass over the window.
pub fn summarize(records: &[Record], window: &Window) -> Result<RangeSummary, AppError> {
    let values = window_values(records, window);
    let (Some(max), Some(min), Some(average)) = (stats::max(&values), stats::min(&values), stats::mean(&values))
    else {
        return Err(AppError::EmptyRange(EMPTY_RANGE_MESSAGE.into()));
    };

    Ok(RangeSummary {
        count: values.len(),
        max,
        min,
        average,
        variance: stats::sample_variance(&values),
    })
}

fn variance(values: &[f64]) -> Result<f64, AppError> {
    stats::sample_variance(values).ok_or_else(|| {
        AppError::Data(format!(
            "Variance is undefined for {} record(s) in range; at least 2 are required.",
            values.len()
        ))
    })
}
