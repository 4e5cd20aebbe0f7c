//! Lowest-emission month from a seasonal ARIMA forecast.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

use crate::analysis::resample::monthly_means;
use crate::domain::time::month_ends_between;
use crate::domain::{ForecastPoint, MonthMean, MonthlyForecast, Record};
use crate::error::AppError;
use crate::fit::{FitOptions, fit_sarima};
use crate::math::stats::round_half_even;
use crate::models::SarimaSpec;

/// Forecast monthly means across `[start, end]` and report the month with
/// the lowest average.
///
/// The horizon is the number of month ends inside the range; step `i` of the
/// forecast is labelled with the `i`-th of those month ends.
pub fn forecast_least_carbon(
    records: &[Record],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    opts: &FitOptions,
) -> Result<MonthlyForecast, AppError> {
    let labels = month_ends_between(start, end);
    if labels.is_empty() {
        return Err(AppError::Validation(format!(
            "No month ends between {} and {}; the forecast horizon must be at least one month.",
            start.to_rfc3339(),
            end.to_rfc3339()
        )));
    }

    let monthly = monthly_means(records)?;
    let fitted = fit_sarima(SarimaSpec::MONTHLY, &monthly.values, opts)?;
    let forecast = fitted.forecast(labels.len());

    let points: Vec<ForecastPoint> = labels
        .iter()
        .zip(forecast)
        .map(|(&period_end, value)| ForecastPoint { period_end, value })
        .collect();

    let monthly_means = group_by_month(&points);
    tracing::info!(
        horizon = points.len(),
        means = ?monthly_means.iter().map(|m| (m.month, m.value)).collect::<Vec<_>>(),
        "forecast monthly averages"
    );

    let best = lowest_month(&monthly_means)
        .ok_or_else(|| AppError::ModelFit("Forecast produced no finite values.".into()))?;

    Ok(MonthlyForecast {
        month: best.month,
        predicted_value: round_half_even(best.value),
        points,
        monthly_means,
        interpolated_months: monthly.interpolated,
    })
}

/// Calendar month → mean of the forecast steps in that month, ascending.
pub fn group_by_month(points: &[ForecastPoint]) -> Vec<MonthMean> {
    let mut acc: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for p in points {
        let slot = acc.entry(p.period_end.month()).or_insert((0.0, 0));
        slot.0 += p.value;
        slot.1 += 1;
    }
    acc.into_iter()
        .map(|(month, (sum, n))| MonthMean {
            month,
            value: sum / n as f64,
        })
        .collect()
}

/// Lowest finite mean; the earliest month wins ties.
fn lowest_month(means: &[MonthMean]) -> Option<&MonthMean> {
    means
        .iter()
        .filter(|m| m.value.is_finite())
        .fold(None, |best: Option<&MonthMean>, m| match best {
            Some(b) if m.value >= b.value => Some(b),
            _ => Some(m),
        })
}
