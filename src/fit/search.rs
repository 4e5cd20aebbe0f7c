//! Multi-start parameter search for the seasonal model.
//!
//! The CSS surface of a multiplicative SARIMA is not convex, so a single
//! simplex run can stall in a poor basin. We run Nelder–Mead from every point
//! of a small coefficient grid (plus a least-squares seed), evaluate the
//! starts in parallel, and keep the lowest converged CSS. Ties resolve to
//! the earliest start, so the result is deterministic.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::error::AppError;
use crate::math::{NelderMeadConfig, lag_regression, nelder_mead};
use crate::models::{FittedSarima, SarimaParams, SarimaSpec, css, differenced_series};

/// Coefficients are kept inside `(-BOUND, BOUND)`.
pub const COEF_BOUND: f64 = 0.99;

#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Per-coefficient starting values; the search runs on their cartesian
    /// product.
    pub start_grid: Vec<f64>,
    pub optimizer: NelderMeadConfig,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            start_grid: vec![-0.5, 0.0, 0.5],
            optimizer: NelderMeadConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    point: Vec<f64>,
    value: f64,
}

/// Fit `spec` to a level series by conditional least squares.
pub fn fit_sarima(spec: SarimaSpec, series: &[f64], opts: &FitOptions) -> Result<FittedSarima, AppError> {
    let needed = spec.min_observations();
    if series.len() < needed {
        return Err(AppError::ModelFit(format!(
            "Insufficient history for {}: need at least {needed} monthly periods, got {}.",
            spec.label(),
            series.len()
        )));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(AppError::ModelFit("Monthly series contains non-finite values.".into()));
    }

    let w = differenced_series(&spec, series);
    let k = spec.num_params();
    let bounds = vec![(-COEF_BOUND, COEF_BOUND); k];
    let starts = start_points(&spec, &w, &opts.start_grid);

    let candidates: Vec<Candidate> = starts
        .par_iter()
        .enumerate()
        .filter_map(|(idx, start)| {
            let result = nelder_mead(
                |x| css(&spec, &SarimaParams::from_flat(&spec, x), &w),
                start,
                &bounds,
                &opts.optimizer,
            );
            (result.converged && result.value.is_finite()).then_some(Candidate {
                idx,
                point: result.point,
                value: result.value,
            })
        })
        .collect();

    let best = candidates
        .into_iter()
        .min_by(|a, b| {
            a.value
                .partial_cmp(&b.value)
                .unwrap_or(Ordering::Equal)
                .then(a.idx.cmp(&b.idx))
        })
        .ok_or_else(|| {
            AppError::ModelFit(format!(
                "{} fit did not converge from any of {} starting points.",
                spec.label(),
                starts.len()
            ))
        })?;

    let params = SarimaParams::from_flat(&spec, &best.point);
    let fitted = FittedSarima::new(spec, params, series.to_vec());

    tracing::debug!(
        model = %spec.label(),
        css = fitted.css,
        sigma2 = fitted.sigma2,
        coefficients = ?fitted.params.to_flat(),
        start = best.idx,
        "seasonal model fitted"
    );

    Ok(fitted)
}

/// Least-squares seed first, then the grid.
fn start_points(spec: &SarimaSpec, w: &[f64], grid: &[f64]) -> Vec<Vec<f64>> {
    let k = spec.num_params();
    let mut starts = Vec::new();

    if let Some(seed) = least_squares_seed(spec, w) {
        starts.push(seed);
    }

    let grid: Vec<f64> = if grid.is_empty() { vec![0.0] } else { grid.to_vec() };
    let total = grid.len().pow(k as u32);
    for n in 0..total {
        let mut rem = n;
        let mut point = Vec::with_capacity(k);
        for _ in 0..k {
            point.push(grid[rem % grid.len()].clamp(-COEF_BOUND, COEF_BOUND));
            rem /= grid.len();
        }
        starts.push(point);
    }
    starts
}

/// Regress `w_t` on `w_{t-1}` and `w_{t-s}` for the AR terms; MA terms
/// start at zero. `None` when the series is too short to regress.
fn least_squares_seed(spec: &SarimaSpec, w: &[f64]) -> Option<Vec<f64>> {
    let mut lags = Vec::new();
    if spec.p > 0 {
        lags.push(1);
    }
    if spec.seasonal_p > 0 && spec.period > 0 {
        lags.push(spec.period);
    }
    let coefs = lag_regression(w, &lags)?;

    let mut coefs = coefs.into_iter().map(|c| c.clamp(-COEF_BOUND, COEF_BOUND));
    let ar_seed = if spec.p > 0 { coefs.next() } else { None };
    let sar_seed = if spec.seasonal_p > 0 && spec.period > 0 { coefs.next() } else { None };

    let mut params = SarimaParams::from_flat(spec, &vec![0.0; spec.num_params()]);
    if let (Some(first), Some(v)) = (params.ar.first_mut(), ar_seed) {
        *first = v;
    }
    if let (Some(first), Some(v)) = (params.seasonal_ar.first_mut(), sar_seed) {
        *first = v;
    }
    Some(params.to_flat())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasonal_series(months: usize) -> Vec<f64> {
        let pattern = [230.0, 215.0, 190.0, 170.0, 185.0, 205.0, 240.0, 260.0, 255.0, 245.0, 240.0, 235.0];
        (0..months)
            .map(|i| pattern[i % 12] - 0.5 * i as f64 + 3.0 * ((i * 7 % 5) as f64 - 2.0))
            .collect()
    }

    #[test]
    fn rejects_short_history() {
        let err = fit_sarima(SarimaSpec::MONTHLY, &seasonal_series(23), &FitOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::ModelFit(msg) if msg.contains("24")));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut series = seasonal_series(36);
        series[5] = f64::NAN;
        assert!(matches!(
            fit_sarima(SarimaSpec::MONTHLY, &series, &FitOptions::default()),
            Err(AppError::ModelFit(_))
        ));
    }

    #[test]
    fn fits_within_bounds_and_beats_the_zero_model() {
        let spec = SarimaSpec::MONTHLY;
        let series = seasonal_series(48);
        let fitted = fit_sarima(spec, &series, &FitOptions::default()).unwrap();

        for c in fitted.params.to_flat() {
            assert!(c.abs() <= COEF_BOUND);
        }
        let zero = SarimaParams::from_flat(&spec, &[0.0; 4]);
        let w = differenced_series(&spec, &series);
        assert!(fitted.css <= css(&spec, &zero, &w) + 1e-9);
    }

    #[test]
    fn grid_covers_every_combination() {
        let spec = SarimaSpec::MONTHLY;
        let starts = start_points(&spec, &[], &[-0.5, 0.0, 0.5]);
        // No seed for an empty series, so only the 3^4 grid remains.
        assert_eq!(starts.len(), 81);
        assert!(starts.iter().all(|s| s.len() == 4));
    }
}
