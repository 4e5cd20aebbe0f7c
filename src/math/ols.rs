//! Least squares solver.
//!
//! Used to seed the seasonal model search: regressing the differenced series
//! on its own lags gives a cheap first guess for the autoregressive terms.
//!
//! We solve via SVD so tall (more rows than columns) and nearly collinear
//! design matrices are handled without panicking.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Regress `series[t]` on `series[t - lag]` for each lag, without intercept.
///
/// Rows start at the largest lag so every regressor is observed. Returns
/// `None` when there are not more rows than lags.
pub fn lag_regression(series: &[f64], lags: &[usize]) -> Option<Vec<f64>> {
    let max_lag = lags.iter().copied().max()?;
    if series.len() <= max_lag + lags.len() {
        return None;
    }

    let rows = series.len() - max_lag;
    let mut x = DMatrix::<f64>::zeros(rows, lags.len());
    let mut y = DVector::<f64>::zeros(rows);
    for (r, t) in (max_lag..series.len()).enumerate() {
        y[r] = series[t];
        for (c, &lag) in lags.iter().enumerate() {
            x[(r, c)] = series[t - lag];
        }
    }

    solve_least_squares(&x, &y).map(|beta| beta.iter().copied().collect())
}
