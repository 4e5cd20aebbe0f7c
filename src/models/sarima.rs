//! Multiplicative seasonal ARIMA model, SARIMA(p,d,q)(P,D,Q)[s].
//!
//! With `w_t` the differenced series,
//!
//! ```text
//! φ(B) Φ(B^s) w_t = θ(B) Θ(B^s) e_t
//! ```
//!
//! No constant term is estimated. Parameters are scored by the conditional
//! sum of squares (CSS) with pre-sample `w` and `e` set to zero; forecasts
//! set future shocks to zero and integrate back to levels.

use crate::models::diff::{apply_difference, difference_polynomial, integrate, poly_mul};

/// Model orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaSpec {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaSpec {
    /// SARIMA(1,1,1)(1,1,1)[12], used for monthly carbon intensity.
    pub const MONTHLY: SarimaSpec = SarimaSpec {
        p: 1,
        d: 1,
        q: 1,
        seasonal_p: 1,
        seasonal_d: 1,
        seasonal_q: 1,
        period: 12,
    };

    pub fn num_params(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Observations consumed by differencing.
    pub fn difference_order(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    /// Shortest history we accept: two full seasonal cycles, and enough
    /// differenced points to exceed the parameter count.
    pub fn min_observations(&self) -> usize {
        let cycles = 2 * self.period.max(1);
        let identifiable = self.difference_order() + self.num_params() + 1;
        cycles.max(identifiable)
    }

    pub fn label(&self) -> String {
        format!(
            "SARIMA({},{},{})({},{},{})[{}]",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }
}

/// Estimated coefficients, in the order `[ar.., ma.., sar.., sma..]` when
/// flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaParams {
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
}

impl SarimaParams {
    pub fn from_flat(spec: &SarimaSpec, flat: &[f64]) -> Self {
        let (ar, rest) = flat.split_at(spec.p.min(flat.len()));
        let (ma, rest) = rest.split_at(spec.q.min(rest.len()));
        let (sar, rest) = rest.split_at(spec.seasonal_p.min(rest.len()));
        let sma = &rest[..spec.seasonal_q.min(rest.len())];
        Self {
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: sar.to_vec(),
            seasonal_ma: sma.to_vec(),
        }
    }

    pub fn to_flat(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.ar.len() + self.ma.len() + self.seasonal_ar.len() + self.seasonal_ma.len());
        out.extend(&self.ar);
        out.extend(&self.ma);
        out.extend(&self.seasonal_ar);
        out.extend(&self.seasonal_ma);
        out
    }

    /// Expanded AR side as coefficients on lags 1.. of `w`:
    /// `w_t = Σ a_k w_{t-k} + ...`.
    fn ar_lags(&self, period: usize) -> Vec<f64> {
        let regular = lag_poly(&self.ar, 1, -1.0);
        let seasonal = lag_poly(&self.seasonal_ar, period, -1.0);
        poly_mul(&regular, &seasonal).iter().skip(1).map(|c| -c).collect()
    }

    /// Expanded MA side as coefficients on lags 1.. of `e`.
    fn ma_lags(&self, period: usize) -> Vec<f64> {
        let regular = lag_poly(&self.ma, 1, 1.0);
        let seasonal = lag_poly(&self.seasonal_ma, period, 1.0);
        poly_mul(&regular, &seasonal).into_iter().skip(1).collect()
    }
}

/// `1 + sign * (c_1 B^step + c_2 B^{2 step} + ...)`.
fn lag_poly(coefs: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefs.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// One-step residuals of the differenced series under `params`.
pub fn residuals(spec: &SarimaSpec, params: &SarimaParams, w: &[f64]) -> Vec<f64> {
    let ar = params.ar_lags(spec.period);
    let ma = params.ma_lags(spec.period);

    let mut e = Vec::with_capacity(w.len());
    for t in 0..w.len() {
        let mut pred = 0.0;
        for (k, a) in ar.iter().enumerate() {
            let lag = k + 1;
            if t >= lag {
                pred += a * w[t - lag];
            }
        }
        for (k, m) in ma.iter().enumerate() {
            let lag = k + 1;
            if t >= lag {
                pred += m * e[t - lag];
            }
        }
        e.push(w[t] - pred);
    }
    e
}

/// Conditional sum of squares.
pub fn css(spec: &SarimaSpec, params: &SarimaParams, w: &[f64]) -> f64 {
    residuals(spec, params, w).iter().map(|r| r * r).sum()
}

/// A fitted model, ready to forecast.
#[derive(Debug, Clone)]
pub struct FittedSarima {
    pub spec: SarimaSpec,
    pub params: SarimaParams,
    /// Level series the model was fitted on.
    pub history: Vec<f64>,
    pub differenced: Vec<f64>,
    pub residuals: Vec<f64>,
    pub css: f64,
    pub sigma2: f64,
}

impl FittedSarima {
    pub fn new(spec: SarimaSpec, params: SarimaParams, history: Vec<f64>) -> Self {
        let differenced = differenced_series(&spec, &history);
        let residuals = residuals(&spec, &params, &differenced);
        let css = residuals.iter().map(|r| r * r).sum::<f64>();
        let sigma2 = if residuals.is_empty() {
            f64::NAN
        } else {
            css / residuals.len() as f64
        };
        Self {
            spec,
            params,
            history,
            differenced,
            residuals,
            css,
            sigma2,
        }
    }

    /// Point forecasts for the next `horizon` periods, on the level scale.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        if horizon == 0 {
            return Vec::new();
        }

        let ar = self.params.ar_lags(self.spec.period);
        let ma = self.params.ma_lags(self.spec.period);

        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        for _ in 0..horizon {
            let t = w.len();
            let mut pred = 0.0;
            for (k, a) in ar.iter().enumerate() {
                let lag = k + 1;
                if t >= lag {
                    pred += a * w[t - lag];
                }
            }
            for (k, m) in ma.iter().enumerate() {
                let lag = k + 1;
                if t >= lag {
                    pred += m * e[t - lag];
                }
            }
            w.push(pred);
            e.push(0.0);
        }

        let poly = self.difference_polynomial();
        integrate(&self.history, &w[self.differenced.len()..], &poly)
    }

    fn difference_polynomial(&self) -> Vec<f64> {
        difference_polynomial(self.spec.d, self.spec.seasonal_d, self.spec.period)
    }
}

pub fn differenced_series(spec: &SarimaSpec, series: &[f64]) -> Vec<f64> {
    let poly = difference_polynomial(spec.d, spec.seasonal_d, spec.period);
    apply_difference(series, &poly)
}
