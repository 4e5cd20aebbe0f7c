//! Lag polynomials and (seasonal) differencing.
//!
//! Polynomials are stored by ascending power of the backshift operator `B`:
//! `[1.0, -1.0]` is `1 - B`.

/// Multiply two lag polynomials.
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `(1 - B)^d (1 - B^period)^seasonal_d`.
pub fn difference_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// Apply a differencing polynomial. The output is shorter by `poly.len() - 1`.
pub fn apply_difference(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let order = poly.len().saturating_sub(1);
    if series.len() <= order {
        return Vec::new();
    }
    (order..series.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * series[t - k]).sum())
        .collect()
}

/// Undo differencing for values that continue `history`.
///
/// Solves `Σ c_k y_{t-k} = w_t` for `y_t`, one step at a time, so each new
/// level feeds the next.
pub fn integrate(history: &[f64], differenced: &[f64], poly: &[f64]) -> Vec<f64> {
    let mut levels = history.to_vec();
    let start = levels.len();
    for &w in differenced {
        let t = levels.len();
        let carried: f64 = poly
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| if t >= k { c * levels[t - k] } else { 0.0 })
            .sum();
        levels.push(w - carried);
    }
    levels.split_off(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_difference_polynomial() {
        // (1 - B)(1 - B^4) = 1 - B - B^4 + B^5
        let poly = difference_polynomial(1, 1, 4);
        assert_eq!(poly, vec![1.0, -1.0, 0.0, 0.0, -1.0, 1.0]);
    }

    #[test]
    fn first_difference() {
        let poly = difference_polynomial(1, 0, 12);
        assert_eq!(apply_difference(&[1.0, 4.0, 9.0, 16.0], &poly), vec![3.0, 5.0, 7.0]);
    }

    #[test]
    fn integrate_inverts_difference() {
        let series: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).sin() * 10.0 + i as f64).collect();
        let poly = difference_polynomial(1, 1, 6);
        let w = apply_difference(&series, &poly);

        let split = 20;
        let tail_w = &w[split - (poly.len() - 1)..];
        let rebuilt = integrate(&series[..split], tail_w, &poly);
        for (a, b) in rebuilt.iter().zip(&series[split..]) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn too_short_series_differences_to_nothing() {
        let poly = difference_polynomial(1, 1, 12);
        assert!(apply_difference(&[1.0; 13], &poly).is_empty());
    }
}
