//! Bounded Nelder–Mead simplex minimisation.
//!
//! Bounds are enforced by clamping every trial vertex, which keeps the
//! seasonal model's coefficients inside the stationary/invertible box.

use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stop when the spread of objective values across the simplex falls
    /// below `tolerance * (1 + |best|)`.
    pub tolerance: f64,
    pub initial_step: f64,
    pub alpha: f64,
    pub gamma: f64,
    pub rho: f64,
    pub sigma: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 4000,
            tolerance: 1e-10,
            initial_step: 0.1,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |p: &[f64]| {
        let v = objective(p);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    if n == 0 {
        return NelderMeadResult {
            point: Vec::new(),
            value: eval(initial),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(clamp(initial, bounds));
    for i in 0..n {
        let mut vertex = simplex[0].clone();
        // Step towards the interior when the start sits on an upper bound.
        let step = config.initial_step;
        vertex[i] = if bounds.get(i).is_some_and(|&(_, hi)| vertex[i] + step > hi) {
            vertex[i] - step
        } else {
            vertex[i] + step
        };
        simplex.push(clamp(&vertex, bounds));
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let spread = values[worst] - values[best];
        if values[best].is_finite() && spread <= config.tolerance * (1.0 + values[best].abs()) {
            converged = true;
            break;
        }

        let centroid = centroid_without(&simplex, worst);

        let reflected = clamp(&affine(&centroid, &simplex[worst], -config.alpha), bounds);
        let f_reflected = eval(&reflected);

        if f_reflected < values[best] {
            let expanded = clamp(&affine(&centroid, &reflected, config.gamma), bounds);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < values[worst] {
            let c = clamp(&affine(&centroid, &reflected, config.rho), bounds);
            let f = eval(&c);
            (c, f)
        } else {
            let c = clamp(&affine(&centroid, &simplex[worst], config.rho), bounds);
            let f = eval(&c);
            (c, f)
        };

        if f_contracted < values[worst].min(f_reflected) {
            simplex[worst] = contracted;
            values[worst] = f_contracted;
            continue;
        }

        // Shrink towards the best vertex.
        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i == best {
                continue;
            }
            let shrunk = affine(&anchor, &simplex[i], config.sigma);
            simplex[i] = clamp(&shrunk, bounds);
            values[i] = eval(&simplex[i]);
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal))
        .unwrap_or(0);

    NelderMeadResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

/// `origin + coef * (toward - origin)`.
fn affine(origin: &[f64], toward: &[f64], coef: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(toward)
        .map(|(o, t)| o + coef * (t - o))
        .collect()
}

fn centroid_without(simplex: &[Vec<f64>], skip: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let mut c = vec![0.0; n];
    for (i, vertex) in simplex.iter().enumerate() {
        if i == skip {
            continue;
        }
        for (acc, v) in c.iter_mut().zip(vertex) {
            *acc += v;
        }
    }
    let k = (simplex.len() - 1) as f64;
    c.iter_mut().for_each(|v| *v /= k);
    c
}

fn clamp(point: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    point
        .iter()
        .enumerate()
        .map(|(i, &v)| match bounds.get(i) {
            Some(&(lo, hi)) => v.clamp(lo, hi),
            None => v,
        })
        .collect()
}
