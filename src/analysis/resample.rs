//! Month-end resampling of an hourly (or irregular) series.

use crate::analysis::seasonal::monthly_totals;
use crate::domain::Record;
use crate::domain::time::next_month;
use crate::error::AppError;

/// Contiguous monthly means from the first observed month to the last.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    /// `(year, month)` of `values[0]`.
    pub start: (i32, u32),
    pub values: Vec<f64>,
    /// Number of months with no readings that were filled by interpolation.
    pub interpolated: usize,
}

impl MonthlySeries {
    /// `(year, month)` of the last value.
    pub fn last_period(&self) -> (i32, u32) {
        let (mut y, mut m) = self.start;
        for _ in 1..self.values.len() {
            (y, m) = next_month(y, m);
        }
        (y, m)
    }
}

/// Average every calendar month and fill interior gaps linearly.
pub fn monthly_means(records: &[Record]) -> Result<MonthlySeries, AppError> {
    let totals = monthly_totals(records);
    let (Some((&first, _)), Some((&last, _))) = (totals.first_key_value(), totals.last_key_value()) else {
        return Err(AppError::EmptyRange(
            "No numeric carbon intensity records to resample.".into(),
        ));
    };

    let mut slots: Vec<Option<f64>> = Vec::new();
    let mut period = first;
    loop {
        slots.push(totals.get(&period).and_then(|agg| agg.mean()));
        if period == last {
            break;
        }
        period = next_month(period.0, period.1);
    }

    let interpolated = slots.iter().filter(|v| v.is_none()).count();
    if interpolated > 0 {
        tracing::info!(interpolated, "filled months without readings by linear interpolation");
    }

    Ok(MonthlySeries {
        start: first,
        values: interpolate_gaps(&slots),
        interpolated,
    })
}

/// Linear fill between known neighbours. The first and last slots are always
/// known for output of `monthly_means`.
fn interpolate_gaps(slots: &[Option<f64>]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(slots.len());
    let mut i = 0;
    while i < slots.len() {
        if let Some(v) = slots[i] {
            out.push(v);
            i += 1;
            continue;
        }

        let left = out.last().copied();
        let gap_end = slots[i..].iter().position(Option::is_some).map(|off| i + off);
        match (left, gap_end.and_then(|j| slots[j].map(|v| (j, v)))) {
            (Some(a), Some((j, b))) => {
                let span = (j - i + 1) as f64;
                for k in 0..(j - i) {
                    out.push(a + (b - a) * (k + 1) as f64 / span);
                }
                i = j;
            }
            // Edge gaps carry the nearest known value.
            (Some(a), None) => {
                out.push(a);
                i += 1;
            }
            (None, Some((_, b))) => {
                out.push(b);
                i += 1;
            }
            (None, None) => {
                out.push(f64::NAN);
                i += 1;
            }
        }
    }
    out
}
