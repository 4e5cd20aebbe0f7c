//! Formatted terminal output for query results.
//!
//! Formatting lives here so the analysis code stays free of presentation and
//! output changes stay localized.

use crate::domain::time::month_name;
use crate::domain::{MonthlyForecast, RangeSummary, SeasonalPrediction, Statistic};

const UNIT: &str = "Tons CO2e/GWh";

/// One statistic over a window.
pub fn format_statistic(series: &str, stat: Statistic, start: &str, end: &str, value: f64) -> String {
    format!("{series} {} [{start}, {end}): {value:.4} {UNIT}", stat.key())
}

/// All statistics over a window as a small table.
pub fn format_summary(series: &str, start: &str, end: &str, summary: &RangeSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {series} ===\n"));
    out.push_str(&format!("Window: [{start}, {end})\n"));
    out.push_str(&format!("Records:  {}\n", summary.count));
    out.push_str(&format!("Max:      {:>12.4}\n", summary.max));
    out.push_str(&format!("Min:      {:>12.4}\n", summary.min));
    out.push_str(&format!("Average:  {:>12.4}\n", summary.average));
    match summary.variance {
        Some(v) => out.push_str(&format!("Variance: {v:>12.4}\n")),
        None => out.push_str("Variance:          n/a (needs 2 records)\n"),
    }
    out
}

pub fn format_seasonal(series: &str, prediction: &SeasonalPrediction) -> String {
    format!(
        "{series}: lowest expected month in {} is {} ({} {UNIT})",
        prediction.year,
        month_name(prediction.month),
        prediction.predicted_value
    )
}

/// Forecast table plus the chosen month.
pub fn format_forecast(series: &str, forecast: &MonthlyForecast) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {series} SARIMA(1,1,1)(1,1,1)[12] forecast ===\n"));
    if forecast.interpolated_months > 0 {
        out.push_str(&format!(
            "Interpolated history months: {}\n",
            forecast.interpolated_months
        ));
    }

    out.push_str("\nPeriod end    Forecast\n");
    for p in &forecast.points {
        out.push_str(&format!("{}  {:>10.2}\n", p.period_end, p.value));
    }

    out.push_str("\nMonth        Mean\n");
    for m in &forecast.monthly_means {
        let marker = if m.month == forecast.month { "  <- lowest" } else { "" };
        out.push_str(&format!("{:<9} {:>10.2}{marker}\n", month_name(m.month), m.value));
    }

    out.push_str(&format!(
        "\nLowest month: {} ({} {UNIT})\n",
        month_name(forecast.month),
        forecast.predicted_value
    ));
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{ForecastPoint, MonthMean};

    #[test]
    fn summary_marks_missing_variance() {
        let s = RangeSummary {
            count: 1,
            max: 312.0,
            min: 312.0,
            average: 312.0,
            variance: None,
        };
        let text = format_summary("grid", "2019-12-01", "2019-12-02", &s);
        assert!(text.contains("Records:  1"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn forecast_marks_the_lowest_month() {
        let f = MonthlyForecast {
            month: 4,
            predicted_value: 171,
            points: vec![
                ForecastPoint {
                    period_end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                    value: 190.0,
                },
                ForecastPoint {
                    period_end: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
                    value: 171.2,
                },
            ],
            monthly_means: vec![MonthMean { month: 3, value: 190.0 }, MonthMean { month: 4, value: 171.2 }],
            interpolated_months: 0,
        };
        let text = format_forecast("grid", &f);
        assert!(text.contains("2024-04-30"));
        assert!(text.contains("April"));
        assert!(text.lines().any(|l| l.starts_with("April") && l.ends_with("<- lowest")));
        assert!(text.contains("Lowest month: April (171 Tons CO2e/GWh)"));
        assert!(!text.contains("Interpolated"));
    }

    #[test]
    fn seasonal_line_names_the_month() {
        let p = SeasonalPrediction {
            year: 2027,
            month: 5,
            predicted_value: 140,
        };
        assert_eq!(
            format_seasonal("grid", &p),
            "grid: lowest expected month in 2027 is May (140 Tons CO2e/GWh)"
        );
    }
}
