//! Queries over a loaded series.
//!
//! - `aggregate`: statistics over a half-open window
//! - `seasonal`: naive lowest-month prediction from yearly monthly averages
//! - `resample`: contiguous monthly means
//! - `forecast`: lowest month of a seasonal ARIMA forecast

pub mod aggregate;
pub mod forecast;
pub mod resample;
pub mod seasonal;

pub use aggregate::{statistic, summarize};
pub use forecast::forecast_least_carbon;
pub use resample::{MonthlySeries, monthly_means};
pub use seasonal::{predict_least_carbon, predict_least_carbon_next_year};
