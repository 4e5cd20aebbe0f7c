//! Seasonal ARIMA model implementation.
//!
//! The model is a small set of pure functions plus a fitted-model value so
//! the search code in `fit` stays generic over orders.

pub mod diff;
pub mod sarima;

pub use sarima::*;
