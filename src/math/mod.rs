//! Mathematical utilities: descriptive statistics, least squares, and
//! simplex minimisation.

pub mod ols;
pub mod optimize;
pub mod stats;

pub use ols::*;
pub use optimize::*;
