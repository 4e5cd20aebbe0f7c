//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - build starting points for the seasonal model
//! - run the simplex search from each start (parallel)
//! - keep the best converged candidate

pub mod search;

pub use search::*;
