//! Input/output helpers.
//!
//! - forecast JSON exports (`export`)
//! - series files for generated data (`export`)

pub mod export;

pub use export::*;
