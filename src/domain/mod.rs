//! Domain types used throughout the pipeline.
//!
//! - readings and series identifiers (`Record`, `SeriesId`)
//! - query windows and timestamp parsing (`Window`, `time`)
//! - result types returned by the analysis layer

pub mod time;
pub mod types;

pub use types::*;
