//! Series data access.
//!
//! - JSON series files (`loader`)
//! - synthetic series for demos and tests (`sample`)

pub mod loader;
pub mod sample;

pub use loader::{SeriesStore, parse_series};
pub use sample::{SampleConfig, generate_series};
