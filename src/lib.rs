//! `carbon-insight` library crate.
//!
//! The binary (`carbon`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the HTTP server and the CLI share one query layer

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod preferences;
pub mod prompt;
pub mod report;
pub mod server;
