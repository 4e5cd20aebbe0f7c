//! Command-line parsing for the carbon-intensity service.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! query and modeling code. Dispatch lives in `app`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "carbon", version, about = "Carbon-intensity statistics and forecasting")]
pub struct Cli {
    /// Directory holding `<series>.json` files (overrides CARBON_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print max, min, average and variance for a window.
    Stats(RangeArgs),
    /// Maximum intensity in `[start, end)`.
    Max(RangeArgs),
    /// Minimum intensity in `[start, end)`.
    Min(RangeArgs),
    /// Mean intensity in `[start, end)`.
    Average(RangeArgs),
    /// Sample variance in `[start, end)`.
    Variance(RangeArgs),
    /// Lowest month next year from historical monthly averages.
    Predict(SeriesArgs),
    /// Lowest month of a SARIMA forecast over a date range.
    Forecast(ForecastArgs),
    /// Answer a natural-language question through the language model.
    Ask(AskArgs),
    /// Write a synthetic hourly series file.
    Generate(GenerateArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Bind host (overrides HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides PORT).
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// Series identifier (file stem inside the data directory).
    #[arg(short = 's', long = "series", default_value = crate::config::DEFAULT_SERIES)]
    pub ts_id: String,
}

#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Inclusive window start (ISO-8601).
    #[arg(long)]
    pub start: String,

    /// Exclusive window end (ISO-8601).
    #[arg(long)]
    pub end: String,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// First day of the forecast range (ISO-8601).
    #[arg(long)]
    pub start: String,

    /// Last day of the forecast range (ISO-8601).
    #[arg(long)]
    pub end: String,

    /// Write the labelled forecast to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// The question, e.g. "What was the highest intensity in April 2022?"
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Series identifier to write inside the data directory.
    #[arg(short = 's', long = "series", default_value = crate::config::DEFAULT_SERIES)]
    pub ts_id: String,

    /// Write to this path instead of the data directory.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,

    /// First day of the series.
    #[arg(long, default_value = "2019-01-01")]
    pub start: NaiveDate,

    /// Number of years to generate.
    #[arg(long, default_value_t = 4)]
    pub years: u32,

    /// Hours between readings.
    #[arg(long, default_value_t = 1)]
    pub step_hours: u32,

    /// Random seed for reproducibility.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_range_queries() {
        let cli = Cli::parse_from([
            "carbon",
            "--data-dir",
            "/tmp/d",
            "max",
            "--series",
            "grid",
            "--start",
            "2019-12-01",
            "--end",
            "2019-12-02",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        let Command::Max(args) = cli.command else {
            panic!("expected max");
        };
        assert_eq!(args.series.ts_id, "grid");
        assert_eq!(args.end, "2019-12-02");
    }

    #[test]
    fn ask_joins_words_and_generate_has_defaults() {
        let cli = Cli::parse_from(["carbon", "ask", "average", "in", "2021"]);
        let Command::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.prompt.join(" "), "average in 2021");

        let cli = Cli::parse_from(["carbon", "generate"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.ts_id, "caiso_carbon_intensity");
        assert_eq!(args.years, 4);
    }
}
