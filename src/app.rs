//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads settings
//! - installs the tracing subscriber
//! - runs the requested query or the HTTP server
//! - prints reports and writes optional exports

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Cli, Command, ForecastArgs, GenerateArgs, RangeArgs, ServeArgs};
use crate::config::Settings;
use crate::data::{SampleConfig, SeriesStore, generate_series};
use crate::domain::{SeriesId, Statistic};
use crate::error::AppError;
use crate::prompt::{OllamaInterpreter, PromptService};

pub mod pipeline;

use pipeline::CarbonService;

const DEFAULT_LOG_FILTER: &str = "carbon_insight=info,tower_http=info";

/// Entry point for the `carbon` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing();

    let mut settings = Settings::from_env()?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }

    match cli.command {
        Command::Serve(args) => handle_serve(settings, args),
        Command::Stats(args) => handle_stats(&settings, args),
        Command::Max(args) => handle_statistic(&settings, args, Statistic::Max),
        Command::Min(args) => handle_statistic(&settings, args, Statistic::Min),
        Command::Average(args) => handle_statistic(&settings, args, Statistic::Average),
        Command::Variance(args) => handle_statistic(&settings, args, Statistic::Variance),
        Command::Predict(args) => {
            let prediction = service(&settings).predict_least_carbon(&args.ts_id)?;
            println!("{}", crate::report::format_seasonal(&args.ts_id, &prediction));
            Ok(())
        }
        Command::Forecast(args) => handle_forecast(&settings, args),
        Command::Ask(args) => {
            let interpreter = Arc::new(OllamaInterpreter::from_settings(&settings));
            let prompts = PromptService::new(interpreter, service(&settings), &settings.default_series);
            println!("{}", prompts.answer(&args.prompt.join(" "))?);
            Ok(())
        }
        Command::Generate(args) => handle_generate(&settings, args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    // Logs go to stderr so command output stays pipeable.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn service(settings: &Settings) -> CarbonService {
    CarbonService::new(SeriesStore::new(&settings.data_dir))
}

fn handle_serve(mut settings: Settings, args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Io(format!("Failed to start async runtime: {e}")))?;
    runtime.block_on(crate::server::serve(&settings))
}

fn handle_statistic(settings: &Settings, args: RangeArgs, stat: Statistic) -> Result<(), AppError> {
    let value = service(settings).statistic(&args.series.ts_id, stat, &args.start, &args.end)?;
    println!(
        "{}",
        crate::report::format_statistic(&args.series.ts_id, stat, &args.start, &args.end, value)
    );
    Ok(())
}

fn handle_stats(settings: &Settings, args: RangeArgs) -> Result<(), AppError> {
    let summary = service(settings).summary(&args.series.ts_id, &args.start, &args.end)?;
    print!(
        "{}",
        crate::report::format_summary(&args.series.ts_id, &args.start, &args.end, &summary)
    );
    Ok(())
}

fn handle_forecast(settings: &Settings, args: ForecastArgs) -> Result<(), AppError> {
    let ts_id = &args.series.ts_id;
    let forecast = service(settings).predict_advanced(ts_id, &args.start, &args.end)?;
    print!("{}", crate::report::format_forecast(ts_id, &forecast));

    if let Some(path) = &args.export {
        crate::io::write_forecast_json(path, ts_id, &args.start, &args.end, &forecast)?;
    }
    Ok(())
}

fn handle_generate(settings: &Settings, args: GenerateArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        start: args.start,
        years: args.years,
        step_hours: args.step_hours,
        seed: args.seed,
        ..SampleConfig::default()
    };
    let records = generate_series(&config)?;

    let path = match args.out {
        Some(path) => path,
        None => SeriesStore::new(&settings.data_dir).path_for(&SeriesId::parse(&args.ts_id)?),
    };
    crate::io::write_series_file(&path, &records)?;
    println!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
