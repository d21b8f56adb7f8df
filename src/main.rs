//! CLI entry point for the fuel price pass-through analysis.
//!
//! Provides subcommands for the long-run levels regression of retail prices
//! on the benchmark, and for the daily averaged price series.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fuel_pass_through::{
    analyzers::types::MissingPolicy,
    config::PipelineConfig,
    output::{format_equation, print_json, regression_chart, write_chart_csv, write_daily_panel},
    pipeline::{load_daily_panel, run_regression},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fuel_pass_through")]
#[command(about = "Daily fuel price panels and benchmark pass-through regressions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RunArgs {
    /// JSON run configuration (paths, column names, missing-value policy)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Station-level panel to read (Parquet, CSV, or .csv.gz)
    #[arg(short, long, value_name = "FILE")]
    dataset: Option<PathBuf>,

    /// Chart data file to write
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Missing-value policy: drop-incomplete or drop-null-means
    #[arg(short, long)]
    policy: Option<MissingPolicy>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the levels regression of each retail series on the benchmark
    Regress {
        #[command(flatten)]
        run: RunArgs,

        /// Also log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the daily averaged retail and benchmark series
    Daily {
        #[command(flatten)]
        run: RunArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/fuel_pass_through.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fuel_pass_through.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter(std::env::var("RUST_LOG").ok().as_deref(), "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter(std::env::var("RUST_LOG_JSON").ok().as_deref(), "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Regress { run, json } => {
            let config = resolve_config(&run)?;
            let report = run_regression(&config).context("pass-through regression failed")?;

            println!("\nRegression equations (levels):");
            for fit in &report.fits {
                println!("{}", format_equation(fit, &report.benchmark.label));
            }

            if json {
                print_json(&report).context("present stage failed")?;
            }

            let chart = regression_chart(&report, config.line_samples)
                .context("present stage failed building chart data")?;
            write_chart_csv(&config.output_path, &chart).with_context(|| {
                format!("present stage failed writing {}", config.output_path.display())
            })?;
        }
        Commands::Daily { run } => {
            let config = resolve_config(&run)?;
            let panel = load_daily_panel(&config).context("daily aggregation failed")?;

            write_daily_panel(&config.output_path, &panel).with_context(|| {
                format!("present stage failed writing {}", config.output_path.display())
            })?;
        }
    }

    Ok(())
}

/// Filter from the given directives, or `default` when they are unset, empty
/// or unparsable.
fn env_filter(directives: Option<&str>, default: &str) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Builds the run configuration: JSON file (or defaults), then CLI overrides.
fn resolve_config(run: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &run.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(dataset) = &run.dataset {
        config.dataset_path = dataset.clone();
    }
    if let Some(output) = &run.output {
        config.output_path = output.clone();
    }
    if let Some(policy) = run.policy {
        config.missing_policy = policy;
    }

    info!(
        dataset = %config.dataset_path.display(),
        output = %config.output_path.display(),
        policy = %config.missing_policy,
        "Run configuration resolved"
    );
    Ok(config)
}
