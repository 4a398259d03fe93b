//! PairLab CLI: ingest, plan, run and sample commands.
//!
//! Commands:
//! - `run` ingests raw CSVs, plans every task and runs the sweep
//! - `ingest` normalizes raw CSVs into the processed store only
//! - `plan` prints pair and task counts without running anything
//! - `sample` writes a synthetic raw CSV to try the pipeline

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pairlab_core::data::{ingest_dir, write_sample_csv, ProcessedStore};
use pairlab_core::registry::IndicatorRegistry;
use pairlab_runner::{
    build_tasks, default_workers, indicator_pairs, write_summary, BacktestExecutor,
    HtmlReportSink, PlanError, ProcessedSource, RunTally, Scheduler, SweepConfig,
};

#[derive(Parser)]
#[command(
    name = "pairlab",
    about = "PairLab: parameter sweeps over pairs of technical indicators"
)]
struct Cli {
    /// Sweep configuration (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest raw data, plan every task and run the sweep.
    Run {
        /// Worker threads. Overrides `[scheduler] workers`.
        #[arg(long)]
        workers: Option<usize>,

        /// Restrict the sweep to these instruments.
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Use the processed store as is.
        #[arg(long, default_value_t = false)]
        skip_ingest: bool,
    },
    /// Normalize raw CSV files into the processed store.
    Ingest,
    /// Print pair and task counts without running.
    Plan,
    /// Write a synthetic raw CSV into the raw data directory.
    Sample {
        /// Instrument name, also the file name.
        #[arg(long, default_value = "SAMPLE")]
        symbol: String,

        /// Number of daily bars.
        #[arg(long, default_value_t = 500)]
        bars: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = SweepConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("loading configuration from {}", path.display()),
        None => "building the default configuration".to_string(),
    })?;

    match cli.command {
        Commands::Run {
            workers,
            symbols,
            skip_ingest,
        } => run_sweep(&config, workers, &symbols, skip_ingest),
        Commands::Ingest => run_ingest(&config),
        Commands::Plan => run_plan(&config),
        Commands::Sample { symbol, bars } => run_sample(&config, &symbol, bars),
    }
}

fn run_ingest(config: &SweepConfig) -> Result<()> {
    let store = ProcessedStore::new(&config.paths.processed);
    let summary = ingest_dir(&config.paths.raw, &store).with_context(|| {
        format!("ingesting raw data from {}", config.paths.raw.display())
    })?;

    for (file, reason) in &summary.skipped {
        eprintln!("Skipped {}: {reason}", file.display());
    }
    println!(
        "Ingested {} file(s) into {} ({} skipped)",
        summary.written.len(),
        store.dir().display(),
        summary.skipped.len()
    );
    Ok(())
}

/// Instruments in the processed store, narrowed to `only` when given.
fn discover_instruments(store: &ProcessedStore, only: &[String]) -> Result<Vec<String>> {
    let mut symbols = store
        .list_symbols()
        .with_context(|| format!("listing processed data in {}", store.dir().display()))?;
    if !only.is_empty() {
        for wanted in only {
            if !symbols.contains(wanted) {
                warn!(symbol = %wanted, "requested instrument has no processed data");
            }
        }
        symbols.retain(|s| only.contains(s));
    }
    Ok(symbols)
}

fn warn_unknown_indicators(config: &SweepConfig, registry: &IndicatorRegistry) {
    for name in config.unknown_indicators(registry) {
        warn!(indicator = name, "not registered; its tasks will fail");
    }
}

fn run_plan(config: &SweepConfig) -> Result<()> {
    let registry = IndicatorRegistry::standard();
    warn_unknown_indicators(config, &registry);

    let store = ProcessedStore::new(&config.paths.processed);
    let instruments = discover_instruments(&store, &[])?;
    let pairs = indicator_pairs(&config.indicators);
    println!("Indicators: {}", config.indicators.len());
    println!("Indicator pairs: {}", pairs.len());
    println!("Instruments: {}", instruments.len());

    // Per-instrument count is independent of which instruments exist.
    let probe = [String::from("*")];
    match build_tasks(&probe, &config.indicators, &config.grid) {
        Ok(tasks) => {
            println!("Tasks per instrument: {}", tasks.len());
            println!("Total tasks: {}", tasks.len() * instruments.len());
        }
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn run_sample(config: &SweepConfig, symbol: &str, bars: usize) -> Result<()> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 2).context("sample start date")?;
    let path = write_sample_csv(&config.paths.raw, symbol, start, bars)
        .with_context(|| format!("writing sample data for {symbol}"))?;
    println!("Wrote {bars} bars to {}", path.display());
    Ok(())
}

fn run_sweep(
    config: &SweepConfig,
    workers: Option<usize>,
    only: &[String],
    skip_ingest: bool,
) -> Result<()> {
    if !skip_ingest {
        run_ingest(config)?;
    }

    let registry = IndicatorRegistry::standard();
    warn_unknown_indicators(config, &registry);

    let store = ProcessedStore::new(&config.paths.processed);
    let instruments = discover_instruments(&store, only)?;
    if instruments.is_empty() {
        println!(
            "No processed data found in {}. Add CSV files to {} (or run `pairlab sample`) and try again.",
            store.dir().display(),
            config.paths.raw.display()
        );
        return Ok(());
    }

    let tasks = match build_tasks(&instruments, &config.indicators, &config.grid) {
        Ok(tasks) => tasks,
        Err(e @ PlanError::NoTasks { .. }) => {
            println!("Nothing to run: {e}");
            return Ok(());
        }
    };
    println!("Total tasks to run: {}", tasks.len());

    let workers = workers
        .or(config.scheduler.workers)
        .unwrap_or_else(default_workers);
    let scheduler = Scheduler::new(workers).context("building the worker pool")?;

    let source = ProcessedSource::cached(store);
    let sink = HtmlReportSink::new(&config.paths.reports);
    let executor = BacktestExecutor::new(&registry, &source, config.simulation()).with_sink(&sink);

    let results = scheduler.run(&tasks, &executor, |progress, result| {
        println!(
            "Progress: {}/{} -> {result}",
            progress.completed, progress.total
        );
    });

    let (csv_path, json_path) = write_summary(&config.paths.reports, &results)
        .context("writing the run summary")?;
    let tally = RunTally::from_results(&results);
    info!(
        completed = tally.completed,
        skipped = tally.skipped,
        errored = tally.errored,
        "sweep finished"
    );
    println!(
        "Done: {} completed, {} skipped, {} errored",
        tally.completed, tally.skipped, tally.errored
    );
    println!("Summary: {} / {}", csv_path.display(), json_path.display());
    Ok(())
}
