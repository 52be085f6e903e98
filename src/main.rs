//! Command-line entry point for the Elo Ledger
//!
//! Reads a JSON array of normalized match records, replays them through a
//! rating ledger, prints the Brier score and standings, and optionally writes
//! the evaluation table as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use elo_ledger::config::AppConfig;
use elo_ledger::rating::ProbabilityEstimator;
use elo_ledger::types::{filter_category, MatchRecord};
use elo_ledger::RatingLedger;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing::{error, info};

/// Elo Ledger - replay match history and evaluate rating predictions
#[derive(Parser)]
#[command(
    name = "elo-ledger",
    version,
    about = "Replay singles and doubles match results through a logistic rating model",
    long_about = "Elo Ledger replays chronologically ordered match results, maintains a rating \
                 per competitor, rates doubles pairs as a combined team, and reports the Brier \
                 score of its pre-match predictions."
)]
struct Args {
    /// Match records (JSON array), sorted by match time
    #[arg(short, long, value_name = "FILE")]
    matches: PathBuf,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Only replay these event categories (repeatable)
    #[arg(long, value_name = "CATEGORY")]
    category: Vec<String>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Scale rating changes by the margin of victory
    #[arg(long)]
    margin_of_victory: bool,

    /// Auto-correlation scale override, typically 1500-2500
    #[arg(long, value_name = "SCALE")]
    autocorr_scale: Option<f64>,

    /// Minimum number of prior matches before a prediction is scored
    #[arg(long, value_name = "MATCHES")]
    cold_start_threshold: Option<usize>,

    /// Prediction estimator (logistic, normal_overlap)
    #[arg(long, value_name = "NAME")]
    estimator: Option<ProbabilityEstimator>,

    /// Write the evaluation table to this file as JSON
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of competitors to print in the standings
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Enable debug mode with verbose logging
    #[arg(short, long)]
    debug: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if args.margin_of_victory {
        config.replay.margin_of_victory = true;
    }

    if let Some(scale) = args.autocorr_scale {
        config.replay.autocorr_scale = Some(scale);
    }

    if let Some(threshold) = args.cold_start_threshold {
        config.replay.cold_start_threshold = threshold;
    }

    if let Some(estimator) = args.estimator {
        config.replay.estimator = estimator;
    }

    elo_ledger::config::validate_config(&config)?;
    Ok(config)
}

fn load_matches(args: &Args) -> Result<Vec<MatchRecord>> {
    let file = File::open(&args.matches)
        .with_context(|| format!("Failed to open {}", args.matches.display()))?;
    let matches: Vec<MatchRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", args.matches.display()))?;

    if args.category.is_empty() {
        Ok(matches)
    } else {
        Ok(filter_category(matches, &args.category))
    }
}

fn run(args: &Args, config: AppConfig) -> Result<()> {
    let matches = load_matches(args)?;
    info!(matches = matches.len(), "Loaded match records");

    let mut ledger = RatingLedger::new(config.rating, config.replay)?;
    let summary = ledger.replay(&matches)?;

    if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), ledger.evaluation())?;
        info!("Evaluation table written to {}", path.display());
    }

    println!(
        "Matches: {} processed, {} skipped, {} scored",
        summary.processed, summary.failed, summary.scored
    );
    match ledger.brier_score() {
        Ok(score) => println!("Brier score: {:.4}", score),
        Err(e) => println!("Brier score: unavailable ({})", e),
    }

    println!("Top {}:", args.top);
    for (rank, competitor) in ledger.standings().iter().take(args.top).enumerate() {
        println!(
            "  {:>3}. {:<30} {:>8.1}  ({} matches)",
            rank + 1,
            competitor.name(),
            competitor.rating(),
            competitor.matches_played()
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(
        service = %config.service.name,
        estimator = %config.replay.estimator,
        margin_of_victory = config.replay.margin_of_victory,
        cold_start_threshold = config.replay.cold_start_threshold,
        "Starting replay"
    );

    if let Err(e) = run(&args, config) {
        error!("Replay failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}
