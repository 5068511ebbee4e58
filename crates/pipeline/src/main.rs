//! botbid CLI
//!
//! Runs the bot-detection batch job over a directory of Kaggle-style CSV files.

use anyhow::{Context, Result};
use botbid_pipeline::{run, PipelineConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "botbid")]
#[command(author = "botbid Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Score auction bidders as human or robot from their bid logs", long_about = None)]
struct Args {
    /// TOML configuration file; missing keys keep the canonical defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding bids.csv, train.csv, test.csv and sampleSubmission.csv
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("botbid v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    config.validate().context("Invalid configuration")?;

    let report = run(&config).context("Pipeline run failed")?;

    info!("✓ Run completed");
    info!("  Train actors: {}", report.train_rows);
    info!("  Test actors: {}", report.test_rows);
    info!(
        "  Columns: {} selected of {}",
        report.selected_columns, report.feature_columns
    );
    if let Some(auc) = report.train_auc {
        info!("  In-sample AUC: {:.6}", auc);
    }
    info!("  Submission: {} ({})", report.output.display(), report.digest);

    Ok(())
}
