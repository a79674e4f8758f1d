//! `rentals`: clean scraped listings and fit the rent model.
//!
//! ```text
//! rentals clean   --input raw.csv   --output clean.csv  [--config cfg.json] [--max-age-days N]
//! rentals analyze --input clean.csv --output-dir out/   [--config cfg.json] [--model-out model.bin]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use rental_insights::config::PipelineConfig;
use rental_insights::pipeline::{run_analyze, run_clean};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rentals")]
#[command(about = "Rental listing cleaning and rent modeling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and enrich a raw scraped CSV
    Clean {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Drop postings older than this many days (relative to today)
        #[arg(long)]
        max_age_days: Option<u32>,
    },

    /// Fit and evaluate the rent model on a clean CSV
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output_dir: PathBuf,
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Save the trained model (bincode)
        #[arg(long)]
        model_out: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            input,
            output,
            config,
            max_age_days,
        } => {
            let mut config = load_config(config.as_deref())?.cleaning;
            if let Some(days) = max_age_days {
                config = config.with_recency(days, Local::now().date_naive());
            } else if config.max_age_days.is_some() && config.as_of.is_none() {
                config.as_of = Some(Local::now().date_naive());
            }

            let report = run_clean(&input, &output, &config).context("Cleaning failed")?;
            println!("{}", report);
        }
        Commands::Analyze {
            input,
            output_dir,
            config,
            model_out,
        } => {
            let config = load_config(config.as_deref())?.modeling;
            let (output, files) = run_analyze(&input, &output_dir, &config, model_out.as_deref())
                .context("Analysis failed")?;

            println!(
                "MAE: {:.2}  RMSE: {:.2}  R²: {:.3}  (train {}, test {})",
                output.metrics.mae,
                output.metrics.rmse,
                output.metrics.r_squared,
                output.split.train.len(),
                output.split.test.len()
            );
            if let Some(area) = output.summary.cheapest_area() {
                println!("Cheapest area: {} (median ${:.0})", area.area, area.median_price);
            }
            if let Some(area) = output.summary.most_expensive_area() {
                println!(
                    "Most expensive area: {} (median ${:.0})",
                    area.area, area.median_price
                );
            }
            println!("Reports written to {}", output_dir.display());
            if let Some(model) = files.model {
                println!("Model saved to {}", model.display());
            }
        }
    }

    Ok(())
}
