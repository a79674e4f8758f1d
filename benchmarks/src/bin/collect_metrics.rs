//! Collect timings and model quality for the full pipeline.
//!
//! For each dataset size this runs the cleaning and modeling stages once on
//! seeded synthetic listings and records:
//! - cleaning and modeling time
//! - rows kept and dropped
//! - MAE, RMSE and R² on the held-out split

use benchmarks::{raw_listings, Timer};
use rental_insights::cleaning::clean_listings;
use rental_insights::config::PipelineConfig;
use rental_insights::model::ForestConfig;
use rental_insights::modeling::analyze;
use rental_insights::PipelineError;
use serde_json::json;
use std::fs;
use std::path::Path;

const OUTPUT: &str = "benchmarks/results/rust_metrics.json";

fn collect_metrics(n_rows: usize, n_trees: usize) -> Result<serde_json::Value, PipelineError> {
    let mut config = PipelineConfig::default();
    config.modeling = config
        .modeling
        .with_forest(ForestConfig::default().with_n_trees(n_trees));
    let raw = raw_listings(n_rows, 42);

    let mut clean_timer = Timer::new();
    clean_timer.start();
    let cleaned = clean_listings(&raw, &config.cleaning)?;
    clean_timer.stop();

    let mut model_timer = Timer::new();
    model_timer.start();
    let analysis = analyze(&cleaned.listings, &config.modeling)?;
    model_timer.stop();

    Ok(json!({
        "raw_rows": n_rows,
        "kept": cleaned.report.kept,
        "duplicates": cleaned.report.duplicates,
        "dropped": cleaned.report.dropped_total(),
        "n_trees": n_trees,
        "clean_time_ms": clean_timer.total_ms(),
        "model_time_ms": model_timer.total_ms(),
        "mae": analysis.metrics.mae,
        "rmse": analysis.metrics.rmse,
        "r2": analysis.metrics.r_squared,
        "top_feature": analysis.importances.entries.first().map(|e| e.feature_name.clone()),
    }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut results = Vec::new();

    for n_rows in [500, 2000, 5000] {
        println!("Collecting metrics for {} rows...", n_rows);
        results.push(collect_metrics(n_rows, 100)?);
    }

    let output = json!({ "results": results });

    if let Some(dir) = Path::new(OUTPUT).parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(OUTPUT, serde_json::to_string_pretty(&output)?)?;

    println!("\nMetrics collected and saved to {}", OUTPUT);
    Ok(())
}
