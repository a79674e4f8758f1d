//! File-based wrappers around the two stages.
//!
//! These are what the `rentals` binary calls: read the input file, run the
//! in-memory stage, write every output file. All outputs of a stage are
//! computed before the first file is written.

use crate::cleaning::{clean_listings, CleaningReport};
use crate::config::{CleaningConfig, ModelingConfig};
use crate::dataset::{
    read_clean_listings_from_path, read_raw_listings_from_path, write_clean_listings_to_path,
};
use crate::error::PipelineError;
use crate::metrics::RegressionMetrics;
use crate::modeling::{analyze, AnalysisOutput};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const IMPORTANCES_FILE: &str = "random_forest_importances.csv";
pub const PREDICTIONS_FILE: &str = "rf_predictions_sample.csv";
pub const SUMMARY_FILE: &str = "rental_summary.csv";
pub const METRICS_FILE: &str = "metrics.json";

/// Contents of `metrics.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsFile {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub n_train: usize,
    pub n_test: usize,
}

impl MetricsFile {
    pub fn new(metrics: &RegressionMetrics, n_train: usize) -> Self {
        Self {
            mae: metrics.mae,
            mse: metrics.mse,
            rmse: metrics.rmse,
            r_squared: metrics.r_squared,
            n_train,
            n_test: metrics.n_samples,
        }
    }
}

/// Paths written by [`run_analyze`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFiles {
    pub importances: PathBuf,
    pub predictions: PathBuf,
    pub summary: PathBuf,
    pub metrics: PathBuf,
    pub model: Option<PathBuf>,
}

impl AnalysisFiles {
    fn in_dir(dir: &Path, model: Option<&Path>) -> Self {
        Self {
            importances: dir.join(IMPORTANCES_FILE),
            predictions: dir.join(PREDICTIONS_FILE),
            summary: dir.join(SUMMARY_FILE),
            metrics: dir.join(METRICS_FILE),
            model: model.map(Path::to_path_buf),
        }
    }
}

/// Clean the raw CSV at `input` and write the clean CSV to `output`.
pub fn run_clean(
    input: &Path,
    output: &Path,
    config: &CleaningConfig,
) -> Result<CleaningReport, PipelineError> {
    let raw = read_raw_listings_from_path(input)?;
    info!(rows = raw.len(), input = %input.display(), "raw listings loaded");

    let cleaned = clean_listings(&raw, config)?;
    write_clean_listings_to_path(output, &cleaned.listings)?;
    info!(rows = cleaned.listings.len(), output = %output.display(), "clean listings written");
    Ok(cleaned.report)
}

/// Fit and evaluate the rent model on the clean CSV at `input`, writing
/// reports into `out_dir` (created if missing) and optionally the model.
pub fn run_analyze(
    input: &Path,
    out_dir: &Path,
    config: &ModelingConfig,
    model_out: Option<&Path>,
) -> Result<(AnalysisOutput, AnalysisFiles), PipelineError> {
    let listings = read_clean_listings_from_path(input)?;
    info!(rows = listings.len(), input = %input.display(), "clean listings loaded");

    let output = analyze(&listings, config)?;

    fs::create_dir_all(out_dir).map_err(|e| {
        PipelineError::Io(format!("cannot create {}: {}", out_dir.display(), e))
    })?;
    let files = AnalysisFiles::in_dir(out_dir, model_out);

    output.importances.write_to_path(&files.importances)?;
    output.predictions.write_to_path(&files.predictions)?;
    output.summary.write_to_path(&files.summary)?;

    let metrics = MetricsFile::new(&output.metrics, output.split.train.len());
    let json = serde_json::to_string_pretty(&metrics)?;
    fs::write(&files.metrics, json).map_err(|e| {
        PipelineError::Io(format!("cannot write {}: {}", files.metrics.display(), e))
    })?;

    if let Some(path) = &files.model {
        output.model.save_to_file(path)?;
        info!(path = %path.display(), "model saved");
    }
    info!(out_dir = %out_dir.display(), "analysis reports written");
    Ok((output, files))
}
