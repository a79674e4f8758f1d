//! Modeling stage: Random Forest rent model over clean listings.
//!
//! # Flow
//!
//! 1. Build the fixed feature matrix ([`FEATURE_NAMES`]) and price target.
//! 2. Split rows into train and test with a seeded shuffle.
//! 3. Fit a median [`SimpleImputer`] on the training rows; unknown square
//!    footage in both splits is filled with the training median.
//! 4. Fit a [`RandomForestRegressor`] on the training rows.
//! 5. Predict the test rows and report importances, a prediction sample and
//!    regression metrics.
//!
//! Everything is a pure function of the input listings and the
//! [`ModelingConfig`]; identical input and seeds give identical output.

pub mod report;

pub use report::{FeatureImportance, FeatureImportanceReport, Prediction, PredictionSample};

use crate::config::ModelingConfig;
use crate::dataset::features::SQUARE_FOOTAGE;
use crate::dataset::{CleanListing, ListingDataset, FEATURE_NAMES};
use crate::error::PipelineError;
use crate::metrics::{Metrics, RegressionMetrics};
use crate::model::{Fitted, InferenceModel, RandomForestParams, RandomForestRegressor};
use crate::preprocessing::{
    FittedSimpleImputer, FittedTransformer, SimpleImputer, SimpleImputerParams, Transformer,
};
use crate::serialization::{load_params, save_params};
use crate::split::train_test_split;
use crate::summary::PriceSummary;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Serializable form of a [`TrainedModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModelParams {
    pub feature_names: Vec<String>,
    pub imputer: SimpleImputerParams,
    pub forest: RandomForestParams,
}

/// Fitted imputer and forest over the fixed feature list.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    feature_names: Vec<String>,
    imputer: FittedSimpleImputer,
    forest: RandomForestRegressor<Fitted>,
}

impl TrainedModel {
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn imputer(&self) -> &FittedSimpleImputer {
        &self.imputer
    }

    pub fn forest(&self) -> &RandomForestRegressor<Fitted> {
        &self.forest
    }

    /// Training median used for unknown square footage.
    pub fn square_footage_fill(&self) -> f64 {
        self.imputer.statistics()[SQUARE_FOOTAGE]
    }

    /// Predict prices for a raw (unimputed) feature matrix.
    pub fn predict_features(&self, x: &Array2<f64>) -> Result<Vec<f64>, PipelineError> {
        let filled = self.imputer.transform(x)?;
        Ok(self.forest.predict_batch(&filled)?.to_vec())
    }

    pub fn predict_listings(&self, listings: &[CleanListing]) -> Result<Vec<f64>, PipelineError> {
        let dataset = ListingDataset::from_listings(listings);
        self.predict_features(dataset.features())
    }

    pub fn predict_listing(&self, listing: &CleanListing) -> Result<f64, PipelineError> {
        let predictions = self.predict_listings(std::slice::from_ref(listing))?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| PipelineError::insufficient("prediction input", 0, 1))
    }

    pub fn extract_params(&self) -> TrainedModelParams {
        TrainedModelParams {
            feature_names: self.feature_names.clone(),
            imputer: self.imputer.extract_params(),
            forest: self.forest.extract_params(),
        }
    }

    pub fn from_params(params: TrainedModelParams) -> Result<Self, PipelineError> {
        if params.feature_names.len() != params.forest.n_features {
            return Err(PipelineError::FeatureMismatch {
                expected_features: params.feature_names.len(),
                got_features: params.forest.n_features,
            });
        }
        let imputer = FittedSimpleImputer::from_params(params.imputer)?;
        if imputer.n_features_in() != params.feature_names.len() {
            return Err(PipelineError::FeatureMismatch {
                expected_features: params.feature_names.len(),
                got_features: imputer.n_features_in(),
            });
        }
        Ok(Self {
            feature_names: params.feature_names,
            imputer,
            forest: RandomForestRegressor::<Fitted>::from_params(params.forest)?,
        })
    }

    /// Save the model as bincode.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        save_params(&self.extract_params(), path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        Self::from_params(load_params(path)?)
    }
}

/// Listing identifiers on each side of the train/test split.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitMembership {
    pub train: Vec<String>,
    pub test: Vec<String>,
}

/// Everything the modeling stage produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub model: TrainedModel,
    pub importances: FeatureImportanceReport,
    pub predictions: PredictionSample,
    pub metrics: RegressionMetrics,
    pub split: SplitMembership,
    pub summary: PriceSummary,
}

/// Fit the rent model on `listings` and evaluate it on a held-out split.
///
/// # Errors
/// - [`PipelineError::InvalidParameter`] if `config` is invalid
/// - [`PipelineError::InsufficientData`] if `listings` is empty or the
///   training split has fewer than `min_training_rows` rows
pub fn analyze(
    listings: &[CleanListing],
    config: &ModelingConfig,
) -> Result<AnalysisOutput, PipelineError> {
    config.validate()?;
    if listings.is_empty() {
        return Err(PipelineError::insufficient(
            "clean listings",
            0,
            config.min_training_rows,
        ));
    }

    let dataset = ListingDataset::from_listings(listings);
    let indices = train_test_split(dataset.len(), config.test_fraction, config.seed)?;
    if indices.train.len() < config.min_training_rows {
        return Err(PipelineError::insufficient(
            "training split",
            indices.train.len(),
            config.min_training_rows,
        ));
    }
    let train = dataset.select(&indices.train);
    let test = dataset.select(&indices.test);
    info!(
        rows = dataset.len(),
        train = train.len(),
        test = test.len(),
        "split listings"
    );

    if train.features().column(SQUARE_FOOTAGE).iter().all(|v| v.is_nan()) {
        warn!(strategy = ?config.imputation, "square footage unknown for every training row");
    }
    let imputer = SimpleImputer::new(config.imputation.clone()).fit(train.features())?;
    let x_train = imputer.transform(train.features())?;
    let x_test = imputer.transform(test.features())?;

    let forest = RandomForestRegressor::new(config.forest.clone()).fit(&x_train, train.target())?;
    let predicted = forest.predict_batch(&x_test)?.to_vec();
    let actual = test.target().to_vec();

    let metrics = Metrics::calculate_all(&actual, &predicted)?;
    info!(
        mae = metrics.mae,
        rmse = metrics.rmse,
        r_squared = metrics.r_squared,
        n_test = metrics.n_samples,
        "random forest evaluated"
    );

    let importances = FeatureImportanceReport::new(&FEATURE_NAMES, forest.feature_importances())?;
    let predictions = PredictionSample::new(
        test.ids(),
        &actual,
        &predicted,
        config.prediction_sample_size,
    )?;

    Ok(AnalysisOutput {
        model: TrainedModel {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            imputer,
            forest,
        },
        importances,
        predictions,
        metrics,
        split: SplitMembership {
            train: train.ids().to_vec(),
            test: test.ids().to_vec(),
        },
        summary: PriceSummary::from_listings(listings),
    })
}
