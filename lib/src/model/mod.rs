//! Regression models with compile-time training state.
//!
//! A model type carries its state as a phantom parameter:
//! - `Model<Unfitted>` holds hyperparameters only and exposes `fit`;
//! - `Model<Fitted>` holds learned parameters only and implements
//!   [`InferenceModel`].
//!
//! Calling `predict` on an untrained model is therefore a type error rather
//! than a runtime check.

use crate::error::PipelineError;
use crate::serialization::{load_params, save_params, SerializableParams};
use std::path::Path;

pub mod forest;
pub mod tree;

pub use forest::{ForestConfig, MaxFeatures, RandomForestRegressor, RandomForestParams};
pub use tree::{Node, RegressionTree, TreeParams};

/// A marker type indicating that a model is **not yet trained**.
///
/// Inference methods are not available until the model is converted to
/// [`Fitted`] by its `fit` method.
#[derive(Debug, Clone, Copy)]
pub struct Unfitted;

/// A marker type indicating that a model has been **fully trained**.
///
/// A `Fitted` model contains only inference parameters; hyperparameters
/// that matter only during training are dropped.
#[derive(Debug, Clone, Copy)]
pub struct Fitted;

/// Prediction and persistence for a trained model.
pub trait InferenceModel {
    type InputSingle: ?Sized;
    type OutputSingle;
    type InputBatch: ?Sized;
    type OutputBatch;
    /// Plain-data form of the learned parameters.
    type ParamsRepr: SerializableParams<Error = bincode::Error>;

    /// Predict on a single sample (feature vector).
    fn predict(&self, input: &Self::InputSingle) -> Result<Self::OutputSingle, PipelineError>;

    /// Predict on every row of a feature matrix.
    fn predict_batch(&self, input: &Self::InputBatch) -> Result<Self::OutputBatch, PipelineError>;

    fn extract_params(&self) -> Self::ParamsRepr;

    fn from_params(params: Self::ParamsRepr) -> Result<Self, PipelineError>
    where
        Self: Sized;

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        save_params(&self.extract_params(), path)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError>
    where
        Self: Sized,
    {
        Self::from_params(load_params(path)?)
    }
}
