//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; ready for inference and serialization.

use crate::error::PipelineError;
use crate::serialization::{load_params, save_params, SerializableParams};
use ndarray::Array2;

/// Trait for unfitted transformers with hyperparameters.
///
/// A transformer learns parameters from training data and can then transform
/// new data using those learned parameters. This trait represents the
/// configurable, unfitted state.
///
/// # Example
/// ```ignore
/// use rental_insights::preprocessing::{ImputeStrategy, SimpleImputer, Transformer};
///
/// let imputer = SimpleImputer::new(ImputeStrategy::Median);
/// let fitted = imputer.fit(&train_x)?;
/// let filled = fitted.transform(&test_x)?;
/// ```
pub trait Transformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams<Error = bincode::Error>;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`PipelineError`] if the data is empty or otherwise unusable.
    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, PipelineError>;

    /// Fit the transformer and transform the data in one step.
    fn fit_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `save_to_file` / `load_from_file` are cross-platform compatible.
pub trait FittedTransformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams<Error = bincode::Error>;

    /// Transform data using learned parameters.
    ///
    /// # Errors
    /// [`PipelineError::FeatureMismatch`] if the column count differs from fit.
    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PipelineError>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self, PipelineError>
    where
        Self: Sized;

    /// Returns the number of features seen during fit.
    fn n_features_in(&self) -> usize;

    /// Save the fitted transformer to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), PipelineError> {
        save_params(&self.extract_params(), path)
    }

    /// Load a fitted transformer from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, PipelineError>
    where
        Self: Sized,
    {
        Self::from_params(load_params(path)?)
    }
}
