//! Simple Imputer.
//!
//! Imputation transformer for completing missing values.
//! Supports mean, median, most_frequent, and constant strategies.
//!
//! Note: This implementation treats NaN as missing values. Statistics are
//! learned on the training split only and reused unchanged on every later
//! input, so test rows never influence their own fill values.
//!
//! # Example
//! ```ignore
//! use rental_insights::preprocessing::{FittedTransformer, ImputeStrategy, SimpleImputer, Transformer};
//!
//! let imputer = SimpleImputer::new(ImputeStrategy::Median);
//! let fitted = imputer.fit(&train_x)?;
//! let imputed = fitted.transform(&test_x)?;
//! ```

use crate::error::PipelineError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::stats::median;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Strategy for imputing missing values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace missing values with the mean of each column.
    Mean,
    /// Replace missing values with the median of each column.
    #[default]
    Median,
    /// Replace missing values with the most frequent value of each column.
    MostFrequent,
    /// Replace missing values with a constant value.
    Constant(f64),
}

/// Serializable parameters for a fitted SimpleImputer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputerParams {
    /// Strategy used for imputation.
    pub strategy: ImputeStrategy,
    /// Statistics (fill values) for each feature.
    pub statistics_: Vec<f64>,
    /// Number of features seen during fit.
    pub n_features: usize,
}

/// SimpleImputer transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
}

impl SimpleImputer {
    /// Create a new SimpleImputer with the specified strategy.
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }
}

/// Compute statistics for imputation, ignoring NaN values.
fn compute_statistics(data: &Array2<f64>, strategy: &ImputeStrategy) -> Vec<f64> {
    data.axis_iter(Axis(1))
        .map(|column| {
            let mut present: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();

            match strategy {
                ImputeStrategy::Constant(val) => *val,
                _ if present.is_empty() => 0.0, // Default to 0 if all values are missing
                ImputeStrategy::Mean => present.iter().sum::<f64>() / present.len() as f64,
                ImputeStrategy::Median => median(&mut present),
                ImputeStrategy::MostFrequent => {
                    // ties go to the smallest value so the result is deterministic
                    let mut counts = std::collections::BTreeMap::new();
                    for &v in &present {
                        *counts.entry(v.to_bits()).or_insert(0usize) += 1;
                    }
                    counts
                        .into_iter()
                        .map(|(bits, count)| (f64::from_bits(bits), count))
                        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.total_cmp(&a.0)))
                        .map(|(value, _)| value)
                        .unwrap_or(0.0)
                }
            }
        })
        .collect()
}

impl Transformer for SimpleImputer {
    type Params = SimpleImputerParams;
    type Fitted = FittedSimpleImputer;

    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, PipelineError> {
        if data.nrows() == 0 {
            return Err(PipelineError::insufficient("imputer input", 0, 1));
        }

        Ok(FittedSimpleImputer {
            strategy: self.strategy.clone(),
            statistics_: Array1::from(compute_statistics(data, &self.strategy)),
            n_features: data.ncols(),
        })
    }
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedSimpleImputer {
    strategy: ImputeStrategy,
    statistics_: Array1<f64>,
    n_features: usize,
}

impl FittedSimpleImputer {
    /// Get the imputation statistics (fill values) for each feature.
    pub fn statistics(&self) -> &Array1<f64> {
        &self.statistics_
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }
}

impl FittedTransformer for FittedSimpleImputer {
    type Params = SimpleImputerParams;

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        if data.ncols() != self.n_features {
            return Err(PipelineError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: data.ncols(),
            });
        }

        let mut result = data.clone();
        for (mut column, &fill) in result.axis_iter_mut(Axis(1)).zip(self.statistics_.iter()) {
            column.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        SimpleImputerParams {
            strategy: self.strategy.clone(),
            statistics_: self.statistics_.to_vec(),
            n_features: self.n_features,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PipelineError> {
        if params.statistics_.len() != params.n_features {
            return Err(PipelineError::FeatureMismatch {
                expected_features: params.n_features,
                got_features: params.statistics_.len(),
            });
        }
        Ok(Self {
            strategy: params.strategy,
            statistics_: Array1::from(params.statistics_),
            n_features: params.n_features,
        })
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }
}
