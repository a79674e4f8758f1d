//! Random Forest regressor.
//!
//! An ensemble of [`RegressionTree`]s, each grown on a bootstrap sample of
//! the training rows with a random subset of features considered at every
//! split. The forest predicts the mean of its trees' predictions.
//!
//! Training is fully determined by [`ForestConfig::seed`]: the forest seed
//! drives a generator that hands every tree its own seed, so two fits on the
//! same data produce identical trees, predictions and importances.
//!
//! # Example
//! ```ignore
//! use rental_insights::model::{ForestConfig, InferenceModel, RandomForestRegressor};
//!
//! let forest = RandomForestRegressor::new(ForestConfig::default().with_n_trees(100))
//!     .fit(&x_train, &y_train)?;
//! let predictions = forest.predict_batch(&x_test)?;
//! ```

use crate::error::PipelineError;
use crate::model::tree::{RegressionTree, TreeParams};
use crate::model::{Fitted, InferenceModel, Unfitted};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::debug;

/// Number of features examined at each split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum MaxFeatures {
    /// Every feature (the usual choice for regression forests).
    #[default]
    All,
    Sqrt,
    Log2,
    /// Fraction of the feature count, in `(0, 1]`.
    Fraction(f64),
    Count(usize),
}

impl MaxFeatures {
    /// Resolve to a count in `1..=n_features`.
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match *self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => n.log2().floor() as usize,
            MaxFeatures::Fraction(f) => (f * n).floor() as usize,
            MaxFeatures::Count(c) => c,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Hyperparameters of a [`RandomForestRegressor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// `None` grows every tree until its leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.n_trees == 0 {
            return Err(PipelineError::InvalidParameter(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(PipelineError::InvalidParameter(format!(
                "min_samples_split must be at least 2, got {}",
                self.min_samples_split
            )));
        }
        if self.min_samples_leaf == 0 {
            return Err(PipelineError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        match self.max_features {
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                Err(PipelineError::InvalidParameter(format!(
                    "max_features fraction must be in (0, 1], got {}",
                    f
                )))
            }
            MaxFeatures::Count(0) => Err(PipelineError::InvalidParameter(
                "max_features count must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn tree_params(&self, n_features: usize) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.resolve(n_features),
        }
    }
}

/// Serializable representation of a fitted forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    pub trees: Vec<RegressionTree>,
    pub n_features: usize,
    pub feature_importances: Vec<f64>,
}

/// Random Forest regressor with compile-time training state.
///
/// - `RandomForestRegressor<Unfitted>` holds a [`ForestConfig`] and exposes [`fit`](Self::fit).
/// - `RandomForestRegressor<Fitted>` holds trees and importances and implements [`InferenceModel`].
#[derive(Debug, Clone)]
pub struct RandomForestRegressor<S> {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
    _state: PhantomData<S>,
}

impl RandomForestRegressor<Unfitted> {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
            _state: PhantomData,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Grow the forest on `x` (rows are samples) and target `y`.
    ///
    /// # Errors
    /// - [`PipelineError::InvalidParameter`] for an invalid config, a row
    ///   count mismatch, or non-finite values in `x` or `y`
    /// - [`PipelineError::InsufficientData`] if `x` has no rows
    pub fn fit(
        self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<RandomForestRegressor<Fitted>, PipelineError> {
        self.config.validate()?;
        let (n_rows, n_features) = x.dim();
        if n_rows == 0 {
            return Err(PipelineError::insufficient("forest training data", 0, 1));
        }
        if y.len() != n_rows {
            return Err(PipelineError::InvalidParameter(format!(
                "x has {} rows but y has {} values",
                n_rows,
                y.len()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::InvalidParameter(
                "forest input contains NaN or infinite values".to_string(),
            ));
        }

        let y = y.to_vec();
        let params = self.config.tree_params(n_features);
        let mut seeder = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.n_trees);
        let mut totals = vec![0.0; n_features];

        for _ in 0..self.config.n_trees {
            let mut rng = StdRng::seed_from_u64(seeder.gen());
            let samples: Vec<usize> = if self.config.bootstrap {
                (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
            } else {
                (0..n_rows).collect()
            };
            let (tree, gains) = RegressionTree::fit(x, &y, samples, &params, &mut rng)?;

            // each tree contributes its normalized importances; stumps contribute nothing
            let tree_total: f64 = gains.iter().sum();
            if tree_total > 0.0 {
                for (total, gain) in totals.iter_mut().zip(&gains) {
                    *total += gain / tree_total;
                }
            }
            trees.push(tree);
        }

        let feature_importances = normalize_importances(totals);
        debug!(
            n_trees = trees.len(),
            n_rows,
            n_features,
            "random forest fitted"
        );

        Ok(RandomForestRegressor {
            config: self.config,
            trees,
            n_features,
            feature_importances,
            _state: PhantomData,
        })
    }
}

/// Scale to sum to one; a forest with no splits at all gets uniform importances.
fn normalize_importances(totals: Vec<f64>) -> Vec<f64> {
    let n = totals.len();
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.into_iter().map(|v| v / sum).collect()
    } else if n > 0 {
        vec![1.0 / n as f64; n]
    } else {
        totals
    }
}

impl RandomForestRegressor<Fitted> {
    /// Mean-decrease-in-impurity importances, one per feature, summing to 1.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_view(&self, row: ArrayView1<f64>) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }
}

impl InferenceModel for RandomForestRegressor<Fitted> {
    type InputSingle = [f64];
    type OutputSingle = f64;
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = RandomForestParams;

    fn predict(&self, input: &[f64]) -> Result<f64, PipelineError> {
        if input.len() != self.n_features {
            return Err(PipelineError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: input.len(),
            });
        }
        Ok(self.predict_view(ArrayView1::from(input)))
    }

    fn predict_batch(&self, input: &Array2<f64>) -> Result<Array1<f64>, PipelineError> {
        if input.ncols() != self.n_features {
            return Err(PipelineError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: input.ncols(),
            });
        }
        Ok(input
            .axis_iter(Axis(0))
            .map(|row| self.predict_view(row))
            .collect())
    }

    fn extract_params(&self) -> RandomForestParams {
        RandomForestParams {
            trees: self.trees.clone(),
            n_features: self.n_features,
            feature_importances: self.feature_importances.clone(),
        }
    }

    fn from_params(params: RandomForestParams) -> Result<Self, PipelineError> {
        if params.trees.is_empty() {
            return Err(PipelineError::Serialization(
                "forest has no trees".to_string(),
            ));
        }
        if params.feature_importances.len() != params.n_features {
            return Err(PipelineError::FeatureMismatch {
                expected_features: params.n_features,
                got_features: params.feature_importances.len(),
            });
        }
        for tree in &params.trees {
            tree.validate(params.n_features)?;
        }
        Ok(Self {
            config: ForestConfig::default().with_n_trees(params.trees.len()),
            trees: params.trees,
            n_features: params.n_features,
            feature_importances: params.feature_importances,
            _state: PhantomData,
        })
    }
}
