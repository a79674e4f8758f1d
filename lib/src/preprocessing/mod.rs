//! Data preprocessing transformers.
//!
//! Transformers follow the same type-state split as models in this crate:
//! an unfitted value carries hyperparameters, and `fit` returns a separate
//! fitted type that carries only the learned statistics.
//!
//! # Core Traits
//!
//! - [`Transformer`]: Unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: Fitted transformer ready for inference
//!
//! # Available Transformers
//!
//! - [`SimpleImputer`]: Fill missing values with mean, median, most_frequent, or constant

pub mod imputation;
pub mod traits;

pub use imputation::{FittedSimpleImputer, ImputeStrategy, SimpleImputer, SimpleImputerParams};
pub use traits::{FittedTransformer, Transformer};
