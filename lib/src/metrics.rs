//! Metrics for evaluating regression models.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Regression metric functions over paired slices.
pub struct Metrics;

impl Metrics {
    /// Calculate Mean Squared Error (MSE).
    ///
    /// MSE = mean((y_true - y_pred)^2)
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        debug_assert_eq!(y_true.len(), y_pred.len());

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        sum_sq / y_true.len() as f64
    }

    /// Calculate Root Mean Squared Error (RMSE), in the units of the target.
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }

    /// Calculate Mean Absolute Error (MAE).
    ///
    /// MAE = mean(|y_true - y_pred|)
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
        debug_assert_eq!(y_true.len(), y_pred.len());

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_abs: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).abs())
            .sum();

        sum_abs / y_true.len() as f64
    }

    /// Calculate R² (coefficient of determination).
    ///
    /// R² = 1 - (SS_res / SS_tot)
    ///
    /// where:
    /// - SS_res = sum((y_true - y_pred)^2)  (residual sum of squares)
    /// - SS_tot = sum((y_true - mean(y_true))^2)  (total sum of squares)
    ///
    /// Values can be negative if the model is worse than predicting the mean.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
        debug_assert_eq!(y_true.len(), y_pred.len());

        if y_true.is_empty() {
            return 0.0;
        }

        let mean_true = y_true.iter().sum::<f64>() / y_true.len() as f64;

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            // constant target: perfect only if the predictions match it exactly
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - (ss_res / ss_tot)
    }

    /// Calculate all metrics at once.
    ///
    /// # Errors
    /// [`PipelineError::InvalidParameter`] if the slices differ in length.
    pub fn calculate_all(
        y_true: &[f64],
        y_pred: &[f64],
    ) -> Result<RegressionMetrics, PipelineError> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::InvalidParameter(format!(
                "{} targets but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        Ok(RegressionMetrics {
            mse: Self::mse(y_true, y_pred),
            rmse: Self::rmse(y_true, y_pred),
            mae: Self::mae(y_true, y_pred),
            r_squared: Self::r_squared(y_true, y_pred),
            n_samples: y_true.len(),
        })
    }
}

/// Struct to hold all regression metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
    /// Rows the metrics were computed over.
    pub n_samples: usize,
}
