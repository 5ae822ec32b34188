//! Regression evaluation metrics.
//!
//! Used by the boosting loop to score the validation set each round and by
//! callers who want a quick summary of held-out performance.

use crate::core::types::MetricType;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Regression evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root Mean Square Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// R-squared (coefficient of determination)
    pub r2: f64,
    /// Mean Squared Error
    pub mse: f64,
}

/// Evaluate regression metrics
pub fn evaluate_regression(
    predictions: ArrayView1<'_, f64>,
    true_values: ArrayView1<'_, f64>,
) -> RegressionMetrics {
    let n = predictions.len() as f64;

    let mut sum_squared_error = 0.0;
    let mut sum_absolute_error = 0.0;
    for (&pred, &true_val) in predictions.iter().zip(true_values.iter()) {
        let error = pred - true_val;
        sum_squared_error += error * error;
        sum_absolute_error += error.abs();
    }

    let mse = sum_squared_error / n;
    let rmse = mse.sqrt();
    let mae = sum_absolute_error / n;

    let true_mean = true_values.sum() / n;
    let total_sum_squares: f64 = true_values
        .iter()
        .map(|&value| (value - true_mean).powi(2))
        .sum();

    let r2 = if total_sum_squares > 0.0 {
        1.0 - sum_squared_error / total_sum_squares
    } else {
        0.0
    };

    RegressionMetrics { rmse, mae, r2, mse }
}

/// Evaluate a single metric.
pub fn evaluate_metric(
    metric: MetricType,
    predictions: ArrayView1<'_, f64>,
    true_values: ArrayView1<'_, f64>,
) -> f64 {
    let n = predictions.len() as f64;
    match metric {
        MetricType::Rmse => {
            let sse: f64 = predictions
                .iter()
                .zip(true_values.iter())
                .map(|(p, y)| (p - y).powi(2))
                .sum();
            (sse / n).sqrt()
        }
        MetricType::Mae => {
            let sae: f64 = predictions
                .iter()
                .zip(true_values.iter())
                .map(|(p, y)| (p - y).abs())
                .sum();
            sae / n
        }
    }
}
