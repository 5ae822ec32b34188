//! Prediction outputs and explanations.
//!
//! - [`shap`]: exact path-dependent TreeSHAP and the [`Explanation`] container
//! - [`feature_importance`]: split/gain/cover importance over a feature list
//!
//! [`PredictOptions`] selects the optional parts of a [`PredictionOutput`].

pub mod feature_importance;
pub mod shap;

pub use feature_importance::FeatureImportance;
pub use shap::{Explanation, TreeExplainer};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Options controlling which optional outputs a prediction call produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictOptions {
    /// Whether to compute SHAP values
    pub return_shaps: bool,
    /// Whether to compute the cross-booster standard deviation
    pub return_stds: bool,
}

impl PredictOptions {
    /// Create options with every optional output disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to compute SHAP values
    pub fn with_shap(mut self, return_shaps: bool) -> Self {
        self.return_shaps = return_shaps;
        self
    }

    /// Set whether to compute the standard deviation
    pub fn with_std(mut self, return_stds: bool) -> Self {
        self.return_stds = return_stds;
        self
    }
}

/// Result of a prediction call.
///
/// `predictions` is always present; the optional parts are present exactly
/// when they were requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutput {
    /// One prediction per input row
    pub predictions: Array1<f64>,
    /// Attributions, when requested
    pub shap_values: Option<Explanation>,
    /// Population standard deviation across boosters, when requested
    pub std: Option<Array1<f64>>,
}

impl PredictionOutput {
    /// Output holding predictions only.
    pub fn new(predictions: Array1<f64>) -> Self {
        PredictionOutput {
            predictions,
            shap_values: None,
            std: None,
        }
    }

    /// Number of predicted rows.
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    /// Whether no rows were predicted.
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}
