//! Regression objectives.
//!
//! An objective turns current raw predictions and labels into the first and
//! second derivatives of the loss, which are all the tree learner sees.

use crate::config::BoosterParams;
use crate::core::error::{BoostError, Result};
use crate::core::types::{Label, MetricType, ObjectiveType, Score};
use std::fmt::Debug;

/// Loss whose gradients drive the boosting rounds.
pub trait ObjectiveFunction: Send + Sync + Debug {
    /// Get the objective function name
    fn name(&self) -> &'static str;

    /// Metric reported when none is configured
    fn default_metric(&self) -> MetricType {
        MetricType::Rmse
    }

    /// Calculate gradients and hessians for given predictions and labels
    fn calculate_gradients_hessians(
        &self,
        predictions: &[Score],
        labels: &[Label],
        gradients: &mut [f64],
        hessians: &mut [f64],
    ) -> Result<()>;
}

fn check_lengths(
    predictions: &[Score],
    labels: &[Label],
    gradients: &[f64],
    hessians: &[f64],
) -> Result<()> {
    let n = predictions.len();
    if labels.len() != n || gradients.len() != n || hessians.len() != n {
        return Err(BoostError::dimension_mismatch(
            format!("{} predictions, labels, gradients and hessians", n),
            format!(
                "labels: {}, gradients: {}, hessians: {}",
                labels.len(),
                gradients.len(),
                hessians.len()
            ),
        ));
    }
    Ok(())
}

/// Squared error: `0.5 * (prediction - label)^2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredErrorObjective;

impl ObjectiveFunction for SquaredErrorObjective {
    fn name(&self) -> &'static str {
        "reg:squarederror"
    }

    fn calculate_gradients_hessians(
        &self,
        predictions: &[Score],
        labels: &[Label],
        gradients: &mut [f64],
        hessians: &mut [f64],
    ) -> Result<()> {
        check_lengths(predictions, labels, gradients, hessians)?;

        for i in 0..predictions.len() {
            gradients[i] = predictions[i] - labels[i];
            hessians[i] = 1.0;
        }
        Ok(())
    }
}

/// Pseudo-Huber loss: `slope^2 * (sqrt(1 + (r / slope)^2) - 1)`.
#[derive(Debug, Clone, Copy)]
pub struct PseudoHuberObjective {
    slope: f64,
}

impl PseudoHuberObjective {
    /// Creates the objective with the given slope.
    pub fn new(slope: f64) -> Result<Self> {
        if slope <= 0.0 || !slope.is_finite() {
            return Err(BoostError::invalid_parameter(
                "huber_slope",
                slope.to_string(),
                "must be positive and finite",
            ));
        }
        Ok(PseudoHuberObjective { slope })
    }
}

impl ObjectiveFunction for PseudoHuberObjective {
    fn name(&self) -> &'static str {
        "reg:pseudohubererror"
    }

    fn default_metric(&self) -> MetricType {
        MetricType::Mae
    }

    fn calculate_gradients_hessians(
        &self,
        predictions: &[Score],
        labels: &[Label],
        gradients: &mut [f64],
        hessians: &mut [f64],
    ) -> Result<()> {
        check_lengths(predictions, labels, gradients, hessians)?;

        for i in 0..predictions.len() {
            let residual = predictions[i] - labels[i];
            let scale = 1.0 + (residual / self.slope).powi(2);
            let scale_sqrt = scale.sqrt();
            gradients[i] = residual / scale_sqrt;
            hessians[i] = 1.0 / (scale * scale_sqrt);
        }
        Ok(())
    }
}

/// Create objective function from configuration
pub fn create_objective_function(params: &BoosterParams) -> Result<Box<dyn ObjectiveFunction>> {
    match params.objective {
        ObjectiveType::SquaredError => Ok(Box::new(SquaredErrorObjective)),
        ObjectiveType::PseudoHuber => Ok(Box::new(PseudoHuberObjective::new(params.huber_slope)?)),
    }
}
