//! Tree and objective parameters for the boosting engine.
//!
//! [`BoosterParams`] holds every parameter that shapes an individual tree or
//! the loss being optimised. Parameters that only control the boosting loop
//! (round budget, early-stopping patience) live in
//! [`TrainingControl`](super::training::TrainingControl) so that nothing in
//! this struct is ever passed twice.

use crate::core::constants::*;
use crate::core::error::{BoostError, Result};
use crate::core::types::*;

use serde::{Deserialize, Serialize};

/// Parameters consumed by the tree learner and objective.
///
/// Field names follow the XGBoost conventions so that parameter files written
/// for XGBoost load unchanged; the short XGBoost aliases (`eta`, `gamma`,
/// `lambda`, `alpha`) are accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    /// Loss optimised by the booster
    pub objective: ObjectiveType,
    /// Shrinkage applied to each leaf weight
    #[serde(alias = "eta")]
    pub learning_rate: f64,
    /// Maximum depth of a tree (0 = unlimited)
    pub max_depth: usize,
    /// Minimum hessian sum needed in each child of a split
    pub min_child_weight: f64,
    /// Minimum loss reduction needed to make a split
    #[serde(alias = "gamma")]
    pub min_split_loss: f64,
    /// L2 regularization on leaf weights
    #[serde(alias = "lambda")]
    pub reg_lambda: f64,
    /// L1 regularization on leaf weights
    #[serde(alias = "alpha")]
    pub reg_alpha: f64,
    /// Fraction of rows sampled for each tree
    pub subsample: f64,
    /// Fraction of columns sampled for each tree
    pub colsample_bytree: f64,
    /// Initial prediction; the mean training label when unset
    pub base_score: Option<f64>,
    /// Slope of the pseudo-Huber loss
    pub huber_slope: f64,
    /// Metric evaluated on the validation set each round
    pub eval_metric: MetricType,
    /// Random seed for row and column sampling
    #[serde(alias = "random_state")]
    pub seed: u64,
    /// Worker threads used while training (None = rayon's global pool)
    #[serde(alias = "n_jobs")]
    pub nthread: Option<usize>,
}

impl Default for BoosterParams {
    fn default() -> Self {
        BoosterParams {
            objective: ObjectiveType::SquaredError,
            learning_rate: DEFAULT_LEARNING_RATE,
            max_depth: DEFAULT_MAX_DEPTH,
            min_child_weight: DEFAULT_MIN_CHILD_WEIGHT,
            min_split_loss: DEFAULT_MIN_SPLIT_LOSS,
            reg_lambda: DEFAULT_REG_LAMBDA,
            reg_alpha: DEFAULT_REG_ALPHA,
            subsample: DEFAULT_SUBSAMPLE,
            colsample_bytree: DEFAULT_COLSAMPLE_BYTREE,
            base_score: None,
            huber_slope: DEFAULT_HUBER_SLOPE,
            eval_metric: MetricType::Rmse,
            seed: DEFAULT_RANDOM_SEED,
            nthread: None,
        }
    }
}

impl BoosterParams {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(BoostError::invalid_parameter(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be positive and finite",
            ));
        }

        if self.min_child_weight < 0.0 {
            return Err(BoostError::invalid_parameter(
                "min_child_weight",
                self.min_child_weight.to_string(),
                "must be non-negative",
            ));
        }

        if self.min_split_loss < 0.0 {
            return Err(BoostError::invalid_parameter(
                "min_split_loss",
                self.min_split_loss.to_string(),
                "must be non-negative",
            ));
        }

        if self.reg_lambda < 0.0 {
            return Err(BoostError::invalid_parameter(
                "reg_lambda",
                self.reg_lambda.to_string(),
                "must be non-negative",
            ));
        }

        if self.reg_alpha < 0.0 {
            return Err(BoostError::invalid_parameter(
                "reg_alpha",
                self.reg_alpha.to_string(),
                "must be non-negative",
            ));
        }

        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(BoostError::invalid_parameter(
                "subsample",
                self.subsample.to_string(),
                "must be in (0, 1]",
            ));
        }

        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return Err(BoostError::invalid_parameter(
                "colsample_bytree",
                self.colsample_bytree.to_string(),
                "must be in (0, 1]",
            ));
        }

        if self.huber_slope <= 0.0 {
            return Err(BoostError::invalid_parameter(
                "huber_slope",
                self.huber_slope.to_string(),
                "must be positive",
            ));
        }

        if let Some(base_score) = self.base_score {
            if !base_score.is_finite() {
                return Err(BoostError::invalid_parameter(
                    "base_score",
                    base_score.to_string(),
                    "must be finite",
                ));
            }
        }

        if self.nthread == Some(0) {
            return Err(BoostError::invalid_parameter(
                "nthread",
                "0",
                "must be at least 1 when set",
            ));
        }

        Ok(())
    }

    /// Return a copy with the seed replaced.
    pub fn with_seed(&self, seed: u64) -> Self {
        BoosterParams {
            seed,
            ..self.clone()
        }
    }
}

/// Builder for [`BoosterParams`]; `build` validates the result.
#[derive(Debug, Clone, Default)]
pub struct BoosterParamsBuilder {
    params: BoosterParams,
}

impl BoosterParamsBuilder {
    /// Create a new builder starting from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the objective
    pub fn objective(mut self, objective: ObjectiveType) -> Self {
        self.params.objective = objective;
        self
    }

    /// Set the learning rate
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.params.learning_rate = rate;
        self
    }

    /// Set the maximum depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.params.max_depth = depth;
        self
    }

    /// Set the minimum child hessian sum
    pub fn min_child_weight(mut self, weight: f64) -> Self {
        self.params.min_child_weight = weight;
        self
    }

    /// Set the minimum split loss reduction
    pub fn min_split_loss(mut self, gamma: f64) -> Self {
        self.params.min_split_loss = gamma;
        self
    }

    /// Set L2 regularization
    pub fn reg_lambda(mut self, lambda: f64) -> Self {
        self.params.reg_lambda = lambda;
        self
    }

    /// Set L1 regularization
    pub fn reg_alpha(mut self, alpha: f64) -> Self {
        self.params.reg_alpha = alpha;
        self
    }

    /// Set the row subsampling fraction
    pub fn subsample(mut self, fraction: f64) -> Self {
        self.params.subsample = fraction;
        self
    }

    /// Set the column subsampling fraction
    pub fn colsample_bytree(mut self, fraction: f64) -> Self {
        self.params.colsample_bytree = fraction;
        self
    }

    /// Fix the initial prediction
    pub fn base_score(mut self, score: f64) -> Self {
        self.params.base_score = Some(score);
        self
    }

    /// Set the pseudo-Huber slope
    pub fn huber_slope(mut self, slope: f64) -> Self {
        self.params.huber_slope = slope;
        self
    }

    /// Set the validation metric
    pub fn eval_metric(mut self, metric: MetricType) -> Self {
        self.params.eval_metric = metric;
        self
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    /// Set the number of training threads
    pub fn nthread(mut self, threads: usize) -> Self {
        self.params.nthread = Some(threads);
        self
    }

    /// Validate and return the parameters
    pub fn build(self) -> Result<BoosterParams> {
        self.params.validate()?;
        Ok(self.params)
    }
}
