//! Split scoring with L1/L2-regularised second-order statistics.
//!
//! For a node with gradient sum `G` and hessian sum `H`:
//!
//! - leaf score: `T(G)^2 / (H + lambda)`
//! - leaf output: `-T(G) / (H + lambda)`
//! - split gain: `score(left) + score(right) - score(parent)`
//!
//! where `T` soft-thresholds `G` by the L1 penalty `alpha`.

use crate::config::BoosterParams;
use crate::core::types::{FeatureIndex, Score};
use crate::tree::node::NodeStats;

/// Best split found for a node.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    /// Feature index for the split
    pub feature: FeatureIndex,
    /// Rows with `value <= threshold` go left
    pub threshold: f64,
    /// Loss reduction achieved by the split
    pub gain: f64,
    /// Direction for missing values
    pub default_left: bool,
    /// Left child statistics
    pub left: NodeStats,
    /// Right child statistics
    pub right: NodeStats,
}

/// Regularised gain and leaf-output calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitEvaluator {
    reg_lambda: f64,
    reg_alpha: f64,
    min_child_weight: f64,
}

impl SplitEvaluator {
    /// Creates an evaluator from explicit regularisation settings.
    pub fn new(reg_lambda: f64, reg_alpha: f64, min_child_weight: f64) -> Self {
        SplitEvaluator {
            reg_lambda,
            reg_alpha,
            min_child_weight,
        }
    }

    /// Creates an evaluator from booster parameters.
    pub fn from_params(params: &BoosterParams) -> Self {
        Self::new(params.reg_lambda, params.reg_alpha, params.min_child_weight)
    }

    fn threshold_l1(&self, sum_gradient: f64) -> f64 {
        if sum_gradient > self.reg_alpha {
            sum_gradient - self.reg_alpha
        } else if sum_gradient < -self.reg_alpha {
            sum_gradient + self.reg_alpha
        } else {
            0.0
        }
    }

    /// Structure score of a leaf.
    pub fn leaf_gain(&self, sum_gradient: f64, sum_hessian: f64) -> f64 {
        let denominator = sum_hessian + self.reg_lambda;
        if denominator <= 0.0 {
            return 0.0;
        }
        let numerator = self.threshold_l1(sum_gradient);
        numerator * numerator / denominator
    }

    /// Optimal (unshrunk) output of a leaf.
    pub fn leaf_output(&self, stats: &NodeStats) -> Score {
        let denominator = stats.sum_hessians + self.reg_lambda;
        if denominator <= 0.0 {
            return 0.0;
        }
        -self.threshold_l1(stats.sum_gradients) / denominator
    }

    /// Gain of splitting `parent` into `left` and `right`.
    pub fn split_gain(&self, parent: &NodeStats, left: &NodeStats, right: &NodeStats) -> f64 {
        self.leaf_gain(left.sum_gradients, left.sum_hessians)
            + self.leaf_gain(right.sum_gradients, right.sum_hessians)
            - self.leaf_gain(parent.sum_gradients, parent.sum_hessians)
    }

    /// Whether both children carry enough hessian mass and rows.
    pub fn is_admissible(&self, left: &NodeStats, right: &NodeStats) -> bool {
        left.data_count > 0
            && right.data_count > 0
            && left.sum_hessians >= self.min_child_weight
            && right.sum_hessians >= self.min_child_weight
    }
}

/// Threshold between two consecutive distinct values `a < b`.
///
/// The result `t` always satisfies `a <= t < b`.
pub fn split_threshold(a: f64, b: f64) -> f64 {
    let mid = a + (b - a) / 2.0;
    if mid >= b || !mid.is_finite() {
        a
    } else {
        mid
    }
}
