//! Exact greedy tree learner.
//!
//! Grows one regression tree depth-first from gradient/hessian statistics.
//! For every node, each candidate feature is scanned on its own rayon task:
//! the node's rows are sorted by feature value and every boundary between two
//! distinct values is tried, once with missing values sent left and once with
//! them sent right. Candidates are reduced in feature order, so ties resolve
//! to the lowest feature index regardless of thread scheduling.

use crate::config::BoosterParams;
use crate::core::constants::K_EPSILON;
use crate::core::error::{BoostError, Result};
use crate::core::types::{FeatureIndex, NodeIndex};
use crate::tree::node::NodeStats;
use crate::tree::split::{split_threshold, SplitEvaluator, SplitInfo};
use crate::tree::tree::Tree;
use ndarray::ArrayView2;
use rayon::prelude::*;

/// Configuration for the tree learner.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLearnerConfig {
    /// Maximum tree depth (0 = unlimited)
    pub max_depth: usize,
    /// Minimum gain required for a split
    pub min_split_loss: f64,
    /// Shrinkage applied to leaf outputs
    pub learning_rate: f64,
    /// L2 regularization parameter
    pub reg_lambda: f64,
    /// L1 regularization parameter
    pub reg_alpha: f64,
    /// Minimum sum of hessians required in each child
    pub min_child_weight: f64,
}

impl From<&BoosterParams> for TreeLearnerConfig {
    fn from(params: &BoosterParams) -> Self {
        TreeLearnerConfig {
            max_depth: params.max_depth,
            min_split_loss: params.min_split_loss,
            learning_rate: params.learning_rate,
            reg_lambda: params.reg_lambda,
            reg_alpha: params.reg_alpha,
            min_child_weight: params.min_child_weight,
        }
    }
}

/// Builds regression trees from gradient statistics.
#[derive(Debug, Clone)]
pub struct TreeLearner {
    config: TreeLearnerConfig,
    evaluator: SplitEvaluator,
}

impl TreeLearner {
    /// Creates a learner with the given configuration.
    pub fn new(config: TreeLearnerConfig) -> Self {
        let evaluator =
            SplitEvaluator::new(config.reg_lambda, config.reg_alpha, config.min_child_weight);
        TreeLearner { config, evaluator }
    }

    /// Returns the learner configuration.
    pub fn config(&self) -> &TreeLearnerConfig {
        &self.config
    }

    /// Grows a tree over `rows`, splitting only on `feature_subset`.
    ///
    /// Leaf outputs are shrunk by the learning rate.
    pub fn train(
        &self,
        features: ArrayView2<'_, f64>,
        gradients: &[f64],
        hessians: &[f64],
        rows: Vec<usize>,
        feature_subset: &[FeatureIndex],
    ) -> Result<Tree> {
        let root_stats = NodeStats::from_rows(&rows, gradients, hessians);
        let mut tree = Tree::new(root_stats);
        let mut pending: Vec<(NodeIndex, Vec<usize>)> = vec![(0, rows)];

        while let Some((node_index, node_rows)) = pending.pop() {
            let node = tree.node(node_index).ok_or_else(|| {
                BoostError::training(format!("Node index {} out of bounds", node_index))
            })?;
            let stats = *node.stats();
            let depth = node.depth();

            let depth_allows = self.config.max_depth == 0 || depth < self.config.max_depth;
            let best = if depth_allows && node_rows.len() >= 2 {
                self.find_best_split(features, gradients, hessians, &node_rows, &stats, feature_subset)
            } else {
                None
            };

            match best {
                Some(split) => {
                    let (left_rows, right_rows) = partition_rows(features, &node_rows, &split);
                    let (left, right) = tree.split_node(
                        node_index,
                        split.feature,
                        split.threshold,
                        split.gain,
                        split.default_left,
                        split.left,
                        split.right,
                    )?;
                    pending.push((right, right_rows));
                    pending.push((left, left_rows));
                }
                None => {
                    let output = self.evaluator.leaf_output(&stats) * self.config.learning_rate;
                    tree.set_leaf_value(node_index, output)?;
                }
            }
        }

        Ok(tree)
    }

    /// Best admissible split of a node across `feature_subset`, if any.
    pub fn find_best_split(
        &self,
        features: ArrayView2<'_, f64>,
        gradients: &[f64],
        hessians: &[f64],
        rows: &[usize],
        parent: &NodeStats,
        feature_subset: &[FeatureIndex],
    ) -> Option<SplitInfo> {
        let candidates: Vec<Option<SplitInfo>> = feature_subset
            .par_iter()
            .map(|&feature| {
                self.find_best_split_for_feature(features, gradients, hessians, rows, parent, feature)
            })
            .collect();

        let min_gain = self.config.min_split_loss.max(K_EPSILON);
        candidates
            .into_iter()
            .flatten()
            .filter(|split| split.gain > min_gain)
            .fold(None, |best: Option<SplitInfo>, split| match best {
                Some(current) if current.gain >= split.gain => Some(current),
                _ => Some(split),
            })
    }

    /// Best split of a node on a single feature.
    pub fn find_best_split_for_feature(
        &self,
        features: ArrayView2<'_, f64>,
        gradients: &[f64],
        hessians: &[f64],
        rows: &[usize],
        parent: &NodeStats,
        feature: FeatureIndex,
    ) -> Option<SplitInfo> {
        let column = features.column(feature);
        let mut present: Vec<(f64, usize)> = rows
            .iter()
            .filter_map(|&row| {
                let value = column[row];
                (!value.is_nan()).then_some((value, row))
            })
            .collect();

        if present.len() < 2 {
            return None;
        }
        present.sort_by(|a, b| a.0.total_cmp(&b.0));

        let present_rows: Vec<usize> = present.iter().map(|&(_, row)| row).collect();
        let present_stats = NodeStats::from_rows(&present_rows, gradients, hessians);
        let missing = NodeStats::new(
            parent.sum_gradients - present_stats.sum_gradients,
            parent.sum_hessians - present_stats.sum_hessians,
            parent.data_count - present_stats.data_count,
        );
        let directions: &[bool] = if missing.data_count > 0 {
            &[true, false]
        } else {
            &[false]
        };

        let mut best: Option<SplitInfo> = None;
        let mut accumulated = NodeStats::default();

        for window in 0..present.len() - 1 {
            let (value, row) = present[window];
            accumulated.sum_gradients += gradients[row];
            accumulated.sum_hessians += hessians[row];
            accumulated.data_count += 1;

            let next_value = present[window + 1].0;
            if value == next_value {
                continue;
            }

            for &default_left in directions {
                let left = if default_left {
                    NodeStats::new(
                        accumulated.sum_gradients + missing.sum_gradients,
                        accumulated.sum_hessians + missing.sum_hessians,
                        accumulated.data_count + missing.data_count,
                    )
                } else {
                    accumulated
                };
                let right = NodeStats::new(
                    parent.sum_gradients - left.sum_gradients,
                    parent.sum_hessians - left.sum_hessians,
                    parent.data_count - left.data_count,
                );

                if !self.evaluator.is_admissible(&left, &right) {
                    continue;
                }

                let gain = self.evaluator.split_gain(parent, &left, &right);
                if best.as_ref().map_or(true, |current| gain > current.gain) {
                    best = Some(SplitInfo {
                        feature,
                        threshold: split_threshold(value, next_value),
                        gain,
                        default_left,
                        left,
                        right,
                    });
                }
            }
        }

        best
    }
}

/// Splits `rows` into the rows routed left and right by `split`.
fn partition_rows(
    features: ArrayView2<'_, f64>,
    rows: &[usize],
    split: &SplitInfo,
) -> (Vec<usize>, Vec<usize>) {
    let column = features.column(split.feature);
    rows.iter().copied().partition(|&row| {
        let value = column[row];
        if value.is_nan() {
            split.default_left
        } else {
            value <= split.threshold
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn squared_error_stats(predictions: &[f64], labels: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let gradients = predictions.iter().zip(labels).map(|(p, y)| p - y).collect();
        (gradients, vec![1.0; labels.len()])
    }

    fn learner(max_depth: usize) -> TreeLearner {
        TreeLearner::new(TreeLearnerConfig {
            max_depth,
            min_split_loss: 0.0,
            learning_rate: 1.0,
            reg_lambda: 0.0,
            reg_alpha: 0.0,
            min_child_weight: 0.0,
        })
    }

    #[test]
    fn test_step_function_is_recovered() {
        let features = array![[1.0], [2.0], [3.0], [4.0]];
        let (gradients, hessians) = squared_error_stats(&[0.0; 4], &[1.0, 1.0, 5.0, 5.0]);
        let tree = learner(3)
            .train(features.view(), &gradients, &hessians, (0..4).collect(), &[0])
            .unwrap();

        assert_eq!(tree.num_leaves(), 2);
        let root = tree.root().split().unwrap();
        assert_eq!(root.threshold, 2.5);
        assert_abs_diff_eq!(tree.predict(array![1.5].view()), 1.0);
        assert_abs_diff_eq!(tree.predict(array![3.5].view()), 5.0);
    }

    #[test]
    fn test_missing_values_follow_learned_direction() {
        let features = array![[1.0], [2.0], [f64::NAN], [8.0], [9.0]];
        let (gradients, hessians) = squared_error_stats(&[0.0; 5], &[0.0, 0.0, 10.0, 10.0, 10.0]);
        let tree = learner(1)
            .train(features.view(), &gradients, &hessians, (0..5).collect(), &[0])
            .unwrap();

        let root = tree.root().split().unwrap();
        assert!(!root.default_left);
        assert_abs_diff_eq!(tree.predict(array![f64::NAN].view()), 10.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let features = Array2::from_shape_fn((16, 1), |(i, _)| i as f64);
        let labels: Vec<f64> = (0..16).map(|i| (i * i) as f64).collect();
        let (gradients, hessians) = squared_error_stats(&[0.0; 16], &labels);

        let shallow = learner(2)
            .train(features.view(), &gradients, &hessians, (0..16).collect(), &[0])
            .unwrap();
        assert!(shallow.depth() <= 2);
        assert!(shallow.num_leaves() <= 4);

        let unlimited = learner(0)
            .train(features.view(), &gradients, &hessians, (0..16).collect(), &[0])
            .unwrap();
        assert_eq!(unlimited.num_leaves(), 16);
    }

    #[test]
    fn test_constant_target_yields_single_leaf() {
        let features = array![[1.0, 3.0], [2.0, 2.0], [3.0, 1.0]];
        let (gradients, hessians) = squared_error_stats(&[2.0; 3], &[2.0; 3]);
        let tree = learner(4)
            .train(features.view(), &gradients, &hessians, (0..3).collect(), &[0, 1])
            .unwrap();
        assert_eq!(tree.num_leaves(), 1);
        assert_eq!(tree.predict(array![0.0, 0.0].view()), 0.0);
    }

    #[test]
    fn test_tie_prefers_lowest_feature() {
        // Both columns separate the targets identically.
        let features = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let (gradients, hessians) = squared_error_stats(&[0.0; 4], &[0.0, 0.0, 1.0, 1.0]);
        let tree = learner(1)
            .train(features.view(), &gradients, &hessians, (0..4).collect(), &[0, 1])
            .unwrap();
        assert_eq!(tree.root().split().unwrap().feature, 0);
    }

    #[test]
    fn test_feature_subset_is_respected() {
        let features = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let (gradients, hessians) = squared_error_stats(&[0.0; 4], &[0.0, 0.0, 1.0, 1.0]);
        let tree = learner(1)
            .train(features.view(), &gradients, &hessians, (0..4).collect(), &[1])
            .unwrap();
        assert_eq!(tree.root().split().unwrap().feature, 1);
    }

    #[test]
    fn test_min_split_loss_prunes_weak_splits() {
        let features = array![[1.0], [2.0]];
        let (gradients, hessians) = squared_error_stats(&[0.0; 2], &[0.0, 0.2]);
        let mut config = learner(3).config().clone();
        config.min_split_loss = 1.0;
        let tree = TreeLearner::new(config)
            .train(features.view(), &gradients, &hessians, vec![0, 1], &[0])
            .unwrap();
        assert_eq!(tree.num_leaves(), 1);
    }
}
