//! Regression tree structure.
//!
//! Nodes are stored in a contiguous vector with the root at index 0. Leaf
//! outputs already include the learning-rate shrinkage, so a tree's
//! prediction is simply the value of the leaf a row lands in.

use crate::core::error::{BoostError, Result};
use crate::core::types::{FeatureIndex, NodeIndex, Score};
use crate::tree::node::{NodeStats, SplitNode, TreeNode};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision tree representing a single boosting round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Vector of tree nodes (index 0 is always the root)
    nodes: Vec<TreeNode>,
    /// Current number of leaf nodes
    num_leaves: usize,
    /// Maximum depth of any node
    max_depth: usize,
}

impl Tree {
    /// Creates a tree with a single root leaf holding `root_stats`.
    pub fn new(root_stats: NodeStats) -> Self {
        Tree {
            nodes: vec![TreeNode::new_leaf(root_stats, 0, None)],
            num_leaves: 1,
            max_depth: 0,
        }
    }

    /// Returns the number of nodes in the tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Returns the tree depth (maximum depth of any node).
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the node at the given index.
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// All nodes in storage order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Returns the root node of the tree.
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Turns the leaf at `index` into a split with two fresh leaf children.
    ///
    /// Returns the `(left, right)` indices of the new children.
    #[allow(clippy::too_many_arguments)]
    pub fn split_node(
        &mut self,
        index: NodeIndex,
        feature: FeatureIndex,
        threshold: f64,
        gain: f64,
        default_left: bool,
        left_stats: NodeStats,
        right_stats: NodeStats,
    ) -> Result<(NodeIndex, NodeIndex)> {
        let depth = match self.nodes.get(index) {
            Some(node) if node.is_leaf() => node.depth() + 1,
            Some(_) => {
                return Err(BoostError::training(format!(
                    "Node {} is already split",
                    index
                )))
            }
            None => {
                return Err(BoostError::training(format!(
                    "Node index {} out of bounds",
                    index
                )))
            }
        };

        let left = self.nodes.len();
        let right = left + 1;
        self.nodes
            .push(TreeNode::new_leaf(left_stats, depth, Some(index)));
        self.nodes
            .push(TreeNode::new_leaf(right_stats, depth, Some(index)));

        self.nodes[index].set_split(SplitNode {
            feature,
            threshold,
            default_left,
            left,
            right,
            gain,
        });

        self.num_leaves += 1;
        self.max_depth = self.max_depth.max(depth);
        Ok((left, right))
    }

    /// Sets the output of the leaf at `index`.
    pub fn set_leaf_value(&mut self, index: NodeIndex, value: Score) -> Result<()> {
        match self.nodes.get_mut(index) {
            Some(node) if node.is_leaf() => {
                node.set_leaf_value(value);
                Ok(())
            }
            Some(_) => Err(BoostError::training(format!(
                "Node {} is not a leaf",
                index
            ))),
            None => Err(BoostError::training(format!(
                "Node index {} out of bounds",
                index
            ))),
        }
    }

    /// Index of the leaf a row lands in.
    pub fn leaf_index(&self, features: ArrayView1<'_, f64>) -> NodeIndex {
        let mut node_index = 0;
        while let Some(split) = self.nodes[node_index].split() {
            node_index = split.next(features[split.feature]);
        }
        node_index
    }

    /// Predicts the output for a single row.
    pub fn predict(&self, features: ArrayView1<'_, f64>) -> Score {
        let leaf = self.leaf_index(features);
        self.nodes[leaf].leaf_value().unwrap_or(0.0)
    }

    /// Predicts the output for every row of `features`.
    pub fn predict_batch(&self, features: ArrayView2<'_, f64>) -> Array1<Score> {
        features
            .axis_iter(Axis(0))
            .map(|row| self.predict(row))
            .collect()
    }

    /// Fraction of a parent's training cover that flowed into `child`.
    ///
    /// Falls back to row counts when the parent has no hessian mass.
    pub fn cover_fraction(&self, parent: NodeIndex, child: NodeIndex) -> f64 {
        let parent = &self.nodes[parent];
        let child = &self.nodes[child];
        if parent.cover() > 0.0 {
            child.cover() / parent.cover()
        } else if parent.stats().data_count > 0 {
            child.stats().data_count as f64 / parent.stats().data_count as f64
        } else {
            0.5
        }
    }

    /// Cover-weighted mean output of the tree over its training rows.
    pub fn expected_value(&self) -> Score {
        self.subtree_expectation(0)
    }

    fn subtree_expectation(&self, index: NodeIndex) -> Score {
        match self.nodes[index].split() {
            None => self.nodes[index].leaf_value().unwrap_or(0.0),
            Some(split) => {
                self.cover_fraction(index, split.left) * self.subtree_expectation(split.left)
                    + self.cover_fraction(index, split.right)
                        * self.subtree_expectation(split.right)
            }
        }
    }

    /// Internal nodes together with their split decisions.
    pub fn splits(&self) -> impl Iterator<Item = (&TreeNode, &SplitNode)> + '_ {
        self.nodes
            .iter()
            .filter_map(|node| node.split().map(|split| (node, split)))
    }

    /// Validates the tree structure for consistency.
    pub fn validate(&self, num_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(BoostError::serialization("Tree has no nodes"));
        }

        let mut leaves = 0;
        for (index, node) in self.nodes.iter().enumerate() {
            match node.split() {
                None => {
                    match node.leaf_value() {
                        Some(value) if value.is_finite() => {}
                        _ => {
                            return Err(BoostError::serialization(format!(
                                "Leaf {} has no finite value",
                                index
                            )))
                        }
                    }
                    leaves += 1;
                }
                Some(split) => {
                    if split.feature >= num_features {
                        return Err(BoostError::serialization(format!(
                            "Node {} splits on feature {} but the model has {} features",
                            index, split.feature, num_features
                        )));
                    }
                    for child in [split.left, split.right] {
                        let parent = self.nodes.get(child).and_then(|c| c.parent());
                        if child <= index || parent != Some(index) {
                            return Err(BoostError::serialization(format!(
                                "Node {} has an invalid child {}",
                                index, child
                            )));
                        }
                    }
                }
            }
        }

        if leaves != self.num_leaves {
            return Err(BoostError::serialization(format!(
                "Tree records {} leaves but contains {}",
                self.num_leaves, leaves
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tree(nodes={}, leaves={}, depth={})",
            self.num_nodes(),
            self.num_leaves,
            self.max_depth
        )?;
        for (index, node) in self.nodes.iter().enumerate() {
            writeln!(f, "{:indent$}{}: {}", "", index, node, indent = node.depth() * 2)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// x0 <= 0.5 -> -1.0 (cover 3), else x1 <= 2.0 -> 0.5 (cover 1) / 2.0 (cover 2)
    fn sample_tree() -> Tree {
        let mut tree = Tree::new(NodeStats::new(0.0, 6.0, 6));
        let (left, right) = tree
            .split_node(0, 0, 0.5, 4.0, true, NodeStats::new(3.0, 3.0, 3), NodeStats::new(-3.0, 3.0, 3))
            .unwrap();
        tree.set_leaf_value(left, -1.0).unwrap();
        let (rl, rr) = tree
            .split_node(right, 1, 2.0, 1.0, false, NodeStats::new(-0.5, 1.0, 1), NodeStats::new(-2.5, 2.0, 2))
            .unwrap();
        tree.set_leaf_value(rl, 0.5).unwrap();
        tree.set_leaf_value(rr, 2.0).unwrap();
        tree
    }

    #[test]
    fn test_structure() {
        let tree = sample_tree();
        assert_eq!(tree.num_nodes(), 5);
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert!(tree.validate(2).is_ok());
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_predict_with_missing_values() {
        let tree = sample_tree();
        assert_eq!(tree.predict(array![0.0, 10.0].view()), -1.0);
        assert_eq!(tree.predict(array![1.0, 1.0].view()), 0.5);
        assert_eq!(tree.predict(array![1.0, 3.0].view()), 2.0);
        assert_eq!(tree.predict(array![f64::NAN, 3.0].view()), -1.0);
        assert_eq!(tree.predict(array![1.0, f64::NAN].view()), 2.0);

        let batch = tree.predict_batch(array![[0.0, 0.0], [1.0, 3.0]].view());
        assert_eq!(batch, array![-1.0, 2.0]);
    }

    #[test]
    fn test_expected_value_is_cover_weighted() {
        let tree = sample_tree();
        let expected = 0.5 * -1.0 + 0.5 * (1.0 / 3.0 * 0.5 + 2.0 / 3.0 * 2.0);
        assert_abs_diff_eq!(tree.expected_value(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_split_errors() {
        let mut tree = sample_tree();
        let stats = NodeStats::default();
        assert!(tree.split_node(0, 0, 0.0, 0.0, true, stats, stats).is_err());
        assert!(tree.split_node(99, 0, 0.0, 0.0, true, stats, stats).is_err());
        assert!(tree.set_leaf_value(0, 1.0).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_tree() {
        let empty: Tree =
            serde_json::from_str(r#"{"nodes":[],"num_leaves":0,"max_depth":0}"#).unwrap();
        assert!(matches!(empty.validate(2), Err(BoostError::Serialization { .. })));
        assert!(sample_tree().validate(2).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite_leaf() {
        let mut tree = sample_tree();
        tree.set_leaf_value(1, f64::NAN).unwrap();
        assert!(matches!(tree.validate(2), Err(BoostError::Serialization { .. })));
    }

    #[test]
    fn test_serde_round_trip() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let parsed: Tree = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tree);
    }
}
