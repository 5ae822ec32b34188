//! Tree node representation.
//!
//! A node is either a leaf carrying its output value or a split carrying the
//! feature, threshold and child indices. Both kinds keep the gradient/hessian
//! statistics of the rows that reached them during training; the hessian sum
//! ("cover") is what TreeSHAP uses to weight unobserved branches.

use crate::core::types::{FeatureIndex, NodeIndex, Score};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gradient statistics of the training rows that reached a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeStats {
    /// Sum of gradients
    pub sum_gradients: f64,
    /// Sum of hessians (the node cover)
    pub sum_hessians: f64,
    /// Number of training rows
    pub data_count: usize,
}

impl NodeStats {
    /// Create node statistics.
    pub fn new(sum_gradients: f64, sum_hessians: f64, data_count: usize) -> Self {
        NodeStats {
            sum_gradients,
            sum_hessians,
            data_count,
        }
    }

    /// Accumulate statistics over the given rows.
    pub fn from_rows(rows: &[usize], gradients: &[f64], hessians: &[f64]) -> Self {
        rows.iter().fold(NodeStats::default(), |mut acc, &row| {
            acc.sum_gradients += gradients[row];
            acc.sum_hessians += hessians[row];
            acc.data_count += 1;
            acc
        })
    }
}

/// Split decision stored on an internal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    /// Feature index tested by the split
    pub feature: FeatureIndex,
    /// Rows with `value <= threshold` go left
    pub threshold: f64,
    /// Direction taken by missing (NaN) values
    pub default_left: bool,
    /// Left child index
    pub left: NodeIndex,
    /// Right child index
    pub right: NodeIndex,
    /// Loss reduction achieved by the split
    pub gain: f64,
}

impl SplitNode {
    /// Child index taken by a row with the given feature value.
    pub fn next(&self, value: f64) -> NodeIndex {
        if self.goes_left(value) {
            self.left
        } else {
            self.right
        }
    }

    /// Whether a row with the given feature value goes left.
    pub fn goes_left(&self, value: f64) -> bool {
        if value.is_nan() {
            self.default_left
        } else {
            value <= self.threshold
        }
    }
}

/// Leaf or split payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Terminal node with its output value
    Leaf {
        /// Output added to the prediction of rows reaching this leaf
        value: Score,
    },
    /// Internal node
    Split(SplitNode),
}

/// A node of a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    kind: NodeKind,
    parent: Option<NodeIndex>,
    stats: NodeStats,
    depth: usize,
}

impl TreeNode {
    /// Creates a new leaf node with a zero output.
    pub fn new_leaf(stats: NodeStats, depth: usize, parent: Option<NodeIndex>) -> Self {
        TreeNode {
            kind: NodeKind::Leaf { value: 0.0 },
            parent,
            stats,
            depth,
        }
    }

    /// Returns true if this node is a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Leaf output, if this node is a leaf.
    pub fn leaf_value(&self) -> Option<Score> {
        match self.kind {
            NodeKind::Leaf { value } => Some(value),
            NodeKind::Split(_) => None,
        }
    }

    /// Split information, if this node is internal.
    pub fn split(&self) -> Option<&SplitNode> {
        match &self.kind {
            NodeKind::Split(split) => Some(split),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Node payload.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent index (None for the root).
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Training statistics.
    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Hessian sum of the rows that reached this node.
    pub fn cover(&self) -> f64 {
        self.stats.sum_hessians
    }

    /// Depth of the node (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn set_leaf_value(&mut self, value: Score) {
        self.kind = NodeKind::Leaf { value };
    }

    pub(crate) fn set_split(&mut self, split: SplitNode) {
        self.kind = NodeKind::Split(split);
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Leaf { value } => write!(
                f,
                "Leaf(value={:.6}, cover={:.3}, count={})",
                value, self.stats.sum_hessians, self.stats.data_count
            ),
            NodeKind::Split(split) => write!(
                f,
                "Split(feature={}, threshold={:.6}, gain={:.6}, default_left={})",
                split.feature, split.threshold, split.gain, split.default_left
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_leaf() {
        let node = TreeNode::new_leaf(NodeStats::new(-4.0, 10.0, 10), 0, None);
        assert!(node.is_leaf());
        assert_eq!(node.leaf_value(), Some(0.0));
        assert_eq!(node.cover(), 10.0);
        assert!(node.split().is_none());
    }

    #[test]
    fn test_split_routing() {
        let split = SplitNode {
            feature: 0,
            threshold: 1.5,
            default_left: true,
            left: 1,
            right: 2,
            gain: 3.0,
        };
        assert_eq!(split.next(1.0), 1);
        assert_eq!(split.next(1.5), 1);
        assert_eq!(split.next(2.0), 2);
        assert_eq!(split.next(f64::NAN), 1);
    }

    #[test]
    fn test_stats_from_rows() {
        let gradients = [1.0, -2.0, 3.0];
        let hessians = [1.0, 1.0, 2.0];
        let stats = NodeStats::from_rows(&[0, 2], &gradients, &hessians);
        assert_eq!(stats, NodeStats::new(4.0, 3.0, 2));
    }

    #[test]
    fn test_serde_tagging() {
        let mut node = TreeNode::new_leaf(NodeStats::new(0.0, 1.0, 1), 1, Some(0));
        node.set_leaf_value(0.25);
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"leaf\""));
        let parsed: TreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, node);
    }
}
