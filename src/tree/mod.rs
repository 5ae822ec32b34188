//! Regression tree construction and representation.
//!
//! - [`node`]: leaf/split nodes with their training statistics
//! - [`tree`]: the tree container, prediction and cover-weighted expectation
//! - [`split`]: regularised gain and leaf-output formulas
//! - [`learner`]: exact greedy, depth-wise tree growth
//! - [`sampling`]: per-tree row and column subsampling

pub mod learner;
pub mod node;
pub mod sampling;
pub mod split;
pub mod tree;

pub use learner::{TreeLearner, TreeLearnerConfig};
pub use node::{NodeKind, NodeStats, SplitNode, TreeNode};
pub use sampling::TreeSampler;
pub use split::{SplitEvaluator, SplitInfo};
pub use tree::Tree;
