//! Feature importance calculation.
//!
//! Importance is accumulated over every split of every tree and reported as a
//! dense vector over the booster's full feature list, so features that were
//! never split on score zero.

use crate::core::error::{BoostError, Result};
use crate::core::types::ImportanceType;
use crate::tree::Tree;
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-feature importance scores aligned to a feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    names: Vec<String>,
    values: Array1<f64>,
}

impl FeatureImportance {
    /// Pair feature names with their scores.
    pub fn new(names: Vec<String>, values: Array1<f64>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(BoostError::dimension_mismatch(
                format!("{} importance values", names.len()),
                format!("{} importance values", values.len()),
            ));
        }
        Ok(FeatureImportance { names, values })
    }

    /// Importance of the trees in `trees` over `names`.
    pub fn from_trees(names: Vec<String>, trees: &[Tree], importance_type: ImportanceType) -> Self {
        let values = calculate_importance(trees, names.len(), importance_type);
        FeatureImportance { names, values }
    }

    /// Elementwise mean of several importance vectors.
    ///
    /// Every input must carry the same feature names in the same order.
    pub fn mean(importances: &[FeatureImportance]) -> Result<Self> {
        let first = importances
            .first()
            .ok_or_else(|| BoostError::not_fitted("feature importance"))?;

        for (index, importance) in importances.iter().enumerate().skip(1) {
            if importance.names != first.names {
                return Err(BoostError::FeatureAlignment {
                    index,
                    expected: first.names.clone(),
                    found: importance.names.clone(),
                });
            }
        }

        let views: Vec<_> = importances.iter().map(|imp| imp.values.view()).collect();
        let stacked = ndarray::stack(Axis(0), &views)
            .map_err(|e| BoostError::prediction(e.to_string()))?;
        let values = stacked
            .mean_axis(Axis(0))
            .ok_or_else(|| BoostError::prediction("Cannot average zero importance vectors"))?;

        Ok(FeatureImportance {
            names: first.names.clone(),
            values,
        })
    }

    /// Feature names in booster order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Scores in booster order.
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the importance covers no features.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Score of a feature by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|position| self.values[position])
    }

    /// (name, score) pairs in booster order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Scores keyed by feature name.
    pub fn to_map(&self) -> HashMap<String, f64> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// (name, score) pairs ordered from most to least important.
    pub fn sorted(&self) -> Vec<(String, f64)> {
        let mut ranking: Vec<(String, f64)> = self
            .iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }
}

/// Dense importance vector over `num_features` features.
pub fn calculate_importance(
    trees: &[Tree],
    num_features: usize,
    importance_type: ImportanceType,
) -> Array1<f64> {
    let mut counts = Array1::<f64>::zeros(num_features);
    let mut totals = Array1::<f64>::zeros(num_features);

    for tree in trees {
        for (node, split) in tree.splits() {
            counts[split.feature] += 1.0;
            totals[split.feature] += match importance_type {
                ImportanceType::Split => 1.0,
                ImportanceType::Gain | ImportanceType::TotalGain => split.gain,
                ImportanceType::Cover | ImportanceType::TotalCover => node.cover(),
            };
        }
    }

    match importance_type {
        ImportanceType::Split | ImportanceType::TotalGain | ImportanceType::TotalCover => totals,
        ImportanceType::Gain | ImportanceType::Cover => {
            ndarray::Zip::from(&totals)
                .and(&counts)
                .map_collect(|&total, &count| if count > 0.0 { total / count } else { 0.0 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeStats;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn two_split_tree() -> Tree {
        let mut tree = Tree::new(NodeStats::new(0.0, 8.0, 8));
        let (_, right) = tree
            .split_node(0, 0, 0.5, 6.0, true, NodeStats::new(1.0, 4.0, 4), NodeStats::new(-1.0, 4.0, 4))
            .unwrap();
        tree.split_node(right, 0, 1.5, 2.0, true, NodeStats::new(0.0, 1.0, 1), NodeStats::new(-1.0, 3.0, 3))
            .unwrap();
        tree
    }

    #[test]
    fn test_importance_types() {
        let trees = vec![two_split_tree()];
        assert_eq!(calculate_importance(&trees, 2, ImportanceType::Split), array![2.0, 0.0]);
        assert_eq!(calculate_importance(&trees, 2, ImportanceType::TotalGain), array![8.0, 0.0]);
        assert_eq!(calculate_importance(&trees, 2, ImportanceType::Gain), array![4.0, 0.0]);
        assert_eq!(calculate_importance(&trees, 2, ImportanceType::TotalCover), array![12.0, 0.0]);
        assert_eq!(calculate_importance(&trees, 2, ImportanceType::Cover), array![6.0, 0.0]);
    }

    #[test]
    fn test_lookup_and_ranking() {
        let importance = FeatureImportance::new(names(&["a", "b", "c"]), array![1.0, 3.0, 2.0]).unwrap();
        assert_eq!(importance.get("b"), Some(3.0));
        assert_eq!(importance.get("z"), None);
        let ranked: Vec<String> = importance.sorted().into_iter().map(|(n, _)| n).collect();
        assert_eq!(ranked, names(&["b", "c", "a"]));
        assert_eq!(importance.to_map().len(), 3);
    }

    #[test]
    fn test_mean_requires_identical_features() {
        let a = FeatureImportance::new(names(&["x", "y"]), array![1.0, 2.0]).unwrap();
        let b = FeatureImportance::new(names(&["x", "y"]), array![3.0, 0.0]).unwrap();
        let mean = FeatureImportance::mean(&[a.clone(), b]).unwrap();
        assert_abs_diff_eq!(mean.values()[0], 2.0);
        assert_abs_diff_eq!(mean.values()[1], 1.0);

        let reordered = FeatureImportance::new(names(&["y", "x"]), array![1.0, 2.0]).unwrap();
        assert!(matches!(
            FeatureImportance::mean(&[a.clone(), reordered]),
            Err(BoostError::FeatureAlignment { index: 1, .. })
        ));

        assert_eq!(FeatureImportance::mean(&[a.clone()]).unwrap(), a);
        assert!(FeatureImportance::mean(&[]).is_err());
    }
}
