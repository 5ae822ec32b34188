//! SHAP value computation.
//!
//! Implements the exact path-dependent TreeSHAP algorithm: for every row the
//! contribution of each feature is computed from the tree structure and the
//! training cover recorded on each node, with no background sample. The
//! contributions of a row plus the booster's expected value add up to the
//! booster's raw prediction for that row.

use crate::boosting::Booster;
use crate::core::error::{BoostError, Result};
use crate::core::types::{FeatureIndex, NodeIndex, Score};
use crate::dataset::FeatureFrame;
use crate::prediction::feature_importance::FeatureImportance;
use crate::tree::Tree;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-row feature attributions together with the inputs they explain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    values: Array2<f64>,
    base_values: Array1<f64>,
    data: Array2<f64>,
    feature_names: Vec<String>,
    instance_names: Vec<String>,
}

impl Explanation {
    /// Assemble an explanation, checking that all parts agree in shape.
    pub fn new(
        values: Array2<f64>,
        base_values: Array1<f64>,
        data: Array2<f64>,
        feature_names: Vec<String>,
        instance_names: Vec<String>,
    ) -> Result<Self> {
        if values.dim() != data.dim() {
            return Err(BoostError::dimension_mismatch(
                format!("SHAP values shaped like data {:?}", data.dim()),
                format!("{:?}", values.dim()),
            ));
        }
        if base_values.len() != values.nrows() || instance_names.len() != values.nrows() {
            return Err(BoostError::dimension_mismatch(
                format!("{} rows", values.nrows()),
                format!(
                    "{} base values and {} instance names",
                    base_values.len(),
                    instance_names.len()
                ),
            ));
        }
        if feature_names.len() != values.ncols() {
            return Err(BoostError::dimension_mismatch(
                format!("{} feature names", values.ncols()),
                format!("{} feature names", feature_names.len()),
            ));
        }

        Ok(Explanation {
            values,
            base_values,
            data,
            feature_names,
            instance_names,
        })
    }

    /// Attribution matrix (rows x features).
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Expected model output per row.
    pub fn base_values(&self) -> &Array1<f64> {
        &self.base_values
    }

    /// Feature values that were explained.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Column names of `values` and `data`.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Row identifiers.
    pub fn instance_names(&self) -> &[String] {
        &self.instance_names
    }

    /// Number of explained rows.
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Attributions of one row.
    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    /// `base_value + sum(values)` for every row.
    pub fn reconstructed_output(&self) -> Array1<f64> {
        self.values.sum_axis(Axis(1)) + &self.base_values
    }

    /// Mean absolute attribution per feature.
    pub fn mean_abs_importance(&self) -> Result<FeatureImportance> {
        let values = self
            .values
            .mapv(f64::abs)
            .mean_axis(Axis(0))
            .ok_or_else(|| BoostError::prediction("Cannot summarise an empty explanation"))?;
        FeatureImportance::new(self.feature_names.clone(), values)
    }
}

/// Path element for SHAP value computation
#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// Feature split on to reach this element (None for the root)
    feature_index: Option<FeatureIndex>,
    /// Fraction of cover flowing this way when the feature is unknown
    zero_fraction: f64,
    /// 1.0 if the row follows this branch, 0.0 otherwise
    one_fraction: f64,
    /// Permutation weight
    pweight: f64,
}

/// Computes SHAP values for a trained booster.
#[derive(Debug, Clone, Copy)]
pub struct TreeExplainer<'a> {
    booster: &'a Booster,
}

impl<'a> TreeExplainer<'a> {
    /// Create an explainer for `booster`.
    pub fn new(booster: &'a Booster) -> Self {
        TreeExplainer { booster }
    }

    /// Expected raw prediction over the training distribution.
    pub fn expected_value(&self) -> Score {
        self.booster.expected_value()
    }

    /// SHAP values for rows already in booster feature order.
    pub fn shap_values(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let num_features = self.booster.num_features();
        if features.ncols() != num_features {
            return Err(BoostError::dimension_mismatch(
                format!("{} feature columns", num_features),
                format!("{} feature columns", features.ncols()),
            ));
        }

        let rows: Vec<Vec<f64>> = (0..features.nrows())
            .into_par_iter()
            .map(|row| {
                let mut phi = vec![0.0; num_features];
                let feature_values = features.row(row);
                for tree in self.booster.trees() {
                    tree_shap(tree, feature_values, &mut phi);
                }
                phi
            })
            .collect();

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((features.nrows(), num_features), flat)
            .map_err(|e| BoostError::prediction(e.to_string()))
    }

    /// Explain a frame, aligning its columns to the booster's features first.
    pub fn explain(&self, frame: &FeatureFrame) -> Result<Explanation> {
        let aligned = frame.select(self.booster.feature_names())?;
        self.explain_aligned(&aligned)
    }

    /// Explain a frame whose columns already match the booster's features.
    pub fn explain_aligned(&self, aligned: &FeatureFrame) -> Result<Explanation> {
        let values = self.shap_values(aligned.values())?;
        let base_values = Array1::from_elem(aligned.nrows(), self.expected_value());
        Explanation::new(
            values,
            base_values,
            aligned.values().to_owned(),
            aligned.columns().to_vec(),
            aligned.index().to_vec(),
        )
    }
}

/// Adds the contributions of one tree for one row to `phi`.
pub fn tree_shap(tree: &Tree, feature_values: ArrayView1<'_, f64>, phi: &mut [f64]) {
    recurse(tree, feature_values, phi, 0, &[], 1.0, 1.0, None);
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    feature_values: ArrayView1<'_, f64>,
    phi: &mut [f64],
    node_index: NodeIndex,
    parent_path: &[PathElement],
    zero_fraction: f64,
    one_fraction: f64,
    feature_index: Option<FeatureIndex>,
) {
    let mut path = parent_path.to_vec();
    extend_path(&mut path, zero_fraction, one_fraction, feature_index);
    let unique_depth = path.len() - 1;

    let node = &tree.nodes()[node_index];
    let split = match node.split() {
        None => {
            let leaf_value = node.leaf_value().unwrap_or(0.0);
            for i in 1..=unique_depth {
                let weight = unwound_path_sum(&path, i);
                let element = &path[i];
                if let Some(feature) = element.feature_index {
                    phi[feature] +=
                        weight * (element.one_fraction - element.zero_fraction) * leaf_value;
                }
            }
            return;
        }
        Some(split) => split,
    };

    let hot = split.next(feature_values[split.feature]);
    let cold = if hot == split.left { split.right } else { split.left };
    let hot_zero_fraction = tree.cover_fraction(node_index, hot);
    let cold_zero_fraction = tree.cover_fraction(node_index, cold);

    let mut incoming_zero_fraction = 1.0;
    let mut incoming_one_fraction = 1.0;

    // A feature seen earlier on the path is folded back in rather than counted twice.
    if let Some(position) = path
        .iter()
        .skip(1)
        .position(|element| element.feature_index == Some(split.feature))
    {
        let path_index = position + 1;
        incoming_zero_fraction = path[path_index].zero_fraction;
        incoming_one_fraction = path[path_index].one_fraction;
        unwind_path(&mut path, path_index);
    }

    recurse(
        tree,
        feature_values,
        phi,
        hot,
        &path,
        hot_zero_fraction * incoming_zero_fraction,
        incoming_one_fraction,
        Some(split.feature),
    );
    recurse(
        tree,
        feature_values,
        phi,
        cold,
        &path,
        cold_zero_fraction * incoming_zero_fraction,
        0.0,
        Some(split.feature),
    );
}

fn extend_path(
    path: &mut Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature_index: Option<FeatureIndex>,
) {
    let unique_depth = path.len();
    path.push(PathElement {
        feature_index,
        zero_fraction,
        one_fraction,
        pweight: if unique_depth == 0 { 1.0 } else { 0.0 },
    });

    for i in (0..unique_depth).rev() {
        path[i + 1].pweight +=
            one_fraction * path[i].pweight * (i + 1) as f64 / (unique_depth + 1) as f64;
        path[i].pweight =
            zero_fraction * path[i].pweight * (unique_depth - i) as f64 / (unique_depth + 1) as f64;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, path_index: usize) {
    let unique_depth = path.len() - 1;
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let previous = path[i].pweight;
            path[i].pweight =
                next_one_portion * (unique_depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
            next_one_portion = previous
                - path[i].pweight * zero_fraction * (unique_depth - i) as f64
                    / (unique_depth + 1) as f64;
        } else {
            path[i].pweight = path[i].pweight * (unique_depth + 1) as f64
                / (zero_fraction * (unique_depth - i) as f64);
        }
    }

    for i in path_index..unique_depth {
        path[i].feature_index = path[i + 1].feature_index;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

fn unwound_path_sum(path: &[PathElement], path_index: usize) -> f64 {
    let unique_depth = path.len() - 1;
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;
    let mut total = 0.0;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let portion =
                next_one_portion * (unique_depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
            total += portion;
            next_one_portion = path[i].pweight
                - portion * zero_fraction * (unique_depth - i) as f64 / (unique_depth + 1) as f64;
        } else if zero_fraction != 0.0 {
            total += path[i].pweight / zero_fraction
                / ((unique_depth - i) as f64 / (unique_depth + 1) as f64);
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeStats;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// x0 <= 0.5 -> (x1 <= 0.5 -> 1.0 | 3.0), else x1 <= 0.5 -> 5.0 | 9.0, equal covers.
    fn two_feature_tree() -> Tree {
        let mut tree = Tree::new(NodeStats::new(0.0, 4.0, 4));
        let (left, right) = tree
            .split_node(0, 0, 0.5, 1.0, true, NodeStats::new(0.0, 2.0, 2), NodeStats::new(0.0, 2.0, 2))
            .unwrap();
        let (ll, lr) = tree
            .split_node(left, 1, 0.5, 1.0, true, NodeStats::new(0.0, 1.0, 1), NodeStats::new(0.0, 1.0, 1))
            .unwrap();
        let (rl, rr) = tree
            .split_node(right, 1, 0.5, 1.0, true, NodeStats::new(0.0, 1.0, 1), NodeStats::new(0.0, 1.0, 1))
            .unwrap();
        for (leaf, value) in [(ll, 1.0), (lr, 3.0), (rl, 5.0), (rr, 9.0)] {
            tree.set_leaf_value(leaf, value).unwrap();
        }
        tree
    }

    fn shap_of(tree: &Tree, row: ArrayView1<'_, f64>) -> Vec<f64> {
        let mut phi = vec![0.0; row.len()];
        tree_shap(tree, row, &mut phi);
        phi
    }

    #[test]
    fn test_local_accuracy() {
        let tree = two_feature_tree();
        for row in [array![0.0, 0.0], array![0.0, 1.0], array![1.0, 0.0], array![1.0, 1.0]] {
            let phi = shap_of(&tree, row.view());
            let total: f64 = phi.iter().sum::<f64>() + tree.expected_value();
            assert_abs_diff_eq!(total, tree.predict(row.view()), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_matches_exact_shapley_values() {
        // E[f] = 4.5, E[f | x0 = 1] = 7, E[f | x1 = 1] = 6, f(1, 1) = 9.
        let tree = two_feature_tree();
        let phi = shap_of(&tree, array![1.0, 1.0].view());
        assert_abs_diff_eq!(phi[0], 2.75, epsilon = 1e-12);
        assert_abs_diff_eq!(phi[1], 1.75, epsilon = 1e-12);
    }

    #[test]
    fn test_repeated_feature_on_path() {
        let mut tree = Tree::new(NodeStats::new(0.0, 4.0, 4));
        let (left, right) = tree
            .split_node(0, 0, 2.0, 1.0, true, NodeStats::new(0.0, 2.0, 2), NodeStats::new(0.0, 2.0, 2))
            .unwrap();
        let (ll, lr) = tree
            .split_node(left, 0, 1.0, 1.0, true, NodeStats::new(0.0, 1.0, 1), NodeStats::new(0.0, 1.0, 1))
            .unwrap();
        tree.set_leaf_value(ll, -2.0).unwrap();
        tree.set_leaf_value(lr, 0.0).unwrap();
        tree.set_leaf_value(right, 4.0).unwrap();

        for x in [0.5, 1.5, 3.0] {
            let row = array![x, 7.0];
            let phi = shap_of(&tree, row.view());
            assert_eq!(phi[1], 0.0);
            assert_abs_diff_eq!(
                phi[0] + tree.expected_value(),
                tree.predict(row.view()),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_single_leaf_tree_contributes_nothing() {
        let mut tree = Tree::new(NodeStats::new(0.0, 3.0, 3));
        tree.set_leaf_value(0, 2.5).unwrap();
        let phi = shap_of(&tree, array![1.0, 2.0].view());
        assert_eq!(phi, vec![0.0, 0.0]);
        assert_eq!(tree.expected_value(), 2.5);
    }

    #[test]
    fn test_explanation_shape_checks() {
        let values = array![[0.5, -0.5]];
        let ok = Explanation::new(
            values.clone(),
            array![1.0],
            array![[1.0, 2.0]],
            vec!["a".into(), "b".into()],
            vec!["r0".into()],
        )
        .unwrap();
        assert_eq!(ok.reconstructed_output(), array![1.0]);
        let importance = ok.mean_abs_importance().unwrap();
        assert_eq!(importance.get("a"), Some(0.5));

        assert!(Explanation::new(
            values,
            array![1.0, 2.0],
            array![[1.0, 2.0]],
            vec!["a".into(), "b".into()],
            vec!["r0".into()],
        )
        .is_err());
    }
}
