//! Training container consumed by the boosting engine.

use crate::core::error::{BoostError, Result};
use crate::core::types::Label;
use crate::dataset::frame::FeatureFrame;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Feature matrix, labels and feature names for one training or validation set.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<Label>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Create a dataset from raw arrays.
    ///
    /// Labels must be finite and match the number of feature rows. Features
    /// may contain `NaN` for missing values.
    pub fn new(
        features: Array2<f64>,
        labels: Array1<Label>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if features.nrows() == 0 {
            return Err(BoostError::dataset("Dataset has no rows"));
        }

        if features.ncols() == 0 {
            return Err(BoostError::dataset("Dataset has no feature columns"));
        }

        if labels.len() != features.nrows() {
            return Err(BoostError::dimension_mismatch(
                format!("{} labels", features.nrows()),
                format!("{} labels", labels.len()),
            ));
        }

        if feature_names.len() != features.ncols() {
            return Err(BoostError::dimension_mismatch(
                format!("{} feature names", features.ncols()),
                format!("{} feature names", feature_names.len()),
            ));
        }

        if let Some(position) = labels.iter().position(|label| !label.is_finite()) {
            return Err(BoostError::dataset(format!(
                "Label at row {} is not finite",
                position
            )));
        }

        if features.iter().any(|value| value.is_infinite()) {
            return Err(BoostError::dataset("Features contain infinite values"));
        }

        Ok(Dataset {
            features,
            labels,
            feature_names,
        })
    }

    /// Create a dataset from a feature frame and its target vector.
    pub fn from_frame(frame: &FeatureFrame, labels: ArrayView1<'_, Label>) -> Result<Self> {
        Self::new(
            frame.values().to_owned(),
            labels.to_owned(),
            frame.columns().to_vec(),
        )
    }

    /// Feature matrix.
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Labels.
    pub fn labels(&self) -> ArrayView1<'_, Label> {
        self.labels.view()
    }

    /// Feature names.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of rows.
    pub fn num_data(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns.
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    /// Mean of the labels.
    pub fn label_mean(&self) -> f64 {
        self.labels.sum() / self.labels.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_dataset_creation() {
        let dataset = Dataset::new(array![[1.0, 2.0], [3.0, f64::NAN]], array![1.0, 3.0], names(2)).unwrap();
        assert_eq!(dataset.num_data(), 2);
        assert_eq!(dataset.num_features(), 2);
        assert_eq!(dataset.label_mean(), 2.0);
    }

    #[test]
    fn test_dataset_validation() {
        assert!(Dataset::new(array![[1.0], [2.0]], array![1.0], names(1)).is_err());
        assert!(Dataset::new(array![[1.0], [2.0]], array![1.0, f64::NAN], names(1)).is_err());
        assert!(Dataset::new(array![[1.0], [2.0]], array![1.0, 2.0], names(2)).is_err());
        assert!(Dataset::new(array![[f64::INFINITY]], array![1.0], names(1)).is_err());
        assert!(Dataset::new(Array2::zeros((0, 1)), Array1::zeros(0), names(1)).is_err());
    }

    #[test]
    fn test_from_frame() {
        let frame = FeatureFrame::new(vec!["x", "y"], array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let dataset = Dataset::from_frame(&frame, array![0.5, 1.5].view()).unwrap();
        assert_eq!(dataset.feature_names(), &["x", "y"]);
        assert_eq!(dataset.labels(), array![0.5, 1.5]);
    }
}
