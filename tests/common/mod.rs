//! Common test utilities for boost-ensemble integration tests.

#![allow(dead_code)]

use boost_ensemble::*;
use ndarray::{Array1, Array2};
use rand::prelude::*;

/// Feature names `x0`, `x1`, ...
pub fn feature_names(num_features: usize) -> Vec<String> {
    (0..num_features).map(|j| format!("x{}", j)).collect()
}

/// Create test features for regression tasks
pub fn create_test_features_regression(
    num_samples: usize,
    num_features: usize,
    seed: u64,
) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((num_samples, num_features), |_| rng.gen_range(-5.0..5.0))
}

/// Create test labels for regression based on features
pub fn create_test_labels_regression(features: &Array2<f64>) -> Array1<f64> {
    features
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(j, x)| x * (j + 1) as f64 * 0.5)
                .sum::<f64>()
                + if row[0] > 0.0 { 3.0 } else { -3.0 }
        })
        .collect()
}

/// Named regression frame with its target.
pub fn regression_frame(
    num_samples: usize,
    num_features: usize,
    seed: u64,
) -> (FeatureFrame, Array1<f64>) {
    let features = create_test_features_regression(num_samples, num_features, seed);
    let labels = create_test_labels_regression(&features);
    let frame = FeatureFrame::new(feature_names(num_features), features).unwrap();
    (frame, labels)
}

/// Train/validation split drawn from independent seeds.
pub fn regression_split(num_samples: usize, num_features: usize, seed: u64) -> DataSplit {
    let (train_x, train_y) = regression_frame(num_samples, num_features, seed);
    let (valid_x, valid_y) = regression_frame(num_samples / 4 + 1, num_features, seed + 1000);
    DataSplit::new(train_x, train_y, valid_x, valid_y)
}

/// Small, fast parameter set with row and column sampling enabled.
pub fn test_params() -> ModelParams {
    let booster = BoosterParamsBuilder::new()
        .learning_rate(0.2)
        .max_depth(3)
        .subsample(0.8)
        .colsample_bytree(0.8)
        .build()
        .unwrap();
    ModelParams::new(booster, TrainingControl::new(25, Some(5)))
}

/// Ensemble of `members` boosters fitted on independent splits.
pub fn fitted_ensemble(members: usize, fix_seed: bool) -> EnsembleModel {
    let splits: Vec<DataSplit> = (0..members)
        .map(|i| regression_split(80, 3, 7 + i as u64))
        .collect();
    let mut ensemble = EnsembleModel::new(test_params());
    ensemble.fit(&splits, fix_seed).unwrap();
    ensemble
}
