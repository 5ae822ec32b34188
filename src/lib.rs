//! # boost-ensemble
//!
//! Ensembles of gradient-boosted regression trees, written in pure Rust.
//!
//! Each member of an ensemble is a depth-wise boosted tree model trained on
//! its own train/validation split with validation-based early stopping. The
//! ensemble averages member predictions, reports their spread as a population
//! standard deviation, averages exact TreeSHAP attributions and gain
//! importances, and persists members as numbered JSON files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boost_ensemble::{DataSplit, EnsembleModel, FeatureFrame, ModelParams, PredictOptions};
//! use ndarray::{Array1, Array2};
//!
//! # fn main() -> boost_ensemble::Result<()> {
//! boost_ensemble::init()?;
//!
//! let values = Array2::from_shape_fn((100, 2), |(i, j)| (i * (j + 1)) as f64);
//! let target: Array1<f64> = values.column(0).mapv(|x| 0.5 * x);
//! let frame = FeatureFrame::new(vec!["x0", "x1"], values)?;
//!
//! let split = DataSplit::new(frame.clone(), target.clone(), frame.clone(), target);
//! let mut ensemble = EnsembleModel::new(ModelParams::default());
//! ensemble.fit(&[split.clone(), split], true)?;
//!
//! let output = ensemble.predict(&frame, PredictOptions::new().with_std(true).with_shap(true))?;
//! println!("first prediction {}", output.predictions[0]);
//!
//! ensemble.save_model("models")?;
//! let restored = EnsembleModel::load_model("models")?;
//! assert_eq!(restored.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: score types, defaults, the error type and logging initialisation
//! - [`config`]: booster parameters and boosting-loop control
//! - [`dataset`]: named feature frames and the training [`Dataset`]
//! - [`tree`]: regression trees and the exact greedy tree learner
//! - [`boosting`]: objectives, early stopping and the boosting loop
//! - [`metrics_eval`]: regression metrics
//! - [`prediction`]: TreeSHAP, feature importance and prediction outputs
//! - [`io`]: booster model files
//! - [`model`]: the single-booster regressor
//! - [`ensemble`]: the multi-booster ensemble

#![doc(html_root_url = "https://docs.rs/boost-ensemble/")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Dataset management module
pub mod dataset;

// Tree structures and learner
pub mod tree;

// Boosting module
pub mod boosting;

// Metrics evaluation module
pub mod metrics_eval;

// Prediction module
pub mod prediction;

// Model persistence
pub mod io;

// Single-booster model
pub mod model;

// Model ensemble module
pub mod ensemble;

// Re-export core functionality for convenience
pub use self::core::{
    constants::*,
    error::{BoostError, Result},
    types::*,
};

// Re-export configuration functionality
pub use config::{BoosterParams, BoosterParamsBuilder, ModelParams, TrainingControl};

// Re-export dataset functionality
pub use dataset::{Dataset, FeatureFrame};

// Re-export boosting functionality
pub use boosting::{train, Booster, ObjectiveFunction};

// Re-export metrics evaluation functionality
pub use metrics_eval::{evaluate_metric, evaluate_regression, RegressionMetrics};

// Re-export prediction functionality
pub use prediction::{
    Explanation, FeatureImportance, PredictOptions, PredictionOutput, TreeExplainer,
};

// Re-export model functionality
pub use ensemble::{DataSplit, EnsembleModel};
pub use model::SingleModel;

// Version information
pub use self::core::constants::BOOST_ENSEMBLE_VERSION as VERSION;

/// Initialize the library.
///
/// Installs the `env_logger` backend for the `log` facade, honouring
/// `RUST_LOG`. Calling it is optional and idempotent; without it, log records
/// go to whatever logger the host application installed.
///
/// # Examples
///
/// ```rust
/// fn main() -> boost_ensemble::Result<()> {
///     boost_ensemble::init()?;
///     assert!(boost_ensemble::is_initialized());
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    core::initialize_core()
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    core::is_core_initialized()
}
