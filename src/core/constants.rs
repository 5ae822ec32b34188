//! Default configuration values and engine-wide constants.

/// Default learning rate (shrinkage) applied to every leaf weight.
pub const DEFAULT_LEARNING_RATE: f64 = 0.3;

/// Default maximum tree depth. Zero means no limit.
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// Default minimum hessian sum required in each child of a split.
pub const DEFAULT_MIN_CHILD_WEIGHT: f64 = 1.0;

/// Default minimum loss reduction required to make a split.
pub const DEFAULT_MIN_SPLIT_LOSS: f64 = 0.0;

/// Default L2 regularization on leaf weights.
pub const DEFAULT_REG_LAMBDA: f64 = 1.0;

/// Default L1 regularization on leaf weights.
pub const DEFAULT_REG_ALPHA: f64 = 0.0;

/// Default fraction of rows sampled for each tree.
pub const DEFAULT_SUBSAMPLE: f64 = 1.0;

/// Default fraction of columns sampled for each tree.
pub const DEFAULT_COLSAMPLE_BYTREE: f64 = 1.0;

/// Default slope parameter of the pseudo-Huber loss.
pub const DEFAULT_HUBER_SLOPE: f64 = 1.0;

/// Default number of boosting rounds.
pub const DEFAULT_NUM_BOOST_ROUND: usize = 100;

/// Default random seed for reproducibility.
pub const DEFAULT_RANDOM_SEED: u64 = 0;

/// Smallest gain treated as a real improvement when splitting.
pub const K_EPSILON: f64 = 1e-15;

/// Extension of per-booster model files.
pub const MODEL_FILE_EXTENSION: &str = "json";

/// Version of the model file envelope written by `save_model`.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Crate version recorded in saved model files.
pub const BOOST_ENSEMBLE_VERSION: &str = env!("CARGO_PKG_VERSION");
