//! Error handling and error types for boost-ensemble.
//!
//! Every fallible operation in the crate returns [`Result`], so errors raised
//! deep inside tree learning or model file parsing reach the caller of
//! `fit`/`predict`/`load_model` unchanged.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum BoostError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dataset-related errors
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Columns a model was trained on are absent from the supplied table
    #[error("Feature mismatch: test data is missing model features {missing:?}")]
    FeatureMismatch { missing: Vec<String> },

    /// Boosters disagree on the feature ordering an aggregate needs
    #[error("Feature alignment error: booster {index} was trained on {found:?}, expected {expected:?}")]
    FeatureAlignment {
        index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A query was issued before any successful fit or load
    #[error("Model not fitted: {operation} requires a trained model")]
    NotFitted { operation: String },

    /// `load_model` found no index-0 model file
    #[error("No models found in {}", .path.display())]
    NoModelsFound { path: PathBuf },

    /// Training-related errors
    #[error("Training error: {message}")]
    Training { message: String },

    /// Prediction errors
    #[error("Prediction error: {message}")]
    Prediction { message: String },

    /// Model serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// TOML configuration parsing errors
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },

    /// Polars conversion errors
    #[cfg(feature = "polars")]
    #[error("Polars error: {source}")]
    Polars {
        #[from]
        source: polars::error::PolarsError,
    },
}

/// Type alias for Results using BoostError
pub type Result<T> = std::result::Result<T, BoostError>;

impl BoostError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        BoostError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        BoostError::Dataset {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        BoostError::Training {
            message: message.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction<S: Into<String>>(message: S) -> Self {
        BoostError::Prediction {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        BoostError::Serialization {
            message: message.into(),
        }
    }

    /// Create a not-fitted error for the named operation
    pub fn not_fitted<S: Into<String>>(operation: S) -> Self {
        BoostError::NotFitted {
            operation: operation.into(),
        }
    }

    /// Create a feature mismatch error listing the absent columns
    pub fn feature_mismatch(missing: Vec<String>) -> Self {
        BoostError::FeatureMismatch { missing }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        BoostError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        BoostError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BoostError::Config { .. } => "config",
            BoostError::InvalidParameter { .. } => "invalid_parameter",
            BoostError::Dataset { .. } => "dataset",
            BoostError::DimensionMismatch { .. } => "dimension_mismatch",
            BoostError::FeatureMismatch { .. } | BoostError::FeatureAlignment { .. } => {
                "feature_mismatch"
            }
            BoostError::NotFitted { .. } => "not_fitted",
            BoostError::NoModelsFound { .. } => "no_models_found",
            BoostError::Training { .. } => "training",
            BoostError::Prediction { .. } => "prediction",
            BoostError::Serialization { .. } => "serialization",
            BoostError::IO { .. } => "io",
            BoostError::Json { .. } => "json",
            BoostError::Toml { .. } => "toml",
            #[cfg(feature = "polars")]
            BoostError::Polars { .. } => "polars",
        }
    }

    /// Whether the caller can retry the operation with corrected input.
    ///
    /// Mismatched tables and unfitted models are fixed by the caller; a missing
    /// model directory or a corrupt model file is terminal for that path.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BoostError::FeatureMismatch { .. }
                | BoostError::DimensionMismatch { .. }
                | BoostError::NotFitted { .. }
                | BoostError::InvalidParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BoostError::config("test config error");
        assert!(matches!(err, BoostError::Config { .. }));
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_feature_mismatch_display() {
        let err = BoostError::feature_mismatch(vec!["age".to_string(), "dose".to_string()]);
        let message = err.to_string();
        assert!(message.contains("age"));
        assert!(message.contains("dose"));
        assert_eq!(err.category(), "feature_mismatch");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_no_models_found_display() {
        let err = BoostError::NoModelsFound {
            path: PathBuf::from("/tmp/models"),
        };
        assert_eq!(err.to_string(), "No models found in /tmp/models");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: BoostError = io_err.into();
        assert!(matches!(err, BoostError::IO { .. }));
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_invalid_parameter_formatting() {
        let err = BoostError::invalid_parameter("learning_rate", "-0.1", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: learning_rate = -0.1, must be positive"
        );
    }
}
