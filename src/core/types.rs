//! Core data types for boost-ensemble.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prediction, gradient and leaf value type.
pub type Score = f64;

/// Target value type.
pub type Label = f64;

/// Feature index type for identifying columns of a dataset.
pub type FeatureIndex = usize;

/// Tree node identifier type.
pub type NodeIndex = usize;

/// Iteration number type for boosting rounds.
pub type IterationIndex = usize;

/// Regression objectives supported by the boosting engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObjectiveType {
    /// Squared error loss
    #[default]
    #[serde(rename = "reg:squarederror", alias = "regression", alias = "l2")]
    SquaredError,
    /// Pseudo-Huber loss, robust to outlying targets
    #[serde(rename = "reg:pseudohubererror", alias = "huber")]
    PseudoHuber,
}

impl fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveType::SquaredError => write!(f, "reg:squarederror"),
            ObjectiveType::PseudoHuber => write!(f, "reg:pseudohubererror"),
        }
    }
}

/// Validation metric used for early stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Root Mean Squared Error
    #[default]
    Rmse,
    /// Mean Absolute Error
    Mae,
}

impl MetricType {
    /// Lower metric values are better for every supported metric.
    pub fn higher_is_better(&self) -> bool {
        false
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricType::Rmse => write!(f, "rmse"),
            MetricType::Mae => write!(f, "mae"),
        }
    }
}

/// Feature importance calculation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceType {
    /// Number of splits on the feature
    Split,
    /// Average loss reduction of the splits on the feature
    #[default]
    Gain,
    /// Total loss reduction of the splits on the feature
    TotalGain,
    /// Average hessian cover of the splits on the feature
    Cover,
    /// Total hessian cover of the splits on the feature
    TotalCover,
}

impl fmt::Display for ImportanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportanceType::Split => "split",
            ImportanceType::Gain => "gain",
            ImportanceType::TotalGain => "total_gain",
            ImportanceType::Cover => "cover",
            ImportanceType::TotalCover => "total_cover",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_serde_names() {
        let json = serde_json::to_string(&ObjectiveType::SquaredError).unwrap();
        assert_eq!(json, "\"reg:squarederror\"");
        let parsed: ObjectiveType = serde_json::from_str("\"huber\"").unwrap();
        assert_eq!(parsed, ObjectiveType::PseudoHuber);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ObjectiveType::default(), ObjectiveType::SquaredError);
        assert_eq!(MetricType::default(), MetricType::Rmse);
        assert_eq!(ImportanceType::default(), ImportanceType::Gain);
    }

    #[test]
    fn test_display() {
        assert_eq!(MetricType::Mae.to_string(), "mae");
        assert_eq!(ImportanceType::TotalGain.to_string(), "total_gain");
        assert_eq!(ObjectiveType::PseudoHuber.to_string(), "reg:pseudohubererror");
    }
}
