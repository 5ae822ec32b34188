//! Boosting-loop control parameters.

use crate::core::constants::DEFAULT_NUM_BOOST_ROUND;
use crate::core::error::{BoostError, Result};

use serde::{Deserialize, Serialize};

/// Parameters that govern the boosting loop rather than any single tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingControl {
    /// Maximum number of boosting rounds
    #[serde(alias = "n_estimators")]
    pub num_boost_round: usize,
    /// Stop after this many rounds without validation improvement
    pub early_stopping_rounds: Option<usize>,
    /// Log every round's validation metric at info level instead of debug
    pub verbose_eval: bool,
}

impl Default for TrainingControl {
    fn default() -> Self {
        TrainingControl {
            num_boost_round: DEFAULT_NUM_BOOST_ROUND,
            early_stopping_rounds: None,
            verbose_eval: false,
        }
    }
}

impl TrainingControl {
    /// Create a control block with the given round budget and patience.
    pub fn new(num_boost_round: usize, early_stopping_rounds: Option<usize>) -> Self {
        TrainingControl {
            num_boost_round,
            early_stopping_rounds,
            verbose_eval: false,
        }
    }

    /// Whether early stopping is enabled
    pub fn is_early_stopping_enabled(&self) -> bool {
        self.early_stopping_rounds.is_some()
    }

    /// Validate the control block.
    pub fn validate(&self) -> Result<()> {
        if self.num_boost_round == 0 {
            return Err(BoostError::invalid_parameter(
                "num_boost_round",
                "0",
                "at least one boosting round is required",
            ));
        }

        if self.early_stopping_rounds == Some(0) {
            return Err(BoostError::invalid_parameter(
                "early_stopping_rounds",
                "0",
                "patience must be at least one round",
            ));
        }

        Ok(())
    }
}
