//! Configuration management for boost-ensemble.
//!
//! Hyperparameters are split into two explicit structures:
//!
//! - [`BoosterParams`]: everything that shapes a tree or the loss
//! - [`TrainingControl`]: the boosting-loop round budget and early-stopping patience
//!
//! [`ModelParams`] bundles both. It can be read from a sectioned TOML/JSON
//! file (`[booster]` / `[training]` tables) or from a flat XGBoost-style
//! mapping in which `n_estimators` and `early_stopping_rounds` sit next to the
//! tree parameters; the flat form is split into the two structures on load.

pub mod core;
pub mod training;

pub use self::core::{BoosterParams, BoosterParamsBuilder};
pub use self::training::TrainingControl;

use crate::core::error::{BoostError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default parameter file name.
pub const DEFAULT_CONFIG_FILE: &str = "boost_ensemble.toml";

const SECTION_KEYS: [&str; 2] = ["booster", "training"];

/// Full set of parameters for training one booster.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Tree and objective parameters
    pub booster: BoosterParams,
    /// Boosting-loop parameters
    pub training: TrainingControl,
}

/// Flat XGBoost-style parameter mapping.
#[derive(Debug, Deserialize)]
struct FlatParams {
    #[serde(alias = "num_boost_round")]
    n_estimators: Option<usize>,
    early_stopping_rounds: Option<usize>,
    #[serde(default)]
    verbose_eval: bool,
    #[serde(flatten)]
    booster: BoosterParams,
}

impl From<FlatParams> for ModelParams {
    fn from(flat: FlatParams) -> Self {
        let mut training = TrainingControl::default();
        if let Some(rounds) = flat.n_estimators {
            training.num_boost_round = rounds;
        }
        training.early_stopping_rounds = flat.early_stopping_rounds;
        training.verbose_eval = flat.verbose_eval;

        ModelParams {
            booster: flat.booster,
            training,
        }
    }
}

impl ModelParams {
    /// Bundle booster parameters and loop control.
    pub fn new(booster: BoosterParams, training: TrainingControl) -> Self {
        ModelParams { booster, training }
    }

    /// Validate both parameter blocks.
    pub fn validate(&self) -> Result<()> {
        self.booster.validate()?;
        self.training.validate()
    }

    /// Return a copy whose booster seed is replaced.
    pub fn with_seed(&self, seed: u64) -> Self {
        ModelParams {
            booster: self.booster.with_seed(seed),
            training: self.training.clone(),
        }
    }

    /// Parse parameters from a JSON document, sectioned or flat.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let sectioned = value
            .as_object()
            .map(|map| map.keys().any(|key| SECTION_KEYS.contains(&key.as_str())))
            .unwrap_or(false);

        let params = if sectioned {
            serde_json::from_value::<ModelParams>(value)?
        } else {
            serde_json::from_value::<FlatParams>(value)?.into()
        };
        params.validate()?;
        Ok(params)
    }

    /// Parse parameters from a TOML document, sectioned or flat.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        let sectioned = table
            .keys()
            .any(|key| SECTION_KEYS.contains(&key.as_str()));

        let value = toml::Value::Table(table);
        let params = if sectioned {
            value.try_into::<ModelParams>()?
        } else {
            value.try_into::<FlatParams>()?.into()
        };
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a `.toml` or `.json` file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(BoostError::config(format!(
                "Unsupported config file format for {}. Use .json or .toml",
                path.display()
            ))),
        }
    }

    /// Save parameters in sectioned form to a `.toml` or `.json` file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| BoostError::serialization(e.to_string()))?,
            _ => {
                return Err(BoostError::config(format!(
                    "Unsupported config file format for {}. Use .json or .toml",
                    path.display()
                )))
            }
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}
