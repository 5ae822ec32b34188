//! Single boosted-tree regressor.
//!
//! [`SingleModel`] trains one booster with validation-based early stopping,
//! predicts with optional SHAP attributions and reports gain importance.

use crate::boosting::{self, Booster};
use crate::config::ModelParams;
use crate::core::error::{BoostError, Result};
use crate::core::types::ImportanceType;
use crate::dataset::{Dataset, FeatureFrame};
use crate::prediction::{FeatureImportance, PredictionOutput};
use ndarray::ArrayView1;

/// One gradient-boosted regressor.
#[derive(Debug, Clone)]
pub struct SingleModel {
    params: ModelParams,
    booster: Option<Booster>,
}

impl SingleModel {
    /// Create an unfitted model.
    pub fn new(params: ModelParams) -> Self {
        SingleModel {
            params,
            booster: None,
        }
    }

    /// Training parameters.
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Whether a booster has been trained.
    pub fn is_fitted(&self) -> bool {
        self.booster.is_some()
    }

    /// The trained booster, if any.
    pub fn booster(&self) -> Option<&Booster> {
        self.booster.as_ref()
    }

    /// Consume the model, returning its booster.
    pub fn into_booster(self) -> Option<Booster> {
        self.booster
    }

    /// Train on `train_x`/`train_y`, evaluating `valid_x`/`valid_y` every round.
    ///
    /// The validation frame is aligned to the training columns by name.
    /// Only the booster block of the parameters reaches the tree learner;
    /// the training block drives the round budget and early stopping.
    pub fn fit(
        &mut self,
        train_x: &FeatureFrame,
        train_y: ArrayView1<'_, f64>,
        valid_x: &FeatureFrame,
        valid_y: ArrayView1<'_, f64>,
    ) -> Result<()> {
        let valid_x = valid_x.select(train_x.columns())?;
        let train = Dataset::from_frame(train_x, train_y)?;
        let valid = Dataset::from_frame(&valid_x, valid_y)?;

        log::debug!(
            "Fitting booster on {} rows, validating on {} rows, seed {}",
            train.num_data(),
            valid.num_data(),
            self.params.booster.seed
        );

        let booster = boosting::train(
            &self.params.booster,
            &self.params.training,
            &train,
            Some(&valid),
        )?;
        self.booster = Some(booster);
        Ok(())
    }

    fn fitted_booster(&self, operation: &str) -> Result<&Booster> {
        self.booster
            .as_ref()
            .ok_or_else(|| BoostError::not_fitted(operation))
    }

    /// Predict `test_x`, optionally with SHAP attributions.
    pub fn predict(&self, test_x: &FeatureFrame, return_shaps: bool) -> Result<PredictionOutput> {
        let booster = self.fitted_booster("predict")?;
        let aligned = test_x.select(booster.feature_names())?;

        let mut output = PredictionOutput::new(booster.predict(aligned.values())?);
        if return_shaps {
            output.shap_values = Some(booster.explainer().explain_aligned(&aligned)?);
        }
        Ok(output)
    }

    /// Average gain per split for every training feature.
    pub fn get_important_features(&self) -> Result<FeatureImportance> {
        let booster = self.fitted_booster("get_important_features")?;
        Ok(booster.feature_importance(ImportanceType::Gain))
    }
}
