//! Ensembles of boosted regressors.
//!
//! An [`EnsembleModel`] owns an ordered list of boosters, one per data split.
//! Predictions and attributions are averaged elementwise across boosters, and
//! the spread of the per-booster predictions is available as a population
//! standard deviation. Boosters are persisted as `0.json`, `1.json`, ... in a
//! directory and restored contiguously from index zero.

use crate::boosting::Booster;
use crate::config::ModelParams;
use crate::core::error::{BoostError, Result};
use crate::core::types::ImportanceType;
use crate::dataset::FeatureFrame;
use crate::io::{load_booster, model_file_path, model_files_beyond, save_booster};
use crate::model::SingleModel;
use crate::prediction::{Explanation, FeatureImportance, PredictOptions, PredictionOutput};
use ndarray::{Array1, Array2, Axis};
use std::path::Path;

/// One train/validation split used to fit one booster.
#[derive(Debug, Clone)]
pub struct DataSplit {
    /// Training features
    pub train_x: FeatureFrame,
    /// Training target
    pub train_y: Array1<f64>,
    /// Validation features
    pub valid_x: FeatureFrame,
    /// Validation target
    pub valid_y: Array1<f64>,
}

impl DataSplit {
    /// Bundle a train/validation split.
    pub fn new(
        train_x: FeatureFrame,
        train_y: Array1<f64>,
        valid_x: FeatureFrame,
        valid_y: Array1<f64>,
    ) -> Self {
        DataSplit {
            train_x,
            train_y,
            valid_x,
            valid_y,
        }
    }
}

/// Ordered collection of boosters trained on parallel data splits.
#[derive(Debug, Clone, Default)]
pub struct EnsembleModel {
    params: Option<ModelParams>,
    boosters: Vec<Booster>,
}

impl EnsembleModel {
    /// Create an empty ensemble that will train with `params`.
    pub fn new(params: ModelParams) -> Self {
        EnsembleModel {
            params: Some(params),
            boosters: Vec::new(),
        }
    }

    /// Base parameters, absent for an ensemble restored from disk.
    pub fn params(&self) -> Option<&ModelParams> {
        self.params.as_ref()
    }

    /// Number of boosters.
    pub fn len(&self) -> usize {
        self.boosters.len()
    }

    /// Whether the ensemble holds no boosters.
    pub fn is_empty(&self) -> bool {
        self.boosters.is_empty()
    }

    /// Boosters in index order.
    pub fn boosters(&self) -> &[Booster] {
        &self.boosters
    }

    /// Train one booster per split, in order, appending each to the ensemble.
    ///
    /// With `fix_seed`, booster `i` is trained with seed `i`. If a booster
    /// fails, the boosters trained before it stay in the ensemble.
    pub fn fit(&mut self, data_subset: &[DataSplit], fix_seed: bool) -> Result<()> {
        let params = self.params.clone().ok_or_else(|| {
            BoostError::config("Ensemble has no training parameters; it was restored from disk")
        })?;

        for (index, split) in data_subset.iter().enumerate() {
            let booster_params = if fix_seed {
                params.with_seed(index as u64)
            } else {
                params.clone()
            };

            log::debug!(
                "Training booster {} of {} (seed {})",
                index + 1,
                data_subset.len(),
                booster_params.booster.seed
            );

            let mut model = SingleModel::new(booster_params);
            model.fit(
                &split.train_x,
                split.train_y.view(),
                &split.valid_x,
                split.valid_y.view(),
            )?;
            let booster = model
                .into_booster()
                .ok_or_else(|| BoostError::training("fit produced no booster"))?;
            self.boosters.push(booster);
        }

        log::info!("Ensemble holds {} boosters", self.boosters.len());
        Ok(())
    }

    fn ensure_fitted(&self, operation: &str) -> Result<()> {
        if self.boosters.is_empty() {
            return Err(BoostError::not_fitted(operation));
        }
        Ok(())
    }

    /// Average the boosters' predictions on `test_x`.
    ///
    /// `test_x` is aligned to every booster's feature list before any booster
    /// predicts, so a missing column fails the call with no partial output.
    pub fn predict(&self, test_x: &FeatureFrame, options: PredictOptions) -> Result<PredictionOutput> {
        self.ensure_fitted("predict")?;

        let aligned: Vec<FeatureFrame> = self
            .boosters
            .iter()
            .map(|booster| test_x.select(booster.feature_names()))
            .collect::<Result<_>>()?;

        if options.return_shaps {
            self.check_shared_features()?;
        }

        let per_booster: Vec<Array1<f64>> = self
            .boosters
            .iter()
            .zip(&aligned)
            .map(|(booster, frame)| booster.predict(frame.values()))
            .collect::<Result<_>>()?;
        let stacked = stack_rows(&per_booster)?;

        let predictions = stacked
            .mean_axis(Axis(0))
            .ok_or_else(|| BoostError::prediction("No booster predictions to average"))?;
        let mut output = PredictionOutput::new(predictions);

        if options.return_stds {
            output.std = Some(stacked.std_axis(Axis(0), 0.0));
        }

        if options.return_shaps {
            output.shap_values = Some(self.average_explanations(&aligned)?);
        }

        Ok(output)
    }

    fn check_shared_features(&self) -> Result<()> {
        let expected = self.boosters[0].feature_names();
        for (index, booster) in self.boosters.iter().enumerate().skip(1) {
            if booster.feature_names() != expected {
                return Err(BoostError::FeatureAlignment {
                    index,
                    expected: expected.to_vec(),
                    found: booster.feature_names().to_vec(),
                });
            }
        }
        Ok(())
    }

    fn average_explanations(&self, aligned: &[FeatureFrame]) -> Result<Explanation> {
        let explanations: Vec<Explanation> = self
            .boosters
            .iter()
            .zip(aligned)
            .map(|(booster, frame)| booster.explainer().explain_aligned(frame))
            .collect::<Result<_>>()?;

        let count = explanations.len() as f64;
        let first = &aligned[0];
        let mut values = Array2::<f64>::zeros((first.nrows(), first.ncols()));
        let mut base_values = Array1::<f64>::zeros(first.nrows());
        for explanation in &explanations {
            values += explanation.values();
            base_values += explanation.base_values();
        }
        values /= count;
        base_values /= count;

        Explanation::new(
            values,
            base_values,
            first.values().to_owned(),
            first.columns().to_vec(),
            first.index().to_vec(),
        )
    }

    /// Mean gain importance across boosters.
    ///
    /// All boosters must share the same feature ordering.
    pub fn get_important_features(&self) -> Result<FeatureImportance> {
        self.ensure_fitted("get_important_features")?;
        let importances: Vec<FeatureImportance> = self
            .boosters
            .iter()
            .map(|booster| booster.feature_importance(ImportanceType::Gain))
            .collect();
        FeatureImportance::mean(&importances)
    }

    /// Write booster `i` to `<path>/<i>.json`.
    ///
    /// The directory must already exist.
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let dir = path.as_ref();
        if !dir.is_dir() {
            return Err(BoostError::IO {
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Model directory {} does not exist", dir.display()),
                ),
            });
        }

        for (index, booster) in self.boosters.iter().enumerate() {
            save_booster(booster, model_file_path(dir, index))?;
        }
        log::info!("Saved {} boosters to {}", self.boosters.len(), dir.display());
        Ok(())
    }

    /// Restore an ensemble from `<path>/0.json`, `<path>/1.json`, ...
    ///
    /// Loading stops at the first missing index; files beyond the gap are
    /// ignored with a warning. The restored ensemble carries no training
    /// parameters.
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dir = path.as_ref();
        let mut boosters = Vec::new();

        loop {
            let file = model_file_path(dir, boosters.len());
            if !file.is_file() {
                break;
            }
            boosters.push(load_booster(&file)?);
        }

        if boosters.is_empty() {
            return Err(BoostError::NoModelsFound {
                path: dir.to_path_buf(),
            });
        }

        let ignored = model_files_beyond(dir, boosters.len());
        if !ignored.is_empty() {
            log::warn!(
                "Loaded {} boosters from {}; ignoring model files after the gap at index {}: {:?}",
                boosters.len(),
                dir.display(),
                boosters.len(),
                ignored
            );
        }

        log::info!("Loaded {} boosters from {}", boosters.len(), dir.display());
        Ok(EnsembleModel {
            params: None,
            boosters,
        })
    }
}

/// Stack equal-length vectors as the rows of a matrix.
fn stack_rows(rows: &[Array1<f64>]) -> Result<Array2<f64>> {
    let views: Vec<_> = rows.iter().map(|row| row.view()).collect();
    ndarray::stack(Axis(0), &views).map_err(|e| BoostError::prediction(e.to_string()))
}
