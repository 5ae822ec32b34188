//! Gradient boosted decision trees.
//!
//! [`train`] runs the boosting loop and returns a [`Booster`]: the trained
//! trees plus everything needed to predict, explain and persist them.

use crate::boosting::early_stopping::{EarlyStopping, EarlyStoppingConfig};
use crate::boosting::objective::{create_objective_function, ObjectiveFunction};
use crate::config::{BoosterParams, TrainingControl};
use crate::core::error::{BoostError, Result};
use crate::core::types::{ImportanceType, IterationIndex, MetricType, ObjectiveType, Score};
use crate::dataset::{Dataset, FeatureFrame};
use crate::metrics_eval::evaluate_metric;
use crate::prediction::{FeatureImportance, TreeExplainer};
use crate::tree::{Tree, TreeLearner, TreeLearnerConfig, TreeSampler};
use ndarray::{Array1, ArrayView2, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A trained regression booster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booster {
    feature_names: Vec<String>,
    base_score: Score,
    trees: Vec<Tree>,
    objective: ObjectiveType,
    eval_metric: MetricType,
    best_iteration: Option<IterationIndex>,
    best_score: Option<f64>,
    params: BoosterParams,
}

impl Booster {
    /// Feature names the booster was trained on, in training order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of features.
    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Trained trees in boosting order.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Number of trees.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Initial prediction every tree adds to.
    pub fn base_score(&self) -> Score {
        self.base_score
    }

    /// Objective the booster was trained with.
    pub fn objective(&self) -> ObjectiveType {
        self.objective
    }

    /// Metric evaluated on the validation set.
    pub fn eval_metric(&self) -> MetricType {
        self.eval_metric
    }

    /// Round with the best validation metric, when early stopping ran.
    pub fn best_iteration(&self) -> Option<IterationIndex> {
        self.best_iteration
    }

    /// Validation metric at the best (or last) round.
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// Parameters the booster was trained with.
    pub fn params(&self) -> &BoosterParams {
        &self.params
    }

    /// Raw predictions for rows already in booster feature order.
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<Score>> {
        if features.ncols() != self.num_features() {
            return Err(BoostError::dimension_mismatch(
                format!("{} feature columns", self.num_features()),
                format!("{} feature columns", features.ncols()),
            ));
        }

        let mut predictions = Array1::from_elem(features.nrows(), self.base_score);
        Zip::from(&mut predictions)
            .and(features.rows())
            .par_for_each(|prediction, row| {
                *prediction += self.trees.iter().map(|tree| tree.predict(row)).sum::<Score>();
            });
        Ok(predictions)
    }

    /// Predictions for a frame, aligning its columns by name first.
    pub fn predict_frame(&self, frame: &FeatureFrame) -> Result<Array1<Score>> {
        let aligned = frame.select(&self.feature_names)?;
        self.predict(aligned.values())
    }

    /// Mean raw prediction over the training distribution.
    pub fn expected_value(&self) -> Score {
        self.base_score
            + self
                .trees
                .iter()
                .map(Tree::expected_value)
                .sum::<Score>()
    }

    /// SHAP explainer bound to this booster.
    pub fn explainer(&self) -> TreeExplainer<'_> {
        TreeExplainer::new(self)
    }

    /// Feature importance over the booster's full feature list.
    pub fn feature_importance(&self, importance_type: ImportanceType) -> FeatureImportance {
        FeatureImportance::from_trees(self.feature_names.clone(), &self.trees, importance_type)
    }

    /// Checks internal consistency, typically after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.feature_names.is_empty() {
            return Err(BoostError::serialization("Booster has no features"));
        }
        if !self.base_score.is_finite() {
            return Err(BoostError::serialization("Booster base score is not finite"));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.num_features()).map_err(|e| {
                BoostError::serialization(format!("Tree {} is invalid: {}", index, e))
            })?;
        }
        Ok(())
    }
}

/// Boosting loop state for one training run.
#[derive(Debug)]
pub struct GBDT<'a> {
    params: &'a BoosterParams,
    control: &'a TrainingControl,
    train_data: &'a Dataset,
    valid_data: Option<&'a Dataset>,
    objective: Box<dyn ObjectiveFunction>,
    learner: TreeLearner,
    sampler: TreeSampler,
}

impl<'a> GBDT<'a> {
    /// Validate inputs and set up the boosting loop.
    pub fn new(
        params: &'a BoosterParams,
        control: &'a TrainingControl,
        train_data: &'a Dataset,
        valid_data: Option<&'a Dataset>,
    ) -> Result<Self> {
        params.validate()?;
        control.validate()?;

        if control.is_early_stopping_enabled() && valid_data.is_none() {
            return Err(BoostError::config(
                "early_stopping_rounds requires a validation set",
            ));
        }

        if let Some(valid) = valid_data {
            if valid.feature_names() != train_data.feature_names() {
                return Err(BoostError::dataset(format!(
                    "Validation columns {:?} differ from training columns {:?}",
                    valid.feature_names(),
                    train_data.feature_names()
                )));
            }
        }

        Ok(GBDT {
            params,
            control,
            train_data,
            valid_data,
            objective: create_objective_function(params)?,
            learner: TreeLearner::new(TreeLearnerConfig::from(params)),
            sampler: TreeSampler::new(params.seed, params.subsample, params.colsample_bytree),
        })
    }

    /// Run the boosting loop.
    pub fn train(mut self) -> Result<Booster> {
        let train = self.train_data;
        let num_data = train.num_data();
        let labels = train.labels().to_vec();
        let base_score = self.params.base_score.unwrap_or_else(|| train.label_mean());

        let mut train_scores = vec![base_score; num_data];
        let mut valid_scores = self
            .valid_data
            .map(|valid| Array1::from_elem(valid.num_data(), base_score));
        let mut gradients = vec![0.0; num_data];
        let mut hessians = vec![0.0; num_data];

        let mut early_stopping = self.control.early_stopping_rounds.map(|patience| {
            EarlyStopping::new(EarlyStoppingConfig::new(
                patience,
                !self.params.eval_metric.higher_is_better(),
            ))
        });

        let level = if self.control.verbose_eval {
            log::Level::Info
        } else {
            log::Level::Debug
        };

        let mut trees = Vec::with_capacity(self.control.num_boost_round);
        let mut last_score = None;

        for iteration in 0..self.control.num_boost_round {
            self.objective.calculate_gradients_hessians(
                &train_scores,
                &labels,
                &mut gradients,
                &mut hessians,
            )?;

            let rows = self.sampler.sample_rows(num_data);
            let feature_subset = self.sampler.sample_features(train.num_features());
            let tree = self.learner.train(
                train.features(),
                &gradients,
                &hessians,
                rows,
                &feature_subset,
            )?;

            let features = train.features();
            train_scores
                .par_iter_mut()
                .enumerate()
                .for_each(|(row, score)| *score += tree.predict(features.row(row)));

            let metric = match (self.valid_data, valid_scores.as_mut()) {
                (Some(valid), Some(scores)) => {
                    let features = valid.features();
                    Zip::from(&mut *scores)
                        .and(features.rows())
                        .par_for_each(|score, row| *score += tree.predict(row));
                    Some(evaluate_metric(
                        self.params.eval_metric,
                        scores.view(),
                        valid.labels(),
                    ))
                }
                _ => None,
            };

            match metric {
                Some(value) => log::log!(
                    level,
                    "[{}] valid-{}: {:.6} (leaves={})",
                    iteration,
                    self.params.eval_metric,
                    value,
                    tree.num_leaves()
                ),
                None => log::log!(level, "[{}] leaves={}", iteration, tree.num_leaves()),
            }

            trees.push(tree);
            last_score = metric;

            if let (Some(monitor), Some(value)) = (early_stopping.as_mut(), metric) {
                if monitor.update(value, iteration) {
                    break;
                }
            }
        }

        let (best_iteration, best_score) = match early_stopping {
            Some(monitor) => {
                let best = monitor.best_iteration();
                trees.truncate(best + 1);
                (Some(best), Some(monitor.best_metric()))
            }
            None => (None, last_score),
        };

        log::debug!(
            "Trained booster with {} trees on {} rows x {} features",
            trees.len(),
            num_data,
            train.num_features()
        );

        Ok(Booster {
            feature_names: train.feature_names().to_vec(),
            base_score,
            trees,
            objective: self.params.objective,
            eval_metric: self.params.eval_metric,
            best_iteration,
            best_score,
            params: self.params.clone(),
        })
    }
}

/// Train a booster.
///
/// `valid` is evaluated after every round; it is required when early
/// stopping is enabled. With `nthread` set, training runs on a dedicated
/// rayon pool of that size.
pub fn train(
    params: &BoosterParams,
    control: &TrainingControl,
    train: &Dataset,
    valid: Option<&Dataset>,
) -> Result<Booster> {
    let gbdt = GBDT::new(params, control, train, valid)?;

    match params.nthread {
        Some(num_threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .map_err(|e| BoostError::training(format!("Failed to create thread pool: {}", e)))?;
            pool.install(|| gbdt.train())
        }
        None => gbdt.train(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoosterParamsBuilder;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, Axis};

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    fn linear_dataset(n: usize, offset: f64) -> Dataset {
        let features = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64 / n as f64 + offset
            } else {
                ((i * 7) % 11) as f64
            }
        });
        let labels = features.map_axis(Axis(1), |row| 3.0 * row[0] + 0.1 * row[1]);
        Dataset::new(features, labels, names(2)).unwrap()
    }

    #[test]
    fn test_training_reduces_error() {
        let data = linear_dataset(100, 0.0);
        let params = BoosterParams::default();
        let booster = train(&params, &TrainingControl::new(30, None), &data, None).unwrap();

        assert_eq!(booster.num_trees(), 30);
        assert_abs_diff_eq!(booster.base_score(), data.label_mean());

        let predictions = booster.predict(data.features()).unwrap();
        let rmse = evaluate_metric(MetricType::Rmse, predictions.view(), data.labels());
        let baseline = evaluate_metric(
            MetricType::Rmse,
            Array1::from_elem(data.num_data(), data.label_mean()).view(),
            data.labels(),
        );
        assert!(rmse < baseline * 0.2);
    }

    #[test]
    fn test_early_stopping_truncates_to_best_iteration() {
        let train_data = linear_dataset(80, 0.0);
        // Every extra tree moves predictions away from these constant labels.
        let constant = Array1::from_elem(80, train_data.label_mean());
        let valid_data = Dataset::new(
            train_data.features().to_owned(),
            constant,
            train_data.feature_names().to_vec(),
        )
        .unwrap();

        let control = TrainingControl::new(200, Some(3));
        let booster = train(&BoosterParams::default(), &control, &train_data, Some(&valid_data)).unwrap();

        assert_eq!(booster.best_iteration(), Some(0));
        assert_eq!(booster.num_trees(), 1);

        let predictions = booster.predict(valid_data.features()).unwrap();
        let score = evaluate_metric(MetricType::Rmse, predictions.view(), valid_data.labels());
        assert_abs_diff_eq!(score, booster.best_score().unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn test_early_stopping_requires_validation_set() {
        let data = linear_dataset(20, 0.0);
        let result = train(&BoosterParams::default(), &TrainingControl::new(5, Some(2)), &data, None);
        assert!(matches!(result, Err(BoostError::Config { .. })));
    }

    #[test]
    fn test_same_seed_same_booster() {
        let data = linear_dataset(60, 0.0);
        let params = BoosterParamsBuilder::new()
            .subsample(0.7)
            .colsample_bytree(0.5)
            .seed(3)
            .build()
            .unwrap();
        let control = TrainingControl::new(10, None);
        let a = train(&params, &control, &data, None).unwrap();
        let b = train(&params, &control, &data, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dedicated_thread_pool() {
        let data = linear_dataset(50, 0.0);
        let mut params = BoosterParams::default();
        let control = TrainingControl::new(5, None);
        let global = train(&params, &control, &data, None).unwrap();
        params.nthread = Some(2);
        let pooled = train(&params, &control, &data, None).unwrap();
        assert_eq!(global.trees(), pooled.trees());
    }

    #[test]
    fn test_shap_local_accuracy() {
        let data = linear_dataset(60, 0.0);
        let booster = train(&BoosterParams::default(), &TrainingControl::new(8, None), &data, None).unwrap();
        let shap = booster.explainer().shap_values(data.features()).unwrap();
        let predictions = booster.predict(data.features()).unwrap();
        for (row, prediction) in predictions.iter().enumerate() {
            let total = shap.row(row).sum() + booster.expected_value();
            assert_abs_diff_eq!(total, *prediction, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_gain_importance_prefers_informative_feature() {
        let data = linear_dataset(100, 0.0);
        let booster = train(&BoosterParams::default(), &TrainingControl::new(20, None), &data, None).unwrap();
        let importance = booster.feature_importance(ImportanceType::TotalGain);
        assert!(importance.get("f0").unwrap() > importance.get("f1").unwrap());
        assert!(booster.validate().is_ok());
    }

    #[test]
    fn test_predict_checks_width() {
        let data = linear_dataset(20, 0.0);
        let booster = train(&BoosterParams::default(), &TrainingControl::new(2, None), &data, None).unwrap();
        assert!(booster.predict(Array2::zeros((3, 5)).view()).is_err());
    }
}
