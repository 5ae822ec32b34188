//! Early stopping on a validation metric.
//!
//! The monitor is fed one metric value per boosting round and reports when
//! the metric has failed to improve for `patience` consecutive rounds.

use crate::core::types::IterationIndex;

/// Configuration for early stopping behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct EarlyStoppingConfig {
    /// Number of rounds to wait for improvement before stopping
    pub patience: usize,
    /// Improvement must exceed this amount to count
    pub min_delta: f64,
    /// Whether lower metric values are better (e.g., loss) or higher
    pub minimize: bool,
}

impl EarlyStoppingConfig {
    /// Creates a configuration with strict improvement and the given direction.
    pub fn new(patience: usize, minimize: bool) -> Self {
        EarlyStoppingConfig {
            patience,
            min_delta: 0.0,
            minimize,
        }
    }
}

/// Tracks validation metrics and determines when to stop training.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    config: EarlyStoppingConfig,
    best_metric: f64,
    best_iteration: IterationIndex,
    patience_counter: usize,
    metric_history: Vec<f64>,
    stopped: bool,
}

impl EarlyStopping {
    /// Creates a new early stopping monitor with the given configuration.
    pub fn new(config: EarlyStoppingConfig) -> Self {
        let initial_metric = if config.minimize {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };

        EarlyStopping {
            config,
            best_metric: initial_metric,
            best_iteration: 0,
            patience_counter: 0,
            metric_history: Vec::new(),
            stopped: false,
        }
    }

    /// Records the metric of `iteration`; returns true once training should stop.
    pub fn update(&mut self, metric: f64, iteration: IterationIndex) -> bool {
        if self.stopped {
            return true;
        }

        self.metric_history.push(metric);

        if self.check_improvement(metric) {
            self.best_metric = metric;
            self.best_iteration = iteration;
            self.patience_counter = 0;
        } else {
            self.patience_counter += 1;
        }

        if self.patience_counter >= self.config.patience {
            self.stopped = true;
            log::info!(
                "Early stopping triggered at iteration {} (best was {:.6} at iteration {})",
                iteration,
                self.best_metric,
                self.best_iteration
            );
        }

        self.stopped
    }

    /// Checks if the metric improves on the best value so far.
    fn check_improvement(&self, metric: f64) -> bool {
        if self.metric_history.len() == 1 {
            // First metric is always considered an improvement
            return metric.is_finite();
        }

        let improvement = if self.config.minimize {
            self.best_metric - metric
        } else {
            metric - self.best_metric
        };
        improvement > self.config.min_delta
    }

    /// Returns true if early stopping has been triggered.
    pub fn should_stop(&self) -> bool {
        self.stopped
    }

    /// Returns the best metric value observed so far.
    pub fn best_metric(&self) -> f64 {
        self.best_metric
    }

    /// Returns the iteration where the best metric was observed.
    pub fn best_iteration(&self) -> IterationIndex {
        self.best_iteration
    }

    /// Returns the current patience counter value.
    pub fn patience_counter(&self) -> usize {
        self.patience_counter
    }

    /// Returns the metric history.
    pub fn metric_history(&self) -> &[f64] {
        &self.metric_history
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EarlyStoppingConfig {
        &self.config
    }
}
