//! Row and column sampling for tree construction.
//!
//! One [`TreeSampler`] lives for the whole boosting run and draws a fresh row
//! subset and feature subset per tree from a single seeded generator, so two
//! runs with the same seed and data grow identical trees.

use crate::core::types::FeatureIndex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Per-tree row and feature sampler.
#[derive(Debug, Clone)]
pub struct TreeSampler {
    rng: StdRng,
    subsample: f64,
    colsample_bytree: f64,
}

impl TreeSampler {
    /// Creates a sampler seeded with `seed`.
    pub fn new(seed: u64, subsample: f64, colsample_bytree: f64) -> Self {
        TreeSampler {
            rng: StdRng::seed_from_u64(seed),
            subsample,
            colsample_bytree,
        }
    }

    /// Sorted row indices used to grow the next tree.
    pub fn sample_rows(&mut self, num_data: usize) -> Vec<usize> {
        Self::draw(&mut self.rng, num_data, self.subsample)
    }

    /// Sorted feature indices the next tree may split on.
    pub fn sample_features(&mut self, num_features: usize) -> Vec<FeatureIndex> {
        Self::draw(&mut self.rng, num_features, self.colsample_bytree)
    }

    fn draw(rng: &mut StdRng, total: usize, fraction: f64) -> Vec<usize> {
        if fraction >= 1.0 || total <= 1 {
            return (0..total).collect();
        }

        let amount = ((total as f64 * fraction).round() as usize).clamp(1, total);
        let mut selected = index::sample(rng, total, amount).into_vec();
        selected.sort_unstable();
        selected
    }
}
