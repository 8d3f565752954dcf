//! Classifier configuration.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::ClassifyError;

/// Settings shared by the spatial classifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyConfig {
    sample_cap: usize,
    n_trees: usize,
    seed: Option<u64>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            sample_cap: 10_000,
            n_trees: 100,
            seed: None,
        }
    }
}

impl ClassifyConfig {
    /// Set the maximum number of pixels used for fitting.
    pub fn with_sample_cap(mut self, sample_cap: usize) -> Self {
        self.sample_cap = sample_cap;
        self
    }

    /// Set the number of random-forest trees.
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Fix the random seed. Without one, each call draws from OS entropy.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn sample_cap(&self) -> usize {
        self.sample_cap
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Generator for sampling and bagging, seeded when a seed is set.
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.sample_cap < 2 {
            return Err(ClassifyError::InvalidConfig {
                reason: format!("sample_cap must be >= 2, got {}", self.sample_cap),
            });
        }
        if self.n_trees == 0 {
            return Err(ClassifyError::InvalidConfig {
                reason: "n_trees must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
