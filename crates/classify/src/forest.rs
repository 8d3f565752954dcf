//! Bagged ensemble of CART trees.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::tree::DecisionTree;

/// Random-forest settings: bootstrap samples, `sqrt(k)` candidate features
/// per split, trees grown to purity.
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_trees: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self { n_trees: 100 }
    }
}

/// A trained forest.
#[derive(Debug, Clone)]
pub struct ForestModel {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(n_trees: usize) -> Self {
        Self { n_trees }
    }

    /// Trains on `x` (rows × features) and 0/1 labels `y`.
    ///
    /// One seed per tree is drawn from `rng` up front, so results depend
    /// only on `rng` and not on thread scheduling.
    pub fn fit<R: Rng + ?Sized>(&self, x: &Array2<f64>, y: &[u8], rng: &mut R) -> ForestModel {
        let (m, k) = x.dim();
        let max_features = ((k as f64).sqrt() as usize).max(1);
        let seeds: Vec<u64> = (0..self.n_trees).map(|_| rng.random()).collect();

        let trees: Vec<DecisionTree> = seeds
            .into_par_iter()
            .map(|seed| {
                let mut tree_rng = StdRng::seed_from_u64(seed);
                let bootstrap: Vec<usize> = (0..m).map(|_| tree_rng.random_range(0..m)).collect();
                DecisionTree::fit(x, y, bootstrap, max_features, &mut tree_rng)
            })
            .collect();

        debug!(
            trees = trees.len(),
            rows = m,
            features = k,
            max_features,
            "trained random forest"
        );
        ForestModel {
            trees,
            n_features: k,
        }
    }
}

impl ForestModel {
    /// Mean leaf class-1 fraction across trees, per row of `x`.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Vec<f64> {
        let n_trees = self.trees.len() as f64;
        (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / n_trees
            })
            .collect()
    }

    /// Mean-decrease-impurity importances, normalised to sum 1.
    ///
    /// Single-leaf trees are left out of the average; all zeros if every
    /// tree is a single leaf.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut sum = vec![0.0; self.n_features];
        for imp in self.trees.iter().filter_map(DecisionTree::importances) {
            for (s, v) in sum.iter_mut().zip(imp) {
                *s += v;
            }
        }
        let total: f64 = sum.iter().sum();
        if total > 0.0 {
            sum.iter_mut().for_each(|s| *s /= total);
        }
        sum
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
