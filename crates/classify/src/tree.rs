//! CART classification tree with Gini splits.
//!
//! **Not part of the public API.**

use ndarray::{Array2, ArrayView1};
use rand::Rng;
use rand::seq::SliceRandom;

/// Arena index of a node.
type NodeIndex = usize;

#[derive(Debug, Clone)]
enum Node {
    /// Fraction of class-1 samples that reached the leaf.
    Leaf { p1: f64 },
    Split {
        feature: usize,
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
    },
}

/// A tree grown to purity. Node 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct DecisionTree {
    nodes: Vec<Node>,
    /// Unnormalised Gini decrease per feature.
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// `n_left * gini_left + n_right * gini_right`
    weighted: f64,
}

/// `2 p (1 - p)` for a node with `n1` positives out of `n`.
fn gini(n1: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = n1 as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

impl DecisionTree {
    /// Grows a tree on `samples` (row indices into `x`, repeats allowed),
    /// considering `max_features` randomly ordered features per split.
    pub(crate) fn fit<R: Rng + ?Sized>(
        x: &Array2<f64>,
        y: &[u8],
        samples: Vec<usize>,
        max_features: usize,
        rng: &mut R,
    ) -> Self {
        let k = x.ncols();
        let mut nodes = vec![Node::Leaf { p1: 0.0 }];
        let mut importances = vec![0.0; k];
        let mut order: Vec<usize> = (0..k).collect();
        let mut pending: Vec<(NodeIndex, Vec<usize>)> = vec![(0, samples)];

        while let Some((idx, node_samples)) = pending.pop() {
            let n = node_samples.len();
            let n1 = node_samples.iter().filter(|&&i| y[i] == 1).count();
            let p1 = if n == 0 { 0.0 } else { n1 as f64 / n as f64 };
            nodes[idx] = Node::Leaf { p1 };
            if n < 2 || n1 == 0 || n1 == n {
                continue;
            }

            order.shuffle(rng);
            let Some(best) = best_split(x, y, &node_samples, &order, max_features) else {
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = node_samples
                .iter()
                .partition(|&&i| x[[i, best.feature]] <= best.threshold);
            importances[best.feature] += n as f64 * gini(n1, n) - best.weighted;

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { p1: 0.0 });
            nodes.push(Node::Leaf { p1: 0.0 });
            nodes[idx] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
            };
            pending.push((left, left_samples));
            pending.push((right, right_samples));
        }

        Self { nodes, importances }
    }

    /// Class-1 fraction of the leaf `row` falls into.
    pub(crate) fn predict(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { p1 } => return *p1,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Per-feature Gini decrease normalised to sum 1, or `None` for a
    /// single-leaf tree.
    pub(crate) fn importances(&self) -> Option<Vec<f64>> {
        let total: f64 = self.importances.iter().sum();
        (self.nodes.len() > 1 && total > 0.0)
            .then(|| self.importances.iter().map(|v| v / total).collect())
    }

    #[cfg(test)]
    pub(crate) fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// Scans features in `order` until `max_features` non-constant ones have
/// been evaluated, returning the split with the lowest weighted Gini.
fn best_split(
    x: &Array2<f64>,
    y: &[u8],
    samples: &[usize],
    order: &[usize],
    max_features: usize,
) -> Option<BestSplit> {
    let n = samples.len();
    let n1 = samples.iter().filter(|&&i| y[i] == 1).count();
    let mut best: Option<BestSplit> = None;
    let mut visited = 0;
    let mut pairs: Vec<(f64, u8)> = Vec::with_capacity(n);

    for &feature in order {
        if visited >= max_features && best.is_some() {
            break;
        }
        pairs.clear();
        pairs.extend(samples.iter().map(|&i| (x[[i, feature]], y[i])));
        pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        if pairs[0].0 == pairs[n - 1].0 {
            continue;
        }
        visited += 1;

        let mut left_n = 0;
        let mut left_1 = 0;
        for pos in 0..n - 1 {
            left_n += 1;
            left_1 += usize::from(pairs[pos].1);
            let (lo, hi) = (pairs[pos].0, pairs[pos + 1].0);
            if lo == hi {
                continue;
            }
            let right_n = n - left_n;
            let right_1 = n1 - left_1;
            let weighted =
                left_n as f64 * gini(left_1, left_n) + right_n as f64 * gini(right_1, right_n);
            if best.as_ref().is_none_or(|b| weighted < b.weighted) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    weighted,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn gini_values() {
        assert_abs_diff_eq!(gini(0, 4), 0.0);
        assert_abs_diff_eq!(gini(2, 4), 0.5);
        assert_abs_diff_eq!(gini(1, 4), 0.375);
    }

    #[test]
    fn grows_to_purity_on_separable_data() {
        let x = array![[1.0, 9.0], [2.0, 8.0], [3.0, 7.0], [10.0, 6.0], [11.0, 5.0]];
        let y = [0, 0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &y, (0..5).collect(), 2, &mut rng);
        for (row, &label) in x.outer_iter().zip(&y) {
            assert_abs_diff_eq!(tree.predict(row), f64::from(label));
        }
    }

    #[test]
    fn pure_node_is_single_leaf() {
        let x = array![[1.0], [2.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &[1, 1], vec![0, 1], 1, &mut rng);
        assert_eq!(tree.n_nodes(), 1);
        assert!(tree.importances().is_none());
        assert_abs_diff_eq!(tree.predict(x.row(0)), 1.0);
    }

    #[test]
    fn constant_features_give_leaf_fraction() {
        let x = array![[1.0], [1.0], [1.0], [1.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &[0, 1, 1, 1], (0..4).collect(), 1, &mut rng);
        assert_eq!(tree.n_nodes(), 1);
        assert_abs_diff_eq!(tree.predict(x.row(0)), 0.75);
    }

    #[test]
    fn importance_goes_to_informative_feature() {
        // feature 1 is noise that never separates the classes alone
        let x = array![[0.0, 1.0], [0.0, 0.0], [1.0, 1.0], [1.0, 0.0]];
        let y = [0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(9);
        let tree = DecisionTree::fit(&x, &y, (0..4).collect(), 2, &mut rng);
        let imp = tree.importances().unwrap();
        assert_abs_diff_eq!(imp[0], 1.0);
        assert_abs_diff_eq!(imp[1], 0.0);
    }

    #[test]
    fn bootstrap_duplicates_weight_the_leaf() {
        let x = array![[0.0], [0.0]];
        let mut rng = StdRng::seed_from_u64(2);
        let tree = DecisionTree::fit(&x, &[0, 1], vec![0, 1, 1, 1], 1, &mut rng);
        assert_abs_diff_eq!(tree.predict(x.row(0)), 0.75);
    }
}
