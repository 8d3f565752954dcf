//! Transition matrix estimation from two co-registered class grids.

use std::collections::BTreeSet;

use ndarray::{Array2, Axis};
use tracing::debug;

use crate::error::MarkovError;

/// Observed class-to-class transitions between two dates.
///
/// `counts[[i, j]]` is the number of valid pixels in class `classes[i]` at
/// the first date and class `classes[j]` at the second. `probs` is `counts`
/// row-normalised; a class never observed at the first date keeps a zero row.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    classes: Vec<i64>,
    counts: Array2<u64>,
    probs: Array2<f64>,
}

impl TransitionMatrix {
    /// Sorted class codes indexing both axes.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Raw co-occurrence counts.
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Row-normalised transition probabilities.
    pub fn probs(&self) -> &Array2<f64> {
        &self.probs
    }

    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Total number of valid pixel pairs counted.
    pub fn n_pixels(&self) -> u64 {
        self.counts.sum()
    }
}

/// Divides each row by its sum.
///
/// Rows summing to zero are divided by 1 instead, so they stay zero.
pub fn normalize_rows(matrix: &Array2<f64>) -> Array2<f64> {
    let mut out = matrix.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let s = row.sum();
        let denom = if s == 0.0 { 1.0 } else { s };
        row.mapv_inplace(|v| v / denom);
    }
    out
}

/// Counts transitions between two class grids of identical shape.
///
/// A pixel is kept only when both dates hold a value `>= 0`; negative values
/// (and NaN) mark nodata, and dropping one side drops the pair. The class
/// universe is the sorted union of kept values from both dates, so a class
/// seen at only one date still gets a row and a column.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`MarkovError::ShapeMismatch`] | `t1` and `t2` differ in shape |
/// | [`MarkovError::NonIntegerClass`] | a kept value has a fractional part |
pub fn build_transition_matrix(
    t1: &Array2<f64>,
    t2: &Array2<f64>,
) -> Result<TransitionMatrix, MarkovError> {
    if t1.dim() != t2.dim() {
        let (t1_rows, t1_cols) = t1.dim();
        let (t2_rows, t2_cols) = t2.dim();
        return Err(MarkovError::ShapeMismatch {
            t1_rows,
            t1_cols,
            t2_rows,
            t2_cols,
        });
    }

    let mut pairs: Vec<(i64, i64)> = Vec::with_capacity(t1.len());
    let mut universe = BTreeSet::new();
    for (&a, &b) in t1.iter().zip(t2.iter()) {
        if !(a >= 0.0 && b >= 0.0) {
            continue;
        }
        let from = class_code(a)?;
        let to = class_code(b)?;
        universe.insert(from);
        universe.insert(to);
        pairs.push((from, to));
    }

    let classes: Vec<i64> = universe.into_iter().collect();
    let k = classes.len();
    let mut counts = Array2::<u64>::zeros((k, k));
    for (from, to) in pairs {
        // Both codes were inserted into the universe above.
        let i = classes.partition_point(|&c| c < from);
        let j = classes.partition_point(|&c| c < to);
        counts[[i, j]] += 1;
    }

    let probs = normalize_rows(&counts.mapv(|c| c as f64));
    debug!(
        n_classes = k,
        n_pixels = counts.sum(),
        n_dropped = t1.len() as u64 - counts.sum(),
        "built transition matrix"
    );

    Ok(TransitionMatrix {
        classes,
        counts,
        probs,
    })
}

fn class_code(v: f64) -> Result<i64, MarkovError> {
    if v.fract() != 0.0 {
        return Err(MarkovError::NonIntegerClass(v));
    }
    Ok(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn normalize_rows_standard() {
        let m = array![[2.0, 3.0, 5.0], [1.0, 1.0, 2.0]];
        let p = normalize_rows(&m);
        assert_abs_diff_eq!(p[[0, 0]], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(p[[0, 2]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p[[1, 2]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn normalize_rows_zero_row_stays_zero() {
        let m = array![[0.0, 0.0], [3.0, 1.0]];
        let p = normalize_rows(&m);
        assert_eq!(p.row(0).to_vec(), vec![0.0, 0.0]);
        assert_abs_diff_eq!(p[[1, 0]], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn identical_grids_give_identity() {
        let g = array![[1.0, 2.0, 3.0], [3.0, 2.0, 1.0], [1.0, 1.0, 5.0]];
        let tm = build_transition_matrix(&g, &g).unwrap();
        assert_eq!(tm.classes(), &[1, 2, 3, 5]);
        for i in 0..tm.n_classes() {
            for j in 0..tm.n_classes() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(tm.probs()[[i, j]], expected, epsilon = 1e-12);
            }
        }
        assert_eq!(tm.counts()[[0, 0]], 4);
        assert_eq!(tm.n_pixels(), 9);
    }

    #[test]
    fn counts_and_probabilities() {
        let t1 = array![[0.0, 0.0, 0.0, 1.0]];
        let t2 = array![[0.0, 1.0, 1.0, 1.0]];
        let tm = build_transition_matrix(&t1, &t2).unwrap();
        assert_eq!(tm.classes(), &[0, 1]);
        assert_eq!(tm.counts(), &array![[1u64, 2], [0, 1]]);
        assert_abs_diff_eq!(tm.probs()[[0, 0]], 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tm.probs()[[0, 1]], 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tm.probs()[[1, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nodata_dropped_pairwise() {
        let t1 = array![[-9999.0, 1.0, 2.0, f64::NAN]];
        let t2 = array![[1.0, -1.0, 2.0, 1.0]];
        let tm = build_transition_matrix(&t1, &t2).unwrap();
        // Only the (2 -> 2) pair survives.
        assert_eq!(tm.classes(), &[2]);
        assert_eq!(tm.n_pixels(), 1);
    }

    #[test]
    fn class_only_in_second_date_has_zero_row() {
        let t1 = array![[1.0, 1.0]];
        let t2 = array![[1.0, 4.0]];
        let tm = build_transition_matrix(&t1, &t2).unwrap();
        assert_eq!(tm.classes(), &[1, 4]);
        assert_eq!(tm.probs().row(1).sum(), 0.0);
        assert_abs_diff_eq!(tm.probs().row(0).sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn shape_mismatch() {
        let t1 = Array2::<f64>::zeros((2, 3));
        let t2 = Array2::<f64>::zeros((3, 2));
        let err = build_transition_matrix(&t1, &t2).unwrap_err();
        assert!(matches!(err, MarkovError::ShapeMismatch { .. }));
    }

    #[test]
    fn fractional_class_rejected() {
        let t1 = array![[1.5]];
        let t2 = array![[1.0]];
        assert_eq!(
            build_transition_matrix(&t1, &t2).unwrap_err(),
            MarkovError::NonIntegerClass(1.5)
        );
    }

    #[test]
    fn all_nodata_gives_empty_matrix() {
        let t = array![[-1.0, -1.0]];
        let tm = build_transition_matrix(&t, &t).unwrap();
        assert_eq!(tm.n_classes(), 0);
        assert_eq!(tm.probs().dim(), (0, 0));
    }
}
