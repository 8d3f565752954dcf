//! Markov-chain normalisation and multi-step projection.

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::error::MarkovError;
use crate::transition::normalize_rows;

/// How the entries of a supplied matrix are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixMode {
    /// Raw transition counts; rows are normalised before projection.
    Counts,
    /// Already transition probabilities; used as given.
    Probabilities,
}

impl MatrixMode {
    /// Counts if any entry exceeds 1, probabilities otherwise.
    pub fn detect(matrix: &Array2<f64>) -> Self {
        if matrix.iter().any(|&v| v > 1.0) {
            Self::Counts
        } else {
            Self::Probabilities
        }
    }
}

/// One-step transition matrix together with its `steps`-th power.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovProjection {
    mode: MatrixMode,
    steps: u32,
    transition: Array2<f64>,
    future: Array2<f64>,
}

impl MarkovProjection {
    /// How the input matrix was interpreted.
    pub fn mode(&self) -> MatrixMode {
        self.mode
    }

    /// Number of transition steps projected.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Normalised one-step transition matrix.
    pub fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    /// `transition ^ steps`.
    pub fn future(&self) -> &Array2<f64> {
        &self.future
    }

    /// Propagates a class distribution (areas or shares) through the
    /// projected matrix: `initial · future`.
    pub fn distribute(&self, initial: &[f64]) -> Result<Vec<f64>, MarkovError> {
        let k = self.future.nrows();
        if initial.len() != k {
            return Err(MarkovError::DistributionLength {
                expected: k,
                got: initial.len(),
            });
        }
        let v = Array1::from(initial.to_vec());
        Ok(v.dot(&self.future).to_vec())
    }
}

/// Converts nested rows into a square, finite, non-negative matrix.
fn to_square_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>, MarkovError> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).ok_or(MarkovError::EmptyMatrix)?;
    if n_cols == 0 {
        return Err(MarkovError::EmptyMatrix);
    }
    for (row, r) in rows.iter().enumerate() {
        if r.len() != n_cols {
            return Err(MarkovError::RaggedRow {
                row,
                expected: n_cols,
                got: r.len(),
            });
        }
    }
    if n_rows != n_cols {
        return Err(MarkovError::NotSquare {
            rows: n_rows,
            cols: n_cols,
        });
    }

    let mut m = Array2::zeros((n_rows, n_cols));
    for (i, r) in rows.iter().enumerate() {
        for (j, &v) in r.iter().enumerate() {
            if !v.is_finite() {
                return Err(MarkovError::NonFiniteEntry { row: i, col: j });
            }
            if v < 0.0 {
                return Err(MarkovError::NegativeEntry {
                    row: i,
                    col: j,
                    value: v,
                });
            }
            m[[i, j]] = v;
        }
    }
    Ok(m)
}

/// Raises a square matrix to a non-negative integer power by repeated
/// squaring. `power = 0` gives the identity.
pub fn matrix_power(matrix: &Array2<f64>, power: u32) -> Array2<f64> {
    let mut result = Array2::eye(matrix.nrows());
    let mut base = matrix.clone();
    let mut e = power;
    while e > 0 {
        if e & 1 == 1 {
            result = result.dot(&base);
        }
        e >>= 1;
        if e > 0 {
            base = base.dot(&base);
        }
    }
    result
}

/// Normalises `rows` if they hold counts and projects them `steps` ahead.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`MarkovError::EmptyMatrix`] | no rows or empty first row |
/// | [`MarkovError::RaggedRow`] | rows of unequal length |
/// | [`MarkovError::NotSquare`] | row count differs from column count |
/// | [`MarkovError::NonFiniteEntry`] | NaN or infinite entry |
/// | [`MarkovError::NegativeEntry`] | entry below zero |
/// | [`MarkovError::NegativeSteps`] | `steps < 0` |
/// | [`MarkovError::TooManySteps`] | `steps > u32::MAX` |
pub fn project(rows: &[Vec<f64>], steps: i64) -> Result<MarkovProjection, MarkovError> {
    let steps = u32::try_from(steps).map_err(|_| {
        if steps < 0 {
            MarkovError::NegativeSteps(steps)
        } else {
            MarkovError::TooManySteps(steps)
        }
    })?;
    let raw = to_square_matrix(rows)?;

    let mode = MatrixMode::detect(&raw);
    let transition = match mode {
        MatrixMode::Counts => normalize_rows(&raw),
        MatrixMode::Probabilities => raw,
    };
    let future = matrix_power(&transition, steps);
    debug!(n_classes = transition.nrows(), steps, ?mode, "projected Markov chain");

    Ok(MarkovProjection {
        mode,
        steps,
        transition,
        future,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn detect_mode() {
        assert_eq!(
            MatrixMode::detect(&array![[0.5, 0.5], [0.2, 0.8]]),
            MatrixMode::Probabilities
        );
        assert_eq!(
            MatrixMode::detect(&array![[5.0, 1.0], [0.0, 1.0]]),
            MatrixMode::Counts
        );
        // Exactly 1 is still a probability.
        assert_eq!(
            MatrixMode::detect(&array![[1.0, 0.0], [0.0, 1.0]]),
            MatrixMode::Probabilities
        );
    }

    #[test]
    fn power_zero_is_identity() {
        let p = array![[0.9, 0.1], [0.3, 0.7]];
        assert_eq!(matrix_power(&p, 0), Array2::<f64>::eye(2));
    }

    #[test]
    fn power_matches_repeated_multiplication() {
        let p = array![[0.6, 0.3, 0.1], [0.2, 0.5, 0.3], [0.1, 0.1, 0.8]];
        for k in 1..=7u32 {
            let mut expected = Array2::<f64>::eye(3);
            for _ in 0..k {
                expected = expected.dot(&p);
            }
            let got = matrix_power(&p, k);
            for (a, b) in got.iter().zip(expected.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn counts_are_normalised() {
        let rows = vec![vec![3.0, 1.0], vec![0.0, 0.0]];
        let proj = project(&rows, 1).unwrap();
        assert_eq!(proj.mode(), MatrixMode::Counts);
        assert_abs_diff_eq!(proj.transition()[[0, 0]], 0.75, epsilon = 1e-12);
        assert_eq!(proj.transition().row(1).sum(), 0.0);
    }

    #[test]
    fn probabilities_used_as_given() {
        let rows = vec![vec![0.9, 0.1], vec![0.4, 0.6]];
        let proj = project(&rows, 3).unwrap();
        assert_eq!(proj.mode(), MatrixMode::Probabilities);
        assert_eq!(proj.transition(), &array![[0.9, 0.1], [0.4, 0.6]]);
        assert_eq!(proj.steps(), 3);
        for row in proj.future().rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn negative_steps_rejected() {
        let rows = vec![vec![1.0]];
        assert_eq!(
            project(&rows, -1).unwrap_err(),
            MarkovError::NegativeSteps(-1)
        );
    }

    #[test]
    fn oversized_steps_not_reported_as_negative() {
        let rows = vec![vec![1.0]];
        assert_eq!(
            project(&rows, 5_000_000_000).unwrap_err(),
            MarkovError::TooManySteps(5_000_000_000)
        );
        assert!(project(&rows, i64::from(u32::MAX)).is_ok());
    }

    #[test]
    fn non_square_rejected() {
        let rows = vec![vec![0.5, 0.5]];
        assert_eq!(
            project(&rows, 1).unwrap_err(),
            MarkovError::NotSquare { rows: 1, cols: 2 }
        );
    }

    #[test]
    fn ragged_rejected() {
        let rows = vec![vec![0.5, 0.5], vec![1.0]];
        assert!(matches!(
            project(&rows, 1).unwrap_err(),
            MarkovError::RaggedRow { row: 1, .. }
        ));
    }

    #[test]
    fn empty_rejected() {
        assert_eq!(project(&[], 1).unwrap_err(), MarkovError::EmptyMatrix);
        assert_eq!(
            project(&[vec![]], 1).unwrap_err(),
            MarkovError::EmptyMatrix
        );
    }

    #[test]
    fn non_finite_and_negative_rejected() {
        let rows = vec![vec![f64::NAN, 0.5], vec![0.5, 0.5]];
        assert!(matches!(
            project(&rows, 1).unwrap_err(),
            MarkovError::NonFiniteEntry { row: 0, col: 0 }
        ));
        let rows = vec![vec![1.5, -0.5], vec![0.5, 0.5]];
        assert!(matches!(
            project(&rows, 1).unwrap_err(),
            MarkovError::NegativeEntry { row: 0, col: 1, .. }
        ));
    }

    #[test]
    fn distribute_areas() {
        let rows = vec![vec![0.5, 0.5], vec![0.0, 1.0]];
        let proj = project(&rows, 2).unwrap();
        let areas = proj.distribute(&[100.0, 0.0]).unwrap();
        assert_abs_diff_eq!(areas[0], 25.0, epsilon = 1e-12);
        assert_abs_diff_eq!(areas[1], 75.0, epsilon = 1e-12);
        assert!(matches!(
            proj.distribute(&[1.0]),
            Err(MarkovError::DistributionLength { expected: 2, got: 1 })
        ));
    }
}
