//! Error types for the landtrend-markov crate.

/// Error type for all fallible operations in the landtrend-markov crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkovError {
    /// Returned when the matrix has no rows.
    #[error("matrix is empty")]
    EmptyMatrix,

    /// Returned when a row length differs from the first row.
    #[error("ragged matrix: row {row} has {got} entries, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },

    /// Returned when the matrix is not square.
    #[error("transition matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Returned when an entry is NaN or infinite.
    #[error("matrix entry [{row}][{col}] is not finite")]
    NonFiniteEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
    },

    /// Returned when an entry is negative.
    #[error("matrix entry [{row}][{col}] is negative: {value}")]
    NegativeEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a negative number of steps is requested.
    #[error("matrix power must be non-negative, got {0}")]
    NegativeSteps(i64),

    /// Returned when the number of steps does not fit in a `u32`.
    #[error("matrix power too large: {0}, maximum is 4294967295")]
    TooManySteps(i64),

    /// Returned when the two class grids differ in shape.
    #[error("raster dimensions do not match: {t1_rows}x{t1_cols} vs {t2_rows}x{t2_cols}")]
    ShapeMismatch {
        /// Rows of the first grid.
        t1_rows: usize,
        /// Columns of the first grid.
        t1_cols: usize,
        /// Rows of the second grid.
        t2_rows: usize,
        /// Columns of the second grid.
        t2_cols: usize,
    },

    /// Returned when a valid pixel does not hold an integral class code.
    #[error("class value {0} is not an integer")]
    NonIntegerClass(f64),

    /// Returned when an initial distribution does not match the class count.
    #[error("distribution length mismatch: expected {expected}, got {got}")]
    DistributionLength {
        /// Number of classes in the matrix.
        expected: usize,
        /// Length of the supplied distribution.
        got: usize,
    },
}
