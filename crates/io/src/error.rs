//! Error types for landtrend-io.

/// Error type for all fallible operations in the landtrend-io crate.
///
/// Covers malformed or unsupported raster bytes, malformed CSV, and tables
/// that lack the columns the series heuristic falls back to.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Wraps an error originating from the TIFF decoder.
    #[error("tiff error: {reason}")]
    Tiff {
        /// Description of the underlying TIFF failure.
        reason: String,
    },

    /// Returned when the raster sample type cannot be represented.
    #[error("unsupported raster sample format: {0}")]
    UnsupportedFormat(String),

    /// Returned when a raster has zero width or height.
    #[error("raster has no pixels ({rows}x{cols})")]
    EmptyRaster {
        /// Row count reported by the file.
        rows: usize,
        /// Column count reported by the file.
        cols: usize,
    },

    /// Returned when decoded sample count does not match the dimensions.
    #[error("raster sample count {got} does not match {rows}x{cols}")]
    SampleCount {
        /// Declared rows.
        rows: usize,
        /// Declared columns.
        cols: usize,
        /// Number of samples decoded.
        got: usize,
    },

    /// Returned when two rasters that must align have different shapes.
    #[error("{name}: shape {got_rows}x{got_cols} does not match {rows}x{cols}")]
    ShapeMismatch {
        /// Name of the offending raster (usually the upload filename).
        name: String,
        /// Expected rows.
        rows: usize,
        /// Expected columns.
        cols: usize,
        /// Actual rows.
        got_rows: usize,
        /// Actual columns.
        got_cols: usize,
    },

    /// Wraps an error originating from the CSV reader.
    #[error("csv error: {reason}")]
    Csv {
        /// Description of the underlying CSV failure.
        reason: String,
    },

    /// Returned when a table has a header but no data rows, or no header.
    #[error("table is empty")]
    EmptyTable,

    /// Returned when the series heuristic falls back to a column that does not exist.
    #[error("no {role} column: table has {n_columns} column(s)")]
    MissingColumn {
        /// Which column was being resolved (`year` or `value`).
        role: &'static str,
        /// Number of columns in the table.
        n_columns: usize,
    },

    /// Returned when a configuration value is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}

impl From<tiff::TiffError> for IoError {
    fn from(e: tiff::TiffError) -> Self {
        IoError::Tiff {
            reason: e.to_string(),
        }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv {
            reason: e.to_string(),
        }
    }
}
