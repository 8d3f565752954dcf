//! Error types for the landtrend-classify crate.

/// Error type for all fallible operations in the landtrend-classify crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    /// Returned when no driver layers were supplied.
    #[error("no driver rasters supplied")]
    NoDrivers,

    /// Returned when the label raster has no pixels.
    #[error("label raster is empty")]
    EmptyRaster,

    /// Returned when a driver's grid does not match the label grid.
    #[error(
        "driver {name} dimension mismatch: {rows}x{cols}, labels are {expected_rows}x{expected_cols}"
    )]
    DriverShapeMismatch {
        /// Name of the offending driver (usually the upload filename).
        name: String,
        /// Driver rows.
        rows: usize,
        /// Driver columns.
        cols: usize,
        /// Label rows.
        expected_rows: usize,
        /// Label columns.
        expected_cols: usize,
    },

    /// Returned when the sampled labels contain a single class.
    #[error("labels contain only class {class}; need both 0 and 1")]
    SingleClass {
        /// The only class present.
        class: u8,
    },

    /// Returned when a sampled pixel has a NaN or infinite driver value.
    #[error("driver {driver} has a non-finite value at pixel {pixel}")]
    NonFiniteFeature {
        /// Column (driver) index.
        driver: usize,
        /// Flattened pixel index.
        pixel: usize,
    },

    /// Returned when the logistic solver fails.
    #[error("optimisation failed: {0}")]
    Optimization(String),

    /// Returned when a [`ClassifyConfig`](crate::ClassifyConfig) value is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}
