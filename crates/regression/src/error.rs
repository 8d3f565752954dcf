//! Error types for the landtrend-regression crate.

/// Error type for all fallible operations in the landtrend-regression crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegressionError {
    /// Returned when years and values differ in length.
    #[error("length mismatch: {years} years but {values} values")]
    LengthMismatch {
        /// Number of years supplied.
        years: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// Returned when the series is too short for a residual standard error.
    #[error(
        "insufficient data: got {n} observations, need at least {min} (n - 2 degrees of freedom)"
    )]
    InsufficientData {
        /// Number of observations provided.
        n: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned when a value is NaN or infinite.
    #[error("input data contains non-finite values")]
    NonFiniteData,

    /// Returned when every year is identical.
    #[error("years are constant; slope is undefined")]
    ConstantYears,

    /// Returned when exponential mode meets a value that has no logarithm.
    #[error("exponential trend requires positive values, got {value} at index {index}")]
    NonPositiveValue {
        /// Position of the offending value.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when more forecast periods are requested than allowed.
    #[error("periods must be at most {max}, got {periods}")]
    PeriodsOutOfRange {
        /// Requested number of periods.
        periods: usize,
        /// Largest accepted number of periods.
        max: usize,
    },

    /// Returned when a future year does not fit in an `i64`.
    #[error("forecast year overflows: last year {last} plus {periods} periods")]
    YearOverflow {
        /// Last observed year.
        last: i64,
        /// Requested number of periods.
        periods: usize,
    },

    /// Returned when the trend model name is not recognised.
    #[error("unknown trend type {0:?} (expected \"linear\" or \"exponential\")")]
    UnknownModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_length_mismatch() {
        let e = RegressionError::LengthMismatch {
            years: 4,
            values: 3,
        };
        assert_eq!(e.to_string(), "length mismatch: 4 years but 3 values");
    }

    #[test]
    fn error_insufficient_data() {
        let e = RegressionError::InsufficientData { n: 2, min: 3 };
        assert_eq!(
            e.to_string(),
            "insufficient data: got 2 observations, need at least 3 (n - 2 degrees of freedom)"
        );
    }

    #[test]
    fn error_non_positive() {
        let e = RegressionError::NonPositiveValue {
            index: 1,
            value: 0.0,
        };
        assert_eq!(
            e.to_string(),
            "exponential trend requires positive values, got 0 at index 1"
        );
    }

    #[test]
    fn error_periods_out_of_range() {
        let e = RegressionError::PeriodsOutOfRange {
            periods: 5000,
            max: 1000,
        };
        assert_eq!(e.to_string(), "periods must be at most 1000, got 5000");
    }

    #[test]
    fn error_unknown_model() {
        let e = RegressionError::UnknownModel("cubic".to_string());
        assert_eq!(
            e.to_string(),
            "unknown trend type \"cubic\" (expected \"linear\" or \"exponential\")"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<RegressionError>();
    }
}
