//! Error types for the landtrend-arima crate.

/// Error type for all fallible operations in the landtrend-arima crate.
///
/// This enum covers validation failures, numerical issues, and optimization
/// problems that may occur during ARMA fitting, order search and forecasting.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ArimaError {
    /// Returned when the input data is empty.
    #[error("input data is empty")]
    EmptyData,

    /// Returned when the input data has fewer observations than required.
    #[error("insufficient data: got {n} observations, need at least {min}")]
    InsufficientData {
        /// Number of observations provided.
        n: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned when the input data contains non-finite values (NaN or infinity).
    #[error("input data contains non-finite values")]
    NonFiniteData,

    /// Returned when the input data has zero variance.
    #[error("input data is constant (zero variance)")]
    ConstantData,

    /// Returned when the model has no stationary state covariance.
    #[error("fitted model is non-stationary")]
    NonStationary,

    /// Returned when the optimization algorithm fails to converge.
    #[error("optimisation failed to converge")]
    OptimizationFailed,

    /// Returned when all candidate ARMA models fail to fit.
    #[error("all ARMA candidates failed (max_p={max_p}, max_q={max_q})")]
    AllCandidatesFailed {
        /// Maximum AR order attempted.
        max_p: usize,
        /// Maximum MA order attempted.
        max_q: usize,
    },

    /// Returned when an [`ArimaConfig`](crate::ArimaConfig) value is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a forecast horizon exceeds [`MAX_PERIODS`](crate::MAX_PERIODS).
    #[error("periods must be at most {max}, got {periods}")]
    PeriodsOutOfRange {
        /// Requested horizon.
        periods: usize,
        /// Largest accepted horizon.
        max: usize,
    },

    /// Wraps a failure building the interval quantile distribution.
    ///
    /// Holds a `String` because statrs errors do not implement `Clone`.
    #[error("distribution error: {0}")]
    Distribution(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_data() {
        let err = ArimaError::EmptyData;
        assert_eq!(err.to_string(), "input data is empty");
    }

    #[test]
    fn error_insufficient_data() {
        let err = ArimaError::InsufficientData { n: 2, min: 3 };
        assert_eq!(
            err.to_string(),
            "insufficient data: got 2 observations, need at least 3"
        );
    }

    #[test]
    fn error_non_finite_data() {
        let err = ArimaError::NonFiniteData;
        assert_eq!(err.to_string(), "input data contains non-finite values");
    }

    #[test]
    fn error_constant_data() {
        let err = ArimaError::ConstantData;
        assert_eq!(err.to_string(), "input data is constant (zero variance)");
    }

    #[test]
    fn error_non_stationary() {
        let err = ArimaError::NonStationary;
        assert_eq!(err.to_string(), "fitted model is non-stationary");
    }

    #[test]
    fn error_all_candidates_failed() {
        let err = ArimaError::AllCandidatesFailed { max_p: 3, max_q: 2 };
        assert_eq!(
            err.to_string(),
            "all ARMA candidates failed (max_p=3, max_q=2)"
        );
    }

    #[test]
    fn error_invalid_config() {
        let err = ArimaError::InvalidConfig {
            reason: "max_d must be <= 2".to_string(),
        };
        assert_eq!(err.to_string(), "invalid config: max_d must be <= 2");
    }

    #[test]
    fn error_periods_out_of_range() {
        let err = ArimaError::PeriodsOutOfRange {
            periods: 1001,
            max: 1000,
        };
        assert_eq!(err.to_string(), "periods must be at most 1000, got 1001");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<ArimaError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<ArimaError>();
    }
}
