//! ARMA model specification (unfitted).

use crate::error::ArimaError;
use crate::fit::ArmaFit;

/// An unfitted ARMA(p,q) model specification.
///
/// Create a spec with [`ArmaSpec::new()`], optionally drop the mean term
/// with [`ArmaSpec::with_mean()`], then call [`ArmaSpec::fit()`] to obtain an
/// [`ArmaFit`].
///
/// ```mermaid
/// graph LR
///     A["ArmaSpec::new(p, q)"] -->|".with_mean(false)"| A
///     A -->|".fit(&data)?"| B["ArmaFit"]
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmaSpec {
    p: usize,
    q: usize,
    include_mean: bool,
}

impl ArmaSpec {
    /// Creates a new ARMA(p,q) specification with a mean term.
    ///
    /// # Example
    ///
    /// ```
    /// use landtrend_arima::ArmaSpec;
    ///
    /// let spec = ArmaSpec::new(2, 1);
    /// assert_eq!(spec.p(), 2);
    /// assert_eq!(spec.q(), 1);
    /// assert!(spec.include_mean());
    /// ```
    pub fn new(p: usize, q: usize) -> Self {
        Self {
            p,
            q,
            include_mean: true,
        }
    }

    /// Sets whether the sample mean is estimated and removed before fitting.
    ///
    /// Without a mean the series is modelled as zero-mean ARMA.
    pub fn with_mean(mut self, include_mean: bool) -> Self {
        self.include_mean = include_mean;
        self
    }

    /// Returns the AR order (`p`).
    pub fn p(&self) -> usize {
        self.p
    }

    /// Returns the MA order (`q`).
    pub fn q(&self) -> usize {
        self.q
    }

    /// Whether a mean term is estimated.
    pub fn include_mean(&self) -> bool {
        self.include_mean
    }

    /// Number of estimated parameters: coefficients, variance, and the mean
    /// when included.
    pub fn n_params(&self) -> usize {
        self.p + self.q + 1 + usize::from(self.include_mean)
    }

    /// Fits this ARMA(p,q) specification to observed data via exact
    /// maximum-likelihood (Kalman filter).
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ArimaError::EmptyData`] | `data` is empty |
    /// | [`ArimaError::NonFiniteData`] | any element is NaN or infinite |
    /// | [`ArimaError::InsufficientData`] | `data.len() < max(p, q, 1) + 1` |
    /// | [`ArimaError::ConstantData`] | all elements are identical |
    /// | [`ArimaError::NonStationary`] | no stationary state covariance at the optimum |
    /// | [`ArimaError::OptimizationFailed`] | optimizer fails to converge |
    pub fn fit(&self, data: &[f64]) -> Result<ArmaFit, ArimaError> {
        crate::optimizer::fit_arma(*self, data)
    }
}
