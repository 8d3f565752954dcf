//! Automatic ARIMA(p,d,q) selection.

use tracing::{debug, info};

use crate::difference::Integrator;
use crate::error::ArimaError;
use crate::forecast::ArimaModel;
use crate::kpss::{is_flat, ndiffs};
use crate::selection::select_best_aic;

/// Fewest observations [`auto_arima`] accepts.
pub const MIN_OBSERVATIONS: usize = 3;

/// Search bounds for [`auto_arima`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArimaConfig {
    max_p: usize,
    max_q: usize,
    max_d: usize,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            max_p: 3,
            max_q: 3,
            max_d: 2,
        }
    }
}

impl ArimaConfig {
    /// Set the largest AR order searched.
    pub fn with_max_p(mut self, max_p: usize) -> Self {
        self.max_p = max_p;
        self
    }

    /// Set the largest MA order searched.
    pub fn with_max_q(mut self, max_q: usize) -> Self {
        self.max_q = max_q;
        self
    }

    /// Set the largest differencing order.
    pub fn with_max_d(mut self, max_d: usize) -> Self {
        self.max_d = max_d;
        self
    }

    pub fn max_p(&self) -> usize {
        self.max_p
    }

    pub fn max_q(&self) -> usize {
        self.max_q
    }

    pub fn max_d(&self) -> usize {
        self.max_d
    }

    /// Validates this configuration.
    ///
    /// Orders are capped at 5 (AR/MA) and 2 (differencing).
    pub fn validate(&self) -> Result<(), ArimaError> {
        if self.max_p > 5 || self.max_q > 5 {
            return Err(ArimaError::InvalidConfig {
                reason: format!(
                    "max_p and max_q must be <= 5, got {} and {}",
                    self.max_p, self.max_q
                ),
            });
        }
        if self.max_d > 2 {
            return Err(ArimaError::InvalidConfig {
                reason: format!("max_d must be <= 2, got {}", self.max_d),
            });
        }
        Ok(())
    }
}

/// Chooses and fits an ARIMA(p,d,q) model for `data`.
///
/// 1. `d` from repeated KPSS tests ([`ndiffs`](crate::ndiffs)), at most `max_d`.
/// 2. If the differenced series is flat the model is deterministic: the
///    constant difference is carried forward with zero variance.
/// 3. Otherwise every `(p, q)` up to the configured bounds is fitted on the
///    differenced series, with a mean term when `d < 2`; lowest AIC wins.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`ArimaError::EmptyData`] | `data` is empty |
/// | [`ArimaError::NonFiniteData`] | any element is NaN or infinite |
/// | [`ArimaError::InsufficientData`] | fewer than 3 observations |
/// | [`ArimaError::InvalidConfig`] | `config` fails validation |
/// | [`ArimaError::AllCandidatesFailed`] | no `(p, q)` candidate could be fitted |
pub fn auto_arima(data: &[f64], config: &ArimaConfig) -> Result<ArimaModel, ArimaError> {
    config.validate()?;
    if data.is_empty() {
        return Err(ArimaError::EmptyData);
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(ArimaError::NonFiniteData);
    }
    if data.len() < MIN_OBSERVATIONS {
        return Err(ArimaError::InsufficientData {
            n: data.len(),
            min: MIN_OBSERVATIONS,
        });
    }

    let d = ndiffs(data, config.max_d);
    let (differenced, integrator) = Integrator::new(data, d);
    debug!(d, n = differenced.len(), "differencing order chosen");

    if is_flat(&differenced) {
        let level = landtrend_stats::mean(&differenced);
        info!(d, level, "differenced series is flat, using deterministic model");
        return Ok(ArimaModel::deterministic(d, level, integrator));
    }

    let fit = select_best_aic(&differenced, config.max_p, config.max_q, d < 2)?;
    let (p, q) = fit.order();
    info!(p, d, q, aic = fit.aic(), "selected ARIMA order");
    Ok(ArimaModel::fitted(d, fit, integrator))
}
