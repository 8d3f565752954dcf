//! Selected ARIMA models and their forecasts.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::difference::Integrator;
use crate::error::ArimaError;
use crate::fit::ArmaFit;

/// Largest horizon [`ArimaModel::forecast`] accepts.
pub const MAX_PERIODS: usize = 1000;

/// Point forecasts with 95% intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaForecast {
    pub forecast: Vec<f64>,
    /// `[lower, upper]` per horizon.
    pub conf_int: Vec<[f64; 2]>,
}

#[derive(Debug, Clone)]
enum Dynamics {
    Fitted(ArmaFit),
    /// Flat differenced series: `level` repeats forever with no noise.
    Deterministic { level: f64 },
}

/// An ARIMA(p,d,q) model chosen by [`auto_arima`](crate::auto_arima).
#[derive(Debug, Clone)]
pub struct ArimaModel {
    d: usize,
    dynamics: Dynamics,
    integrator: Integrator,
}

impl ArimaModel {
    pub(crate) fn fitted(d: usize, fit: ArmaFit, integrator: Integrator) -> Self {
        Self {
            d,
            dynamics: Dynamics::Fitted(fit),
            integrator,
        }
    }

    pub(crate) fn deterministic(d: usize, level: f64, integrator: Integrator) -> Self {
        Self {
            d,
            dynamics: Dynamics::Deterministic { level },
            integrator,
        }
    }

    /// `(p, d, q)`.
    pub fn order(&self) -> (usize, usize, usize) {
        match &self.dynamics {
            Dynamics::Fitted(fit) => {
                let (p, q) = fit.order();
                (p, self.d, q)
            }
            Dynamics::Deterministic { .. } => (0, self.d, 0),
        }
    }

    /// AIC of the ARMA part; `None` for a deterministic model.
    pub fn aic(&self) -> Option<f64> {
        match &self.dynamics {
            Dynamics::Fitted(fit) => Some(fit.aic()),
            Dynamics::Deterministic { .. } => None,
        }
    }

    /// Innovation variance (0 for a deterministic model).
    pub fn sigma2(&self) -> f64 {
        match &self.dynamics {
            Dynamics::Fitted(fit) => fit.sigma2(),
            Dynamics::Deterministic { .. } => 0.0,
        }
    }

    /// The ARMA fit on the differenced series, if any.
    pub fn arma(&self) -> Option<&ArmaFit> {
        match &self.dynamics {
            Dynamics::Fitted(fit) => Some(fit),
            Dynamics::Deterministic { .. } => None,
        }
    }

    /// Forecasts `periods` steps past the end of the sample.
    ///
    /// Differenced-scale forecasts come from the final filtered state and
    /// are integrated back `d` times. Interval half-width at horizon `h` is
    /// `z_0.975 * sqrt(sigma2 * sum_{j<h} psi_j²)`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ArimaError::PeriodsOutOfRange`] | `periods > MAX_PERIODS` |
    /// | [`ArimaError::Distribution`] | the normal quantile cannot be built |
    pub fn forecast(&self, periods: usize) -> Result<ArimaForecast, ArimaError> {
        if periods > MAX_PERIODS {
            return Err(ArimaError::PeriodsOutOfRange {
                periods,
                max: MAX_PERIODS,
            });
        }
        let (differenced, psi) = match &self.dynamics {
            Dynamics::Fitted(fit) => (
                fit.forecast(periods),
                psi_weights(fit.ar(), fit.ma(), self.d, periods),
            ),
            Dynamics::Deterministic { level } => {
                (vec![*level; periods], psi_weights(&[], &[], self.d, periods))
            }
        };

        let mut integrator = self.integrator.clone();
        let forecast: Vec<f64> = differenced
            .into_iter()
            .map(|w| integrator.integrate(w))
            .collect();

        let z = Normal::new(0.0, 1.0)
            .map_err(|e| ArimaError::Distribution(e.to_string()))?
            .inverse_cdf(0.975);
        let sigma2 = self.sigma2();
        let mut cumulative = 0.0;
        let conf_int = forecast
            .iter()
            .zip(&psi)
            .map(|(&f, &w)| {
                cumulative += w * w;
                let half = z * (sigma2 * cumulative).sqrt();
                [f - half, f + half]
            })
            .collect();

        Ok(ArimaForecast { forecast, conf_int })
    }
}

/// First `n` coefficients of `theta(B) / (phi(B) (1 - B)^d)`.
pub(crate) fn psi_weights(ar: &[f64], ma: &[f64], d: usize, n: usize) -> Vec<f64> {
    // phi(B)(1-B)^d = 1 - sum phi*_i B^i
    let mut poly: Vec<f64> = std::iter::once(1.0).chain(ar.iter().map(|a| -a)).collect();
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, &c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    let phi_star: Vec<f64> = poly[1..].iter().map(|c| -c).collect();

    let mut psi: Vec<f64> = Vec::with_capacity(n);
    for j in 0..n {
        let mut value = if j == 0 {
            1.0
        } else {
            ma.get(j - 1).copied().unwrap_or(0.0)
        };
        for i in 1..=j.min(phi_star.len()) {
            value += phi_star[i - 1] * psi[j - i];
        }
        psi.push(value);
    }
    psi
}
