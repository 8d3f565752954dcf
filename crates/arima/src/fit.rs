//! Fitted ARMA model results.

use crate::spec::ArmaSpec;
use crate::state_space::StateSpace;

/// Raw estimates produced by the optimizer (crate-internal).
#[derive(Clone, Debug)]
pub(crate) struct FitEstimates {
    pub(crate) ar: Vec<f64>,
    pub(crate) ma: Vec<f64>,
    pub(crate) sigma2: f64,
    pub(crate) residuals: Vec<f64>,
    pub(crate) log_likelihood: f64,
    pub(crate) mean: f64,
    pub(crate) state: Vec<f64>,
}

/// A fitted ARMA(p,q) model produced by [`ArmaSpec::fit()`].
///
/// Contains estimated AR (`phi`) and MA (`theta`) coefficients,
/// innovation variance (`sigma2`), residuals, log-likelihood and the
/// filtered state at the end of the sample.
///
/// ```mermaid
/// graph LR
///     B["ArmaFit"] --> C[".ar() / .ma()"]
///     B --> D[".sigma2()"]
///     B --> E[".aic()"]
///     B --> F[".forecast(h)"]
/// ```
#[derive(Clone, Debug)]
pub struct ArmaFit {
    spec: ArmaSpec,
    est: FitEstimates,
}

impl ArmaFit {
    pub(crate) fn new(spec: ArmaSpec, est: FitEstimates) -> Self {
        Self { spec, est }
    }

    /// Returns the [`ArmaSpec`] that produced this fit.
    pub fn spec(&self) -> ArmaSpec {
        self.spec
    }

    /// Returns the `(p, q)` order of the fitted model.
    pub fn order(&self) -> (usize, usize) {
        (self.spec.p(), self.spec.q())
    }

    /// Returns the AR coefficients (`phi`).
    pub fn ar(&self) -> &[f64] {
        &self.est.ar
    }

    /// Returns the MA coefficients (`theta`).
    pub fn ma(&self) -> &[f64] {
        &self.est.ma
    }

    /// Returns the innovation variance (`sigma2`).
    pub fn sigma2(&self) -> f64 {
        self.est.sigma2
    }

    /// Returns the one-step-ahead prediction residuals.
    pub fn residuals(&self) -> &[f64] {
        &self.est.residuals
    }

    /// Returns the maximised log-likelihood.
    pub fn log_likelihood(&self) -> f64 {
        self.est.log_likelihood
    }

    /// Returns the estimated mean (0 when the model excludes it).
    pub fn mean(&self) -> f64 {
        self.est.mean
    }

    /// Akaike Information Criterion: `2k - 2 * log_likelihood`, with `k` from
    /// [`ArmaSpec::n_params()`]. Lower is better.
    pub fn aic(&self) -> f64 {
        let k = self.spec.n_params() as f64;
        2.0 * k - 2.0 * self.est.log_likelihood
    }

    /// Point forecasts for the next `h` observations of the fitted series.
    pub fn forecast(&self, h: usize) -> Vec<f64> {
        let ss = StateSpace::new(&self.est.ar, &self.est.ma);
        ss.project(&self.est.state, h)
            .into_iter()
            .map(|y| y + self.est.mean)
            .collect()
    }
}
