//! Nelder-Mead optimizer for ARMA maximum-likelihood estimation.
//!
//! Wraps the `argmin` crate to minimize the negative concentrated
//! log-likelihood over unconstrained PACF parameters.
//!
//! **Not part of the public API.**

use argmin::core::{CostFunction, Executor};
use argmin::solver::neldermead::NelderMead;

use tracing::debug;

use crate::error::ArimaError;
use crate::fit::{ArmaFit, FitEstimates};
use crate::kalman;
use crate::params;
use crate::spec::ArmaSpec;
use crate::state_space::StateSpace;

/// Fits an ARMA(p,q) model to data via exact MLE.
///
/// 1. Validate data
/// 2. Center on the sample mean (when the model includes one)
/// 3. Optimize concentrated log-likelihood via Nelder-Mead
/// 4. Extract final parameters via full Kalman pass
pub(crate) fn fit_arma(spec: ArmaSpec, data: &[f64]) -> Result<ArmaFit, ArimaError> {
    let (p, q) = (spec.p(), spec.q());

    if data.is_empty() {
        return Err(ArimaError::EmptyData);
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(ArimaError::NonFiniteData);
    }
    let min_len = p.max(q).max(1) + 1;
    if data.len() < min_len {
        return Err(ArimaError::InsufficientData {
            n: data.len(),
            min: min_len,
        });
    }
    let min_val = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max_val = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max_val - min_val).abs() < f64::EPSILON {
        return Err(ArimaError::ConstantData);
    }

    let n = data.len() as f64;
    let mean = if spec.include_mean() {
        landtrend_stats::mean(data)
    } else {
        0.0
    };
    let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();

    // ARMA(0,0): closed form
    if p == 0 && q == 0 {
        let sigma2 = centered.iter().map(|x| x * x).sum::<f64>() / n;
        let log_likelihood =
            -0.5 * n * (2.0 * std::f64::consts::PI).ln() - 0.5 * n * sigma2.ln() - 0.5 * n;
        return Ok(ArmaFit::new(
            spec,
            FitEstimates {
                ar: vec![],
                ma: vec![],
                sigma2,
                residuals: centered,
                log_likelihood,
                mean,
                state: vec![0.0],
            },
        ));
    }

    // Simplex: origin plus a 0.5 step along each axis
    let dim = p + q;
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(vec![0.0; dim]);
    for i in 0..dim {
        let mut vertex = vec![0.0; dim];
        vertex[i] = 0.5;
        simplex.push(vertex);
    }

    let cost = ArmaCost { data: &centered, p };
    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(1e-8)
        .map_err(|_| ArimaError::OptimizationFailed)?;
    let result = Executor::new(cost, solver)
        .configure(|state| state.max_iters(1000))
        .run()
        .map_err(|_| ArimaError::OptimizationFailed)?;

    let best_params = result
        .state()
        .best_param
        .as_ref()
        .ok_or(ArimaError::OptimizationFailed)?;

    let (alpha, beta) = best_params.split_at(p);
    let ar = params::unconstrained_to_coeffs(alpha);
    let ma = params::unconstrained_to_coeffs(beta);

    let ss = StateSpace::new(&ar, &ma);
    let output = kalman::kalman_full(&ss, &centered)?;
    debug!(
        p,
        q,
        sigma2 = output.sigma2,
        loglik = output.log_likelihood,
        iters = result.state().iter,
        "fitted ARMA"
    );

    Ok(ArmaFit::new(
        spec,
        FitEstimates {
            ar,
            ma,
            sigma2: output.sigma2,
            residuals: output.residuals,
            log_likelihood: output.log_likelihood,
            mean,
            state: output.state,
        },
    ))
}

/// Cost function for argmin: negative concentrated log-likelihood.
struct ArmaCost<'a> {
    data: &'a [f64],
    p: usize,
}

impl CostFunction for ArmaCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let (alpha, beta) = params.split_at(self.p);
        let ar = params::unconstrained_to_coeffs(alpha);
        let ma = params::unconstrained_to_coeffs(beta);
        let ss = StateSpace::new(&ar, &ma);

        match kalman::kalman_concentrated_loglik(&ss, self.data) {
            Ok(loglik) if loglik.is_finite() => Ok(-loglik),
            _ => Ok(f64::MAX),
        }
    }
}
