//! Kalman filter for ARMA likelihood evaluation.
//!
//! Implements a univariate Kalman filter operating on the state-space
//! representation from [`crate::state_space`]. Used internally by
//! [`ArmaSpec::fit()`](crate::ArmaSpec::fit) to evaluate the exact
//! Gaussian log-likelihood via prediction error decomposition, with the
//! innovation variance concentrated out.
//!
//! The filter is initialised at the stationary state covariance `P0`, the
//! solution of `P0 = T P0 Tᵀ + R Rᵀ` (in units of `sigma2`).
//!
//! **Not part of the public API.**

use std::f64::consts::PI;

use ndarray::{Array1, Array2, Axis};

use crate::error::ArimaError;
use crate::linalg;
use crate::state_space::StateSpace;

/// Result of a full filter pass.
#[derive(Clone, Debug)]
pub(crate) struct KalmanOutput {
    /// Concentrated innovation variance `sum(v²/F) / n`.
    pub(crate) sigma2: f64,
    /// One-step prediction errors `v[t]`.
    pub(crate) residuals: Vec<f64>,
    /// Exact Gaussian log-likelihood at `sigma2`.
    pub(crate) log_likelihood: f64,
    /// Predicted state for the first out-of-sample step.
    pub(crate) state: Vec<f64>,
}

/// Running sums of the prediction error decomposition.
struct Pass {
    sum_log_f: f64,
    ssq: f64,
    residuals: Vec<f64>,
    state: Array1<f64>,
}

/// Solves the discrete Lyapunov equation `P = T P Tᵀ + R Rᵀ`.
pub(crate) fn stationary_covariance(ss: &StateSpace) -> Result<Array2<f64>, ArimaError> {
    let r = ss.r();
    let t = ss.t();
    let n = r * r;

    // vec(P) row-major: P[i, k] lives at i * r + k.
    let mut a = Array2::<f64>::eye(n);
    for i in 0..r {
        for j in 0..r {
            for k in 0..r {
                for l in 0..r {
                    a[[i * r + k, j * r + l]] -= t[[i, j]] * t[[k, l]];
                }
            }
        }
    }
    let b: Array1<f64> = ss.rrt().iter().copied().collect();
    let x = linalg::solve(a, b).ok_or(ArimaError::NonStationary)?;
    Array2::from_shape_vec((r, r), x.to_vec()).map_err(|_| ArimaError::NonStationary)
}

fn filter(ss: &StateSpace, data: &[f64]) -> Result<Pass, ArimaError> {
    let t = ss.t();
    let rrt = ss.rrt();
    let mut a = Array1::<f64>::zeros(ss.r());
    let mut p = stationary_covariance(ss)?;

    let mut sum_log_f = 0.0;
    let mut ssq = 0.0;
    let mut residuals = Vec::with_capacity(data.len());

    for &y in data {
        let f = p[[0, 0]];
        if !(f.is_finite() && f > 0.0) {
            return Err(ArimaError::NonStationary);
        }
        let v = y - a[0];

        // K = T P Z / F with Z = e1
        let tp = t.dot(&p);
        let k = tp.column(0).to_owned() / f;

        a = t.dot(&a) + &k * v;
        let k_col = k.view().insert_axis(Axis(1));
        let k_row = k.view().insert_axis(Axis(0));
        p = tp.dot(&t.t()) + rrt - &(k_col.dot(&k_row) * f);

        sum_log_f += f.ln();
        ssq += v * v / f;
        residuals.push(v);
    }

    Ok(Pass {
        sum_log_f,
        ssq,
        residuals,
        state: a,
    })
}

fn concentrated(n: f64, sum_log_f: f64, ssq: f64) -> (f64, f64) {
    let sigma2 = ssq / n;
    let loglik = -0.5 * n * ((2.0 * PI).ln() + 1.0 + sigma2.ln()) - 0.5 * sum_log_f;
    (sigma2, loglik)
}

/// Concentrated log-likelihood only; the optimizer's objective.
pub(crate) fn kalman_concentrated_loglik(ss: &StateSpace, data: &[f64]) -> Result<f64, ArimaError> {
    let pass = filter(ss, data)?;
    let (_, loglik) = concentrated(data.len() as f64, pass.sum_log_f, pass.ssq);
    Ok(loglik)
}

/// Full pass returning variance, residuals, likelihood and final state.
pub(crate) fn kalman_full(ss: &StateSpace, data: &[f64]) -> Result<KalmanOutput, ArimaError> {
    let pass = filter(ss, data)?;
    let (sigma2, log_likelihood) = concentrated(data.len() as f64, pass.sum_log_f, pass.ssq);
    if !(sigma2.is_finite() && sigma2 > 0.0) {
        return Err(ArimaError::ConstantData);
    }
    Ok(KalmanOutput {
        sigma2,
        residuals: pass.residuals,
        log_likelihood,
        state: pass.state.to_vec(),
    })
}
