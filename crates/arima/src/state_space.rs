//! ARMA state-space representation.
//!
//! ```text
//! x[t+1] = T * x[t] + R * e[t]     (state transition)
//! y[t]   = x[t][0]                 (observation)
//! ```
//!
//! `T` is the companion matrix of the AR polynomial, `R = [1, θ₁, …, θ_q]`
//! padded to the state dimension, and `e[t] ~ N(0, sigma2)`.
//!
//! **Not part of the public API.**

use ndarray::{Array1, Array2, Axis};

/// State-space form of an ARMA(p,q) model.
#[derive(Clone, Debug)]
pub(crate) struct StateSpace {
    r: usize,
    t: Array2<f64>,
    rrt: Array2<f64>,
}

impl StateSpace {
    /// Builds the companion-form system for `ar` / `ma` coefficients.
    pub(crate) fn new(ar: &[f64], ma: &[f64]) -> Self {
        let p = ar.len();
        let q = ma.len();
        let r = p.max(q + 1).max(1);

        let mut t = Array2::zeros((r, r));
        for (i, &phi) in ar.iter().enumerate() {
            t[[i, 0]] = phi;
        }
        for i in 0..r - 1 {
            t[[i, i + 1]] = 1.0;
        }

        let mut r_vec = Array1::zeros(r);
        r_vec[0] = 1.0;
        for (j, &theta) in ma.iter().enumerate() {
            r_vec[j + 1] = theta;
        }
        let rrt = r_vec
            .view()
            .insert_axis(Axis(1))
            .dot(&r_vec.view().insert_axis(Axis(0)));

        Self { r, t, rrt }
    }

    /// State dimension `max(p, q + 1)`.
    pub(crate) fn r(&self) -> usize {
        self.r
    }

    /// Companion transition matrix (r×r).
    pub(crate) fn t(&self) -> &Array2<f64> {
        &self.t
    }

    /// `R Rᵀ` (r×r).
    pub(crate) fn rrt(&self) -> &Array2<f64> {
        &self.rrt
    }

    /// Observations implied by propagating `state` forward `steps` times
    /// with zero future innovations. The first value is `state[0]`.
    pub(crate) fn project(&self, state: &[f64], steps: usize) -> Vec<f64> {
        let mut x: Array1<f64> = state.iter().copied().collect();
        if x.len() != self.r {
            x = Array1::zeros(self.r);
        }
        (0..steps)
            .map(|_| {
                let y = x[0];
                x = self.t.dot(&x);
                y
            })
            .collect()
    }
}
