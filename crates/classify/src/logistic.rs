//! L2-penalised binary logistic regression fitted with L-BFGS.

use argmin::core::{CostFunction, Executor, Gradient};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use ndarray::{Array2, ArrayView1};
use tracing::debug;

use crate::error::ClassifyError;

type Theta = Vec<f64>;
type MoreThuenteLS = MoreThuenteLineSearch<Theta, Theta, f64>;
type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Theta, f64>;

const LBFGS_MEMORY: usize = 10;

/// Logistic-regression settings.
///
/// Minimises `0.5 * |w|² + C * sum(log_loss)`; the intercept is not
/// penalised.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    c: f64,
    max_iters: u64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iters: 100,
        }
    }
}

/// A fitted logistic model.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    /// Set the inverse regularisation strength `C`.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set the L-BFGS iteration cap.
    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Fits weights for `x` (rows × features) against 0/1 labels `y`.
    ///
    /// Stopping at the iteration cap is not an error; the best point reached
    /// is returned.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ClassifyError::InvalidConfig`] | `C` is not positive |
    /// | [`ClassifyError::Optimization`] | the solver or line search fails |
    pub fn fit(&self, x: &Array2<f64>, y: &[u8]) -> Result<LogisticModel, ClassifyError> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(ClassifyError::InvalidConfig {
                reason: format!("C must be positive, got {}", self.c),
            });
        }
        let k = x.ncols();
        let problem = LogLoss { x, y, c: self.c };

        let solver = LbfgsMoreThuente::new(MoreThuenteLS::new(), LBFGS_MEMORY)
            .with_tolerance_grad(1e-4)
            .map_err(|e| ClassifyError::Optimization(e.to_string()))?;
        let result = Executor::new(problem, solver)
            .configure(|state| state.param(vec![0.0; k + 1]).max_iters(self.max_iters))
            .run()
            .map_err(|e| ClassifyError::Optimization(e.to_string()))?;

        let state = result.state();
        let theta = state
            .best_param
            .clone()
            .ok_or_else(|| ClassifyError::Optimization("no parameters returned".to_string()))?;
        debug!(
            iters = state.iter,
            cost = state.best_cost,
            "fitted logistic regression"
        );

        let (w, b) = theta.split_at(k);
        Ok(LogisticModel {
            coefficients: w.to_vec(),
            intercept: b[0],
        })
    }
}

impl LogisticModel {
    /// Class-1 probability for each row of `x`.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Vec<f64> {
        x.outer_iter()
            .map(|row| sigmoid(linear(&self.coefficients, self.intercept, row)))
            .collect()
    }
}

fn linear(w: &[f64], b: f64, row: ArrayView1<f64>) -> f64 {
    row.iter().zip(w).map(|(x, w)| x * w).sum::<f64>() + b
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Penalised negative log-likelihood; `theta = [w..., b]`.
struct LogLoss<'a> {
    x: &'a Array2<f64>,
    y: &'a [u8],
    c: f64,
}

impl LogLoss<'_> {
    fn split<'t>(&self, theta: &'t [f64]) -> (&'t [f64], f64) {
        let (w, b) = theta.split_at(self.x.ncols());
        (w, b[0])
    }
}

impl CostFunction for LogLoss<'_> {
    type Param = Theta;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let (w, b) = self.split(theta);
        let loss: f64 = self
            .x
            .outer_iter()
            .zip(self.y)
            .map(|(row, &t)| {
                let z = linear(w, b, row);
                softplus(z) - f64::from(t) * z
            })
            .sum();
        let penalty = 0.5 * w.iter().map(|v| v * v).sum::<f64>();
        Ok(penalty + self.c * loss)
    }
}

impl Gradient for LogLoss<'_> {
    type Param = Theta;
    type Gradient = Theta;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        let (w, b) = self.split(theta);
        let k = w.len();
        let mut grad = vec![0.0; k + 1];
        for (row, &t) in self.x.outer_iter().zip(self.y) {
            let r = sigmoid(linear(w, b, row)) - f64::from(t);
            for (g, x) in grad.iter_mut().zip(row.iter()) {
                *g += r * x;
            }
            grad[k] += r;
        }
        for (j, g) in grad.iter_mut().enumerate() {
            *g *= self.c;
            if j < k {
                *g += w[j];
            }
        }
        Ok(grad)
    }
}
