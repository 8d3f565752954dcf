//! Stationary / invertible reparametrisation of ARMA coefficients.
//!
//! **Not part of the public API.**

/// Maps unconstrained optimizer parameters to polynomial coefficients whose
/// roots lie outside the unit circle.
///
/// Each parameter is squashed to a partial autocorrelation `tanh(alpha_k)`
/// in (-1, 1); the Durbin-Levinson recursion then turns the partial
/// autocorrelations into coefficients. Applied separately to the AR block
/// (stationarity) and the MA block (invertibility).
pub(crate) fn unconstrained_to_coeffs(alpha: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(alpha.len());
    for (k, a) in alpha.iter().enumerate() {
        let r = a.tanh();
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = prev[j] - r * prev[k - 1 - j];
        }
        phi.push(r);
    }
    phi
}
