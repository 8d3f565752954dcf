//! AIC-based ARMA model order selection.

use tracing::debug;

use crate::error::ArimaError;
use crate::fit::ArmaFit;
use crate::spec::ArmaSpec;

/// Selects the best ARMA(p,q) model from a grid search over orders
/// 0..=`max_p` and 0..=`max_q`, ranked by Akaike Information Criterion
/// (AIC).
///
/// Fits every candidate `(p, q)` via [`ArmaSpec::fit()`] (with or without
/// a mean term), and returns the [`ArmaFit`] with the lowest finite
/// [`ArmaFit::aic()`]. Candidates that fail to fit are skipped. Ties keep
/// the smaller model, since candidates are visited in increasing order.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`ArimaError::AllCandidatesFailed`] | every `(p, q)` combination failed to fit |
///
/// # Example
///
/// ```ignore
/// let best = select_best_aic(&data, 3, 2, true)?;
/// println!("Best order: {:?}, AIC = {}", best.order(), best.aic());
/// ```
pub fn select_best_aic(
    data: &[f64],
    max_p: usize,
    max_q: usize,
    include_mean: bool,
) -> Result<ArmaFit, ArimaError> {
    let mut best: Option<ArmaFit> = None;

    for p in 0..=max_p {
        for q in 0..=max_q {
            let fit = match ArmaSpec::new(p, q).with_mean(include_mean).fit(data) {
                Ok(fit) => fit,
                Err(e) => {
                    debug!(p, q, error = %e, "candidate skipped");
                    continue;
                }
            };
            let aic = fit.aic();
            debug!(p, q, aic, "candidate fitted");
            if !aic.is_finite() {
                continue;
            }
            if best.as_ref().is_none_or(|b| aic < b.aic()) {
                best = Some(fit);
            }
        }
    }

    best.ok_or(ArimaError::AllCandidatesFailed { max_p, max_q })
}
