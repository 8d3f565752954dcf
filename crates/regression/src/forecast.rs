//! OLS trend fitting and interval extrapolation.

use serde::Serialize;
use tracing::debug;

use crate::error::RegressionError;
use crate::model::TrendModel;

/// Normal-approximation multiplier for a two-sided 95% interval.
///
/// Used in place of a Student-t critical value regardless of sample size.
pub const Z_95: f64 = 1.96;

/// Largest number of future years [`forecast_trend`] will extrapolate.
pub const MAX_PERIODS: usize = 1000;

/// Result of a trend extrapolation.
///
/// `slope` and `intercept` are reported in the space the regression was
/// fitted in (log space for [`TrendModel::Exponential`]); `forecast` and
/// `conf_int` are on the observed scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendForecast {
    pub slope: f64,
    pub intercept: f64,
    pub growth_rate: f64,
    pub historical_years: Vec<i64>,
    pub historical_values: Vec<f64>,
    pub future_years: Vec<i64>,
    pub forecast: Vec<f64>,
    /// `[lower, upper]` per future year.
    pub conf_int: Vec<[f64; 2]>,
}

/// Fits a trend to `values` over `years` and extrapolates `periods` years
/// past the last observed year.
///
/// The prediction interval half-width at year `x` is
/// `1.96 * s * sqrt(1 + 1/n + (x - x̄)² / Sxx)` with `s² = SSR / (n - 2)`.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`RegressionError::LengthMismatch`] | `years.len() != values.len()` |
/// | [`RegressionError::InsufficientData`] | fewer than 3 observations |
/// | [`RegressionError::NonFiniteData`] | any value is NaN or infinite |
/// | [`RegressionError::NonPositiveValue`] | exponential mode and a value `<= 0` |
/// | [`RegressionError::ConstantYears`] | all years identical |
/// | [`RegressionError::PeriodsOutOfRange`] | `periods > MAX_PERIODS` |
/// | [`RegressionError::YearOverflow`] | a future year exceeds `i64::MAX` |
pub fn forecast_trend(
    years: &[i64],
    values: &[f64],
    model: TrendModel,
    periods: usize,
) -> Result<TrendForecast, RegressionError> {
    if periods > MAX_PERIODS {
        return Err(RegressionError::PeriodsOutOfRange {
            periods,
            max: MAX_PERIODS,
        });
    }
    if years.len() != values.len() {
        return Err(RegressionError::LengthMismatch {
            years: years.len(),
            values: values.len(),
        });
    }
    let n = values.len();
    if n < 3 {
        return Err(RegressionError::InsufficientData { n, min: 3 });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(RegressionError::NonFiniteData);
    }
    if model == TrendModel::Exponential {
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| **v <= 0.0) {
            return Err(RegressionError::NonPositiveValue { index, value });
        }
    }

    let last = years[n - 1];
    let future_years: Vec<i64> = (1..=periods as i64)
        .map(|k| last.checked_add(k))
        .collect::<Option<_>>()
        .ok_or(RegressionError::YearOverflow { last, periods })?;

    let x: Vec<f64> = years.iter().map(|&y| y as f64).collect();
    let y: Vec<f64> = values.iter().map(|&v| model.to_fit_space(v)).collect();

    let fit = landtrend_stats::linear_fit(&x, &y).ok_or(RegressionError::ConstantYears)?;
    let dof = (n - 2) as f64;
    let std_err = (fit.ssr / dof).sqrt();
    debug!(
        %model,
        n,
        slope = fit.slope,
        intercept = fit.intercept,
        std_err,
        "fitted trend"
    );

    let mut forecast = Vec::with_capacity(periods);
    let mut conf_int = Vec::with_capacity(periods);
    for &year in &future_years {
        let xv = year as f64;
        let pred = fit.predict(xv);
        let se_forecast =
            std_err * (1.0 + 1.0 / n as f64 + (xv - fit.mean_x).powi(2) / fit.sxx).sqrt();
        let margin = Z_95 * se_forecast;

        forecast.push(model.from_fit_space(pred));
        conf_int.push([
            model.from_fit_space(pred - margin),
            model.from_fit_space(pred + margin),
        ]);
    }

    Ok(TrendForecast {
        slope: fit.slope,
        intercept: fit.intercept,
        growth_rate: model.growth_rate(fit.slope),
        historical_years: years.to_vec(),
        historical_values: values.to_vec(),
        future_years,
        forecast,
        conf_int,
    })
}
