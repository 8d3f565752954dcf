//! # landtrend-regression
//!
//! Trend extrapolation of a `year -> value` series by ordinary least
//! squares, with classical 95% prediction intervals.
//!
//! ```text
//!  years, values ──▶ [log if exponential] ──▶ OLS ──▶ forecast + bands ──▶ [exp back]
//! ```
//!
//! ```
//! use landtrend_regression::{TrendModel, forecast_trend};
//!
//! let years = [2000, 2001, 2002, 2003];
//! let values = [10.0, 12.0, 14.0, 16.0];
//! let fc = forecast_trend(&years, &values, TrendModel::Linear, 2).unwrap();
//! assert_eq!(fc.future_years, vec![2004, 2005]);
//! ```

mod error;
mod forecast;
mod model;

pub use error::RegressionError;
pub use forecast::{MAX_PERIODS, TrendForecast, Z_95, forecast_trend};
pub use model::TrendModel;
