//! # landtrend-arima
//!
//! Automatic ARIMA forecasting for short annual series. ARMA(p,q) models
//! are fitted by exact Gaussian maximum likelihood on their state-space
//! form (Kalman filter), the differencing order comes from KPSS tests, and
//! the (p, q) order is picked by AIC.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["data"] -->|"ndiffs (KPSS)"| B["d"]
//!     B -->|"difference d times"| C["w"]
//!     C -->|"select_best_aic"| D["ArmaFit"]
//!     D --> E["ArimaModel"]
//!     E -->|".forecast(periods)?"| F["ArimaForecast"]
//! ```
//!
//! ## Usage
//!
//! ```
//! use landtrend_arima::{ArimaConfig, auto_arima};
//!
//! let data: Vec<f64> = (0..20).map(|i| 5.0 + 2.0 * i as f64).collect();
//! let model = auto_arima(&data, &ArimaConfig::default()).unwrap();
//! let fc = model.forecast(2).unwrap();
//! assert_eq!(model.order(), (0, 1, 0));
//! assert!((fc.forecast[0] - 45.0).abs() < 1e-9);
//! ```
//!
//! A single order can be fitted directly:
//!
//! ```ignore
//! let fit = ArmaSpec::new(1, 1).fit(&data)?;
//! let next = fit.forecast(5);
//! ```
//!
//! ## Mathematical Glossary
//!
//! | Symbol | Accessor | Meaning |
//! |--------|----------|---------|
//! | phi | [`ArmaFit::ar()`] | AR coefficients: weights on past observations |
//! | theta | [`ArmaFit::ma()`] | MA coefficients: weights on past forecast errors |
//! | sigma2 | [`ArmaFit::sigma2()`] | Innovation (white-noise) variance |
//! | d | [`ArimaModel::order()`] | Number of differences taken before fitting |
//! | AIC | [`ArmaFit::aic()`] | Akaike Information Criterion (lower = better) |

mod auto;
mod difference;
mod error;
mod fit;
mod forecast;
mod kpss;
mod selection;
mod spec;

pub(crate) mod kalman;
pub(crate) mod linalg;
pub(crate) mod optimizer;
pub(crate) mod params;
pub(crate) mod state_space;

pub use auto::{ArimaConfig, MIN_OBSERVATIONS, auto_arima};
pub use difference::difference;
pub use error::ArimaError;
pub use fit::ArmaFit;
pub use forecast::{ArimaForecast, ArimaModel, MAX_PERIODS};
pub use kpss::{KPSS_CRITICAL_5PCT, kpss_statistic, ndiffs};
pub use selection::select_best_aic;
pub use spec::ArmaSpec;
