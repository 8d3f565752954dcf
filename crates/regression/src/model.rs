//! Trend model selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegressionError;

/// Shape of the fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendModel {
    /// `value = a + b * year`; growth rate is the slope.
    #[default]
    Linear,
    /// `ln(value) = a + b * year`; growth rate is `(e^b - 1) * 100` percent.
    Exponential,
}

impl TrendModel {
    /// Maps an observed value into the space the regression is fitted in.
    pub(crate) fn to_fit_space(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Exponential => value.ln(),
        }
    }

    /// Maps a fitted-space value back to the observed scale.
    pub(crate) fn from_fit_space(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Exponential => value.exp(),
        }
    }

    /// Growth rate implied by a fitted slope.
    pub fn growth_rate(self, slope: f64) -> f64 {
        match self {
            Self::Linear => slope,
            Self::Exponential => (slope.exp() - 1.0) * 100.0,
        }
    }
}

impl FromStr for TrendModel {
    type Err = RegressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "exponential" => Ok(Self::Exponential),
            _ => Err(RegressionError::UnknownModel(s.to_string())),
        }
    }
}

impl fmt::Display for TrendModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Exponential => f.write_str("exponential"),
        }
    }
}
