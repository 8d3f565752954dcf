//! KPSS level-stationarity test and the differencing order it implies.

use landtrend_stats::{mean, sum_sq_dev};
use tracing::debug;

use crate::difference::difference;

/// 5% critical value of the KPSS level-stationarity statistic.
pub const KPSS_CRITICAL_5PCT: f64 = 0.463;

/// Bartlett-window lag `trunc(4 * (n / 100)^(1/4))`.
fn bartlett_lag(n: usize) -> usize {
    (4.0 * (n as f64 / 100.0).powf(0.25)).trunc() as usize
}

/// KPSS statistic for the null of level stationarity.
///
/// Returns `None` when the statistic is undefined (fewer than two points or
/// zero long-run variance).
pub fn kpss_statistic(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let level = mean(data);
    let e: Vec<f64> = data.iter().map(|x| x - level).collect();

    let mut partial = 0.0;
    let eta = e
        .iter()
        .map(|v| {
            partial += v;
            partial * partial
        })
        .sum::<f64>()
        / (nf * nf);

    let lags = bartlett_lag(n).min(n - 1);
    let mut s2 = sum_sq_dev(data) / nf;
    for s in 1..=lags {
        let w = 1.0 - s as f64 / (lags as f64 + 1.0);
        let gamma: f64 = e[s..].iter().zip(&e[..n - s]).map(|(a, b)| a * b).sum();
        s2 += 2.0 * w * gamma / nf;
    }

    (s2 > 0.0 && s2.is_finite()).then(|| eta / s2)
}

/// True when the series has (numerically) zero spread.
pub(crate) fn is_flat(data: &[f64]) -> bool {
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scale = min.abs().max(max.abs()).max(1.0);
    max - min <= 1e-9 * scale
}

/// Number of differences needed before KPSS no longer rejects level
/// stationarity at 5%, capped at `max_d`.
///
/// Stops early when the series is flat or differencing again would leave
/// fewer than three points.
pub fn ndiffs(data: &[f64], max_d: usize) -> usize {
    let mut series = data.to_vec();
    let mut d = 0;
    while d < max_d && series.len() > 3 && !is_flat(&series) {
        match kpss_statistic(&series) {
            Some(stat) if stat >= KPSS_CRITICAL_5PCT => {
                debug!(d, stat, "KPSS rejects level stationarity");
                series = difference(&series);
                d += 1;
            }
            _ => break,
        }
    }
    d
}
