//! Differencing and its inverse.

/// First difference `x[t] - x[t-1]`; one element shorter than the input.
pub fn difference(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Undoes `d` rounds of differencing for values appended after the sample.
///
/// `tails[k]` is the last observed value of the series differenced `k` times.
#[derive(Clone, Debug)]
pub(crate) struct Integrator {
    tails: Vec<f64>,
}

impl Integrator {
    /// Differences `data` `d` times, returning the result and the integrator
    /// that maps future differenced values back to levels.
    pub(crate) fn new(data: &[f64], d: usize) -> (Vec<f64>, Self) {
        let mut tails = Vec::with_capacity(d);
        let mut series = data.to_vec();
        for _ in 0..d {
            if let Some(&last) = series.last() {
                tails.push(last);
            }
            series = difference(&series);
        }
        (series, Self { tails })
    }

    /// Integrates the next differenced value into a level.
    pub(crate) fn integrate(&mut self, w: f64) -> f64 {
        let mut x = w;
        for tail in self.tails.iter_mut().rev() {
            x += *tail;
            *tail = x;
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_difference() {
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0]), vec![3.0, 5.0, 7.0]);
        assert!(difference(&[1.0]).is_empty());
    }

    #[test]
    fn zero_order_is_identity() {
        let (w, mut integ) = Integrator::new(&[1.0, 2.0], 0);
        assert_eq!(w, vec![1.0, 2.0]);
        assert_eq!(integ.integrate(7.0), 7.0);
    }

    #[test]
    fn integrates_quadratic() {
        // squares: second difference is 2
        let data = [1.0, 4.0, 9.0, 16.0, 25.0];
        let (w, mut integ) = Integrator::new(&data, 2);
        assert_eq!(w, vec![2.0, 2.0, 2.0]);
        assert_eq!(integ.integrate(2.0), 36.0);
        assert_eq!(integ.integrate(2.0), 49.0);
    }

    #[test]
    fn integrates_random_walk() {
        let (_, mut integ) = Integrator::new(&[5.0, 6.0, 8.0], 1);
        assert_eq!(integ.integrate(1.0), 9.0);
        assert_eq!(integ.integrate(-4.0), 5.0);
    }
}
