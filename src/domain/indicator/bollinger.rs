//! Bollinger Bands.
//!
//! - Middle: simple moving average over n closes
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation of the same window.
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are `None`.

use super::rolling::{rolling_mean, rolling_stddev};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(
    closes: &[f64],
    period: usize,
    multiplier: f64,
) -> Vec<Option<BollingerPoint>> {
    rolling_mean(closes, period)
        .into_iter()
        .zip(rolling_stddev(closes, period))
        .map(|(middle, stddev)| match (middle, stddev) {
            (Some(middle), Some(stddev)) => Some(BollingerPoint {
                upper: middle + stddev * multiplier,
                middle,
                lower: middle - stddev * multiplier,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_warmup() {
        let bands = calculate_bollinger(&[10.0, 20.0, 30.0, 40.0, 50.0], 3, 2.0);
        assert!(bands[0].is_none());
        assert!(bands[1].is_none());
        assert!(bands[2..].iter().all(Option::is_some));
    }

    #[test]
    fn bollinger_constant_values_collapse() {
        let bands = calculate_bollinger(&[100.0; 5], 3, 2.0);
        let point = bands[2].unwrap();
        assert!((point.middle - 100.0).abs() < f64::EPSILON);
        assert!((point.upper - 100.0).abs() < f64::EPSILON);
        assert!((point.lower - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let point = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0)[2].unwrap();
        let middle: f64 = 20.0;
        let stddev = (((10.0_f64 - middle).powi(2) + (30.0_f64 - middle).powi(2)) / 3.0).sqrt();

        assert!((point.middle - middle).abs() < 1e-10);
        assert!((point.upper - (middle + 2.0 * stddev)).abs() < 1e-10);
        assert!((point.lower - (middle - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let wide = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0)[2].unwrap();
        let narrow = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 1.0)[2].unwrap();
        let wide_half = wide.upper - wide.middle;
        let narrow_half = narrow.upper - narrow.middle;
        assert!((wide_half - 2.0 * narrow_half).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let point = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0)[2].unwrap();
        assert!(((point.upper - point.middle) - (point.middle - point.lower)).abs() < 1e-10);
    }
}
