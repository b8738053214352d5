//! Trailing-window statistics shared by Bollinger, RSI and volume indicators.
//!
//! Both functions emit `None` for the first (period-1) positions, where the
//! window is not yet full.

pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let warmup = period.saturating_sub(1);
    (0..values.len())
        .map(|i| {
            if period == 0 || i < warmup {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            Some(window.iter().sum::<f64>() / period as f64)
        })
        .collect()
}

/// Population standard deviation (divides by N, not N-1).
pub fn rolling_stddev(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let warmup = period.saturating_sub(1);
    (0..values.len())
        .map(|i| {
            if period == 0 || i < warmup {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            Some(variance.sqrt())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn mean_warmup() {
        let means = rolling_mean(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_eq!(means[2], Some(20.0));
        assert_eq!(means[3], Some(30.0));
        assert_eq!(means[4], Some(40.0));
    }

    #[test]
    fn mean_zero_period_is_all_none() {
        let means = rolling_mean(&[1.0, 2.0], 0);
        assert!(means.iter().all(Option::is_none));
    }

    #[test]
    fn stddev_constant_values() {
        let sd = rolling_stddev(&[100.0; 5], 3);
        assert_eq!(sd[2], Some(0.0));
    }

    #[test]
    fn stddev_known_values() {
        let sd = rolling_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert_abs_diff_eq!(sd[7].unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn stddev_is_population_not_sample() {
        let sd = rolling_stddev(&[10.0, 20.0, 30.0], 3);
        let expected = (200.0_f64 / 3.0).sqrt();
        assert_abs_diff_eq!(sd[2].unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn window_longer_than_input() {
        assert!(rolling_stddev(&[1.0, 2.0], 5).iter().all(Option::is_none));
    }
}
