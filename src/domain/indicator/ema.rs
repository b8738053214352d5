//! Exponential Moving Average.
//!
//! k = 2/(span+1), seeded with the first raw value (no SMA warm-up seed),
//! then EMA[i] = x[i]*k + EMA[i-1]*(1-k). Every position carries a value;
//! masking of the unreliable head is left to the pipeline.

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return Vec::new();
    }

    let k = smoothing_factor(span);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;

    for (i, &x) in values.iter().enumerate() {
        ema = if i == 0 { x } else { x * k + ema * (1.0 - k) };
        out.push(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seed_is_first_value() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0], 3);
        assert!((ema[0] - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0, 40.0], 3);
        let k = 0.5;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);
        assert!((ema[1] - e1).abs() < f64::EPSILON);
        assert!((ema[2] - e2).abs() < f64::EPSILON);
        assert!((ema[3] - e3).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_span_1_tracks_input() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(ema, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ema_equal_prices() {
        let ema = calculate_ema(&[100.0; 6], 4);
        assert!(ema.iter().all(|v| (v - 100.0).abs() < f64::EPSILON));
    }

    #[test]
    fn ema_empty_and_zero_span() {
        assert!(calculate_ema(&[], 3).is_empty());
        assert!(calculate_ema(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn ema_recompute_over_prefix_is_stable() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let full = calculate_ema(&prices, 9);
        let prefix = calculate_ema(&prices[..25], 9);
        assert_eq!(full[24], prefix[24]);
        assert_eq!(prefix, calculate_ema(&prices[..25], 9));
    }

    #[test]
    fn ema_smoothing_factor() {
        assert!((smoothing_factor(10) - 2.0 / 11.0).abs() < f64::EPSILON);
    }
}
