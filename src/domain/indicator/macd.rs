//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All three EMAs are first-value seeded, so every position carries a value.
//! Default parameters: fast=12, slow=26, signal=9

use super::ema::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> Vec<MacdPoint> {
    if closes.is_empty() || fast == 0 || slow == 0 || signal_span == 0 {
        return Vec::new();
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = calculate_ema(&line, signal_span);

    line.into_iter()
        .zip(signal)
        .map(|(line, signal)| MacdPoint {
            line,
            signal,
            histogram: line - signal,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_starts_at_zero() {
        let points = calculate_macd(&rising(5), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        assert_eq!(points[0].line, 0.0);
        assert_eq!(points[0].signal, 0.0);
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let points = calculate_macd(&rising(40), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        for point in &points {
            assert!((point.histogram - (point.line - point.signal)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let points = calculate_macd(&closes, 3, 5, 2);
        let fast = calculate_ema(&closes, 3);
        let slow = calculate_ema(&closes, 5);

        for (i, point) in points.iter().enumerate() {
            assert!(
                (point.line - (fast[i] - slow[i])).abs() < f64::EPSILON,
                "MACD line mismatch at index {}",
                i
            );
        }
    }

    #[test]
    fn macd_signal_is_ema_of_line() {
        let closes = rising(30);
        let points = calculate_macd(&closes, 5, 10, 3);
        let lines: Vec<f64> = points.iter().map(|p| p.line).collect();
        let signal = calculate_ema(&lines, 3);
        for (point, expected) in points.iter().zip(signal) {
            assert!((point.signal - expected).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let points = calculate_macd(&rising(60), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        assert!(points.last().unwrap().line > 0.0);
    }

    #[test]
    fn macd_zero_period_and_empty() {
        let closes = [100.0, 101.0, 102.0];
        assert!(calculate_macd(&closes, 0, 26, 9).is_empty());
        assert!(calculate_macd(&closes, 12, 0, 9).is_empty());
        assert!(calculate_macd(&closes, 12, 26, 0).is_empty());
        assert!(calculate_macd(&[], 12, 26, 9).is_empty());
    }
}
