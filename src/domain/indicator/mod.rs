//! Technical indicator pipeline.
//!
//! [`compute_indicators`] is a pure function from a bar window to one
//! [`IndicatorRow`] per bar. Each row depends only on bars at or before its own
//! timestamp. Columns whose lookback is not yet satisfied are `None`; the
//! scorer treats any `None` it needs as "no decision".

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod volume;

pub use bollinger::{calculate_bollinger, BollingerPoint};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdPoint};
pub use rsi::calculate_rsi;
pub use volume::{calculate_volume_signal, VolumePoint};

use chrono::NaiveDateTime;

use crate::domain::ohlcv::{closes, volumes, Bar};

/// Lookback parameters for every indicator in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std: f64,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub volume_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bb_period: bollinger::DEFAULT_PERIOD,
            bb_std: bollinger::DEFAULT_MULTIPLIER,
            ema_fast: 9,
            ema_slow: 21,
            volume_period: volume::DEFAULT_PERIOD,
        }
    }
}

impl IndicatorParams {
    /// Number of bars needed before every column of a row is defined.
    pub fn lookback(&self) -> usize {
        [
            self.rsi_period,
            self.macd_fast,
            self.macd_slow + self.macd_signal.saturating_sub(1),
            self.bb_period,
            self.ema_fast,
            self.ema_slow,
            self.volume_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub volume_ma: Option<f64>,
    /// -1, 0 or 1.
    pub volume_signal: i8,
}

impl IndicatorRow {
    pub fn is_complete(&self) -> bool {
        [
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.bb_upper,
            self.bb_middle,
            self.bb_lower,
            self.ema_fast,
            self.ema_slow,
            self.volume_ma,
        ]
        .iter()
        .all(|v| v.is_some_and(f64::is_finite))
    }
}

/// Values from a first-value-seeded EMA exist from bar 0 but are only
/// reported once `span` bars have been seen.
fn masked(values: &[f64], first_valid: usize) -> impl Iterator<Item = Option<f64>> + '_ {
    values
        .iter()
        .enumerate()
        .map(move |(i, &v)| (i >= first_valid).then_some(v))
}

pub fn compute_indicators(bars: &[Bar], params: &IndicatorParams) -> Vec<IndicatorRow> {
    let close = closes(bars);
    let volume = volumes(bars);

    let rsi = calculate_rsi(&close, params.rsi_period);
    let macd = calculate_macd(&close, params.macd_fast, params.macd_slow, params.macd_signal);
    let bands = calculate_bollinger(&close, params.bb_period, params.bb_std);
    let ema_fast: Vec<Option<f64>> =
        masked(&calculate_ema(&close, params.ema_fast), params.ema_fast.saturating_sub(1)).collect();
    let ema_slow: Vec<Option<f64>> =
        masked(&calculate_ema(&close, params.ema_slow), params.ema_slow.saturating_sub(1)).collect();
    let volume_points = calculate_volume_signal(&close, &volume, params.volume_period);

    let macd_first = params.macd_slow.max(params.macd_fast).saturating_sub(1);
    let signal_first = macd_first + params.macd_signal.saturating_sub(1);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let macd_point = macd.get(i);
            let band = bands[i];
            IndicatorRow {
                timestamp: bar.timestamp,
                close: bar.close,
                rsi: rsi[i],
                macd: macd_point.filter(|_| i >= macd_first).map(|p| p.line),
                macd_signal: macd_point.filter(|_| i >= signal_first).map(|p| p.signal),
                macd_hist: macd_point.filter(|_| i >= signal_first).map(|p| p.histogram),
                bb_upper: band.map(|b| b.upper),
                bb_middle: band.map(|b| b.middle),
                bb_lower: band.map(|b| b.lower),
                ema_fast: ema_fast.get(i).copied().flatten(),
                ema_slow: ema_slow.get(i).copied().flatten(),
                volume_ma: volume_points[i].volume_ma,
                volume_signal: volume_points[i].signal,
            }
        })
        .collect()
}
