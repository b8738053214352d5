//! Weighted multi-indicator signal scoring.
//!
//! A decision is a pure function of two consecutive indicator rows
//! (previous, current). Each condition adds its weight to either the buy or
//! the sell score; at most one side per condition.
//!
//! | Condition                                   | Weight |
//! |---------------------------------------------|--------|
//! | RSI < 30 / RSI > 70                         | 2.0    |
//! | MACD crosses above / below its signal line  | 2.0    |
//! | close below lower / above upper band        | 1.5    |
//! | fast EMA crosses above / below slow EMA     | 2.0    |
//! | volume signal +1 / -1                       | 1.5    |
//! | close above / below slow EMA                | 1.0    |
//!
//! BUY when buy_score >= 5 and buy_score > sell_score, SELL symmetrically,
//! otherwise HOLD. Equal scores are always HOLD.

use std::fmt;

use tracing::{debug, info};

use crate::domain::error::ConfluenceError;
use crate::domain::indicator::{compute_indicators, IndicatorParams, IndicatorRow};
use crate::domain::ohlcv::Bar;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_WEIGHT: f64 = 2.0;
pub const MACD_CROSS_WEIGHT: f64 = 2.0;
pub const BAND_WEIGHT: f64 = 1.5;
pub const EMA_CROSS_WEIGHT: f64 = 2.0;
pub const VOLUME_WEIGHT: f64 = 1.5;
pub const TREND_WEIGHT: f64 = 1.0;
pub const DECISION_THRESHOLD: f64 = 5.0;

/// Rows needed to detect a crossover.
pub const MIN_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub signal: Signal,
    pub buy_score: f64,
    pub sell_score: f64,
    pub row: IndicatorRow,
}

/// The two most recent rows a decision is based on.
#[derive(Debug, Clone, Copy)]
pub struct RowWindow<'a> {
    pub previous: &'a IndicatorRow,
    pub current: &'a IndicatorRow,
}

impl<'a> RowWindow<'a> {
    /// The last two rows of `rows`, if there are at least two.
    pub fn latest(rows: &'a [IndicatorRow]) -> Option<Self> {
        match rows {
            [.., previous, current] => Some(RowWindow { previous, current }),
            _ => None,
        }
    }
}

struct Inputs {
    close: f64,
    rsi: f64,
    macd: f64,
    macd_signal: f64,
    prev_macd: f64,
    prev_macd_signal: f64,
    bb_upper: f64,
    bb_lower: f64,
    ema_fast: f64,
    ema_slow: f64,
    prev_ema_fast: f64,
    prev_ema_slow: f64,
    volume_signal: i8,
}

impl Inputs {
    fn extract(window: &RowWindow<'_>) -> Option<Self> {
        let cur = window.current;
        let prev = window.previous;
        let inputs = Inputs {
            close: cur.close,
            rsi: cur.rsi?,
            macd: cur.macd?,
            macd_signal: cur.macd_signal?,
            prev_macd: prev.macd?,
            prev_macd_signal: prev.macd_signal?,
            bb_upper: cur.bb_upper?,
            bb_lower: cur.bb_lower?,
            ema_fast: cur.ema_fast?,
            ema_slow: cur.ema_slow?,
            prev_ema_fast: prev.ema_fast?,
            prev_ema_slow: prev.ema_slow?,
            volume_signal: cur.volume_signal,
        };
        let values = [
            inputs.close,
            inputs.rsi,
            inputs.macd,
            inputs.macd_signal,
            inputs.prev_macd,
            inputs.prev_macd_signal,
            inputs.bb_upper,
            inputs.bb_lower,
            inputs.ema_fast,
            inputs.ema_slow,
            inputs.prev_ema_fast,
            inputs.prev_ema_slow,
        ];
        values.iter().all(|v| v.is_finite()).then_some(inputs)
    }
}

fn crosses_above(prev_left: f64, prev_right: f64, left: f64, right: f64) -> bool {
    left > right && prev_left <= prev_right
}

fn crosses_below(prev_left: f64, prev_right: f64, left: f64, right: f64) -> bool {
    left < right && prev_left >= prev_right
}

/// Score the latest two rows. Missing or non-finite inputs yield HOLD with
/// zero scores.
pub fn score(window: RowWindow<'_>) -> Evaluation {
    let Some(x) = Inputs::extract(&window) else {
        return Evaluation {
            signal: Signal::Hold,
            buy_score: 0.0,
            sell_score: 0.0,
            row: window.current.clone(),
        };
    };

    let mut buy_score = 0.0;
    let mut sell_score = 0.0;

    if x.rsi < RSI_OVERSOLD {
        buy_score += RSI_WEIGHT;
    } else if x.rsi > RSI_OVERBOUGHT {
        sell_score += RSI_WEIGHT;
    }

    if crosses_above(x.prev_macd, x.prev_macd_signal, x.macd, x.macd_signal) {
        buy_score += MACD_CROSS_WEIGHT;
    } else if crosses_below(x.prev_macd, x.prev_macd_signal, x.macd, x.macd_signal) {
        sell_score += MACD_CROSS_WEIGHT;
    }

    if x.close < x.bb_lower {
        buy_score += BAND_WEIGHT;
    } else if x.close > x.bb_upper {
        sell_score += BAND_WEIGHT;
    }

    if crosses_above(x.prev_ema_fast, x.prev_ema_slow, x.ema_fast, x.ema_slow) {
        buy_score += EMA_CROSS_WEIGHT;
    } else if crosses_below(x.prev_ema_fast, x.prev_ema_slow, x.ema_fast, x.ema_slow) {
        sell_score += EMA_CROSS_WEIGHT;
    }

    match x.volume_signal {
        1 => buy_score += VOLUME_WEIGHT,
        -1 => sell_score += VOLUME_WEIGHT,
        _ => {}
    }

    if x.close > x.ema_slow {
        buy_score += TREND_WEIGHT;
    } else if x.close < x.ema_slow {
        sell_score += TREND_WEIGHT;
    }

    let signal = if buy_score >= DECISION_THRESHOLD && buy_score > sell_score {
        Signal::Buy
    } else if sell_score >= DECISION_THRESHOLD && sell_score > buy_score {
        Signal::Sell
    } else {
        Signal::Hold
    };

    Evaluation {
        signal,
        buy_score,
        sell_score,
        row: window.current.clone(),
    }
}

/// Run the indicator pipeline over `bars` and score the final bar.
pub fn evaluate(
    symbol: &str,
    bars: &[Bar],
    params: &IndicatorParams,
) -> Result<Evaluation, ConfluenceError> {
    let rows = compute_indicators(bars, params);
    let window = RowWindow::latest(&rows).ok_or_else(|| ConfluenceError::InsufficientData {
        symbol: symbol.to_string(),
        bars: bars.len(),
        minimum: MIN_ROWS,
    })?;

    let evaluation = score(window);
    match evaluation.signal {
        Signal::Buy => info!(
            symbol,
            score = evaluation.buy_score,
            rsi = evaluation.row.rsi,
            macd = evaluation.row.macd,
            "BUY signal"
        ),
        Signal::Sell => info!(
            symbol,
            score = evaluation.sell_score,
            rsi = evaluation.row.rsi,
            macd = evaluation.row.macd,
            "SELL signal"
        ),
        Signal::Hold => debug!(
            symbol,
            buy = evaluation.buy_score,
            sell = evaluation.sell_score,
            "HOLD"
        ),
    }
    Ok(evaluation)
}
