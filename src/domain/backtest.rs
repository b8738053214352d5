//! Bar-by-bar historical replay of the signal strategy for one symbol.
//!
//! For every bar from index [`WARMUP_BARS`] onward the scorer sees only the
//! trailing window ending at that bar, the ledger applies the decision at the
//! bar's close, and an equity snapshot is recorded. A position still open
//! after the last bar is closed at the final close.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::error::ConfluenceError;
use super::indicator::IndicatorParams;
use super::ledger::{Ledger, LedgerState, RiskParams, Transition};
use super::ohlcv::Bar;
use super::position::Trade;
use super::signal::{evaluate, Signal};

/// Bars in the trailing decision window, and the minimum series length.
pub const WARMUP_BARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub risk: RiskParams,
    pub indicators: IndicatorParams,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000.0,
            risk: RiskParams::default(),
            indicators: IndicatorParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub symbol: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

/// One simulated bar, passed to an observer for inspection.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub index: usize,
    pub bar: &'a Bar,
    pub signal: Signal,
    pub state: LedgerState,
}

pub fn run_backtest(
    symbol: &str,
    bars: &[Bar],
    config: &BacktestConfig,
) -> Result<BacktestResult, ConfluenceError> {
    run_backtest_observed(symbol, bars, config, |_| {})
}

/// Same as [`run_backtest`], calling `observe` after each bar's transition.
pub fn run_backtest_observed<F>(
    symbol: &str,
    bars: &[Bar],
    config: &BacktestConfig,
    mut observe: F,
) -> Result<BacktestResult, ConfluenceError>
where
    F: FnMut(Step<'_>),
{
    if bars.len() < WARMUP_BARS {
        return Err(ConfluenceError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum: WARMUP_BARS,
        });
    }

    info!(
        symbol,
        bars = bars.len(),
        initial_capital = config.initial_capital,
        "starting backtest"
    );

    let mut ledger = Ledger::new(symbol, config.initial_capital, config.risk.clone());
    let mut equity_curve = Vec::with_capacity(bars.len() - WARMUP_BARS);

    for (index, bar) in bars.iter().enumerate().skip(WARMUP_BARS) {
        let window = &bars[index + 1 - WARMUP_BARS..=index];
        let signal = match evaluate(symbol, window, &config.indicators) {
            Ok(evaluation) => evaluation.signal,
            Err(e) => {
                debug!(symbol, index, error = %e, "scoring failed, holding");
                Signal::Hold
            }
        };

        if let Transition::Closed(trade) = ledger.apply(signal, bar.timestamp, bar.close) {
            debug!(symbol, index, reason = %trade.exit_reason, "position closed");
        }

        equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity: ledger.equity(bar.close),
        });

        observe(Step {
            index,
            bar,
            signal,
            state: ledger.state(),
        });
    }

    if let Some(last) = bars.last() {
        ledger.close_at_end(last.timestamp, last.close);
    }

    let (final_capital, trades) = ledger.into_parts();
    info!(
        symbol,
        trades = trades.len(),
        final_capital,
        "backtest complete"
    );

    Ok(BacktestResult {
        symbol: symbol.to_string(),
        initial_capital: config.initial_capital,
        final_capital,
        trades,
        equity_curve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flat_bars(count: usize) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        (0..count)
            .map(|i| Bar {
                timestamp: start + chrono::Duration::minutes(5 * i as i64),
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = run_backtest("AAPL", &flat_bars(50), &BacktestConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfluenceError::InsufficientData {
                bars: 50,
                minimum: 100,
                ..
            }
        ));
    }

    #[test]
    fn exactly_warmup_bars_has_no_snapshots() {
        let result = run_backtest("AAPL", &flat_bars(100), &BacktestConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.equity_curve.is_empty());
        assert_eq!(result.final_capital, 10_000.0);
    }

    #[test]
    fn flat_series_never_trades() {
        let bars = flat_bars(150);
        let mut signals = Vec::new();
        let result = run_backtest_observed("AAPL", &bars, &BacktestConfig::default(), |step| {
            signals.push(step.signal)
        })
        .unwrap();
        assert_eq!(signals.len(), 50);
        assert!(signals.iter().all(|s| *s == Signal::Hold));
        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve.len(), 50);
        assert!(result.equity_curve.iter().all(|p| p.equity == 10_000.0));
        assert_eq!(result.equity_curve[0].timestamp, bars[100].timestamp);
    }
}
