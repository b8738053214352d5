//! Performance statistics over a finished backtest.

use super::backtest::{BacktestResult, EquityPoint};
use super::position::Trade;

/// Aggregate figures. Percentages are whole numbers (12.5 = 12.5%).
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    /// Mean pnl of losing trades; negative or zero.
    pub avg_loss: f64,
    pub profit_factor: f64,
    /// Deepest peak-to-trough decline; zero or negative.
    pub max_drawdown: f64,
}

impl PerformanceReport {
    pub fn compute(result: &BacktestResult) -> Self {
        Self::from_parts(
            result.initial_capital,
            result.final_capital,
            &result.trades,
            &result.equity_curve,
        )
    }

    pub fn from_parts(
        initial_capital: f64,
        final_capital: f64,
        trades: &[Trade],
        equity_curve: &[EquityPoint],
    ) -> Self {
        let total_return = if initial_capital > 0.0 {
            (final_capital - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut breakeven_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;

        for trade in trades {
            if trade.pnl > 0.0 {
                winning_trades += 1;
                total_wins += trade.pnl;
            } else if trade.pnl < 0.0 {
                losing_trades += 1;
                total_losses += trade.pnl;
            } else {
                breakeven_trades += 1;
            }
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let avg_win = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };

        let avg_loss = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };

        // Ratio of averages, not of sums; zero when there are no losses.
        let profit_factor = if avg_loss != 0.0 {
            (avg_win / avg_loss).abs()
        } else {
            0.0
        };

        PerformanceReport {
            initial_capital,
            final_capital,
            total_return,
            total_trades,
            winning_trades,
            losing_trades,
            breakeven_trades,
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
            max_drawdown: max_drawdown(equity_curve),
        }
    }
}

/// Minimum of `(equity - running_peak) / running_peak × 100` over the curve.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut worst = 0.0_f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (point.equity - peak) / peak * 100.0;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst
}
