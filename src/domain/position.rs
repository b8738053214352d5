//! Open positions and closed round-trip trades.

use std::fmt;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_price: f64,
    /// Always at least 1.
    pub shares: u64,
    pub entry_time: NaiveDateTime,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares as f64 * (price - self.entry_price)
    }

    /// Percentage move from entry to `price`.
    pub fn pnl_pct(&self, price: f64) -> f64 {
        change_pct(self.entry_price, price)
    }

    /// Close at `price`, producing the round-trip record.
    pub fn close(self, price: f64, time: NaiveDateTime, reason: ExitReason) -> Trade {
        Trade {
            entry_time: self.entry_time,
            exit_time: time,
            entry_price: self.entry_price,
            exit_price: price,
            shares: self.shares,
            pnl: self.unrealized_pnl(price),
            pnl_pct: self.pnl_pct(price),
            exit_reason: reason,
        }
    }
}

/// Percentage move from `entry` to `price` (2.0 = 2%).
pub fn change_pct(entry: f64, price: f64) -> f64 {
    (price - entry) / entry * 100.0
}

pub fn stop_loss_hit(entry: f64, price: f64, stop_loss_pct: f64) -> bool {
    change_pct(entry, price) <= -stop_loss_pct
}

pub fn take_profit_hit(entry: f64, price: f64, take_profit_pct: f64) -> bool {
    change_pct(entry, price) >= take_profit_pct
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    SellSignal,
    StopLoss,
    TakeProfit,
    EndOfWindow,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::SellSignal => "SELL_SIGNAL",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::EndOfWindow => "END_OF_WINDOW",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: u64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_position() -> Position {
        Position {
            entry_price: 100.0,
            shares: 10,
            entry_time: at(10),
        }
    }

    #[test]
    fn market_value() {
        let pos = sample_position();
        assert!((pos.market_value(55.0) - 550.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_profit_and_loss() {
        let pos = sample_position();
        assert!((pos.unrealized_pnl(105.0) - 50.0).abs() < 1e-10);
        assert!((pos.unrealized_pnl(95.0) + 50.0).abs() < 1e-10);
    }

    #[test]
    fn stop_loss_triggers_at_threshold() {
        assert!(!stop_loss_hit(100.0, 98.5, 2.0));
        assert!(stop_loss_hit(100.0, 98.0, 2.0));
        assert!(stop_loss_hit(100.0, 97.9, 2.0));
    }

    #[test]
    fn take_profit_triggers_at_threshold() {
        assert!(!take_profit_hit(100.0, 103.9, 4.0));
        assert!(take_profit_hit(100.0, 104.0, 4.0));
    }

    #[test]
    fn position_pnl_pct_matches_change_pct() {
        let pos = sample_position();
        assert_eq!(pos.pnl_pct(97.9), change_pct(100.0, 97.9));
    }

    #[test]
    fn close_produces_trade() {
        let trade = sample_position().close(110.0, at(14), ExitReason::TakeProfit);
        assert_eq!(trade.shares, 10);
        assert_eq!(trade.entry_time, at(10));
        assert_eq!(trade.exit_time, at(14));
        assert!((trade.pnl - 100.0).abs() < 1e-10);
        assert!((trade.pnl_pct - 10.0).abs() < 1e-10);
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    }

    #[test]
    fn exit_reason_display() {
        assert_eq!(ExitReason::SellSignal.to_string(), "SELL_SIGNAL");
        assert_eq!(ExitReason::EndOfWindow.to_string(), "END_OF_WINDOW");
    }
}
