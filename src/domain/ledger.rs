//! Single-symbol position ledger.
//!
//! Two states, `Flat` and `Long`. The ledger owns the cash balance, the open
//! position (if any) and the list of closed trades for one symbol.
//!
//! ```text
//! FLAT --BUY, shares >= 1--> LONG
//! LONG --SELL | stop-loss | take-profit | end of window--> FLAT
//! ```
//!
//! While long, exits are checked in a fixed order: sell signal, stop-loss,
//! take-profit. A BUY while long and any exit while flat are no-ops.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use super::position::{stop_loss_hit, take_profit_hit, ExitReason, Position, Trade};
use super::signal::Signal;

/// Sizing and exit thresholds. Percentages are whole numbers (2.0 = 2%).
#[derive(Debug, Clone, PartialEq)]
pub struct RiskParams {
    /// Fraction of available capital committed per entry, in (0, 1].
    pub position_size: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        RiskParams {
            position_size: 0.1,
            stop_loss_pct: 2.0,
            take_profit_pct: 4.0,
        }
    }
}

impl RiskParams {
    /// Whole shares affordable with `capital × position_size` at `price`.
    pub fn shares_for(&self, capital: f64, price: f64) -> u64 {
        if price.is_nan() || price <= 0.0 || !capital.is_finite() {
            return 0;
        }
        let shares = (capital * self.position_size / price).floor();
        if shares >= 1.0 { shares as u64 } else { 0 }
    }
}

/// What the rules say to do given the current position and signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Open,
    Close(ExitReason),
    Hold,
}

/// Pure transition rule shared by the backtest ledger and the live driver.
///
/// `entry_price` is the open position's entry price, `None` when flat.
pub fn decide(entry_price: Option<f64>, signal: Signal, price: f64, risk: &RiskParams) -> Action {
    match entry_price {
        None if signal == Signal::Buy => Action::Open,
        None => Action::Hold,
        Some(_) if signal == Signal::Sell => Action::Close(ExitReason::SellSignal),
        Some(entry) if stop_loss_hit(entry, price, risk.stop_loss_pct) => {
            Action::Close(ExitReason::StopLoss)
        }
        Some(entry) if take_profit_hit(entry, price, risk.take_profit_pct) => {
            Action::Close(ExitReason::TakeProfit)
        }
        Some(_) => Action::Hold,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    Flat,
    Long,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Opened { shares: u64, cost: f64 },
    Closed(Trade),
    NoOp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    symbol: String,
    cash: f64,
    position: Option<Position>,
    trades: Vec<Trade>,
    risk: RiskParams,
}

impl Ledger {
    pub fn new(symbol: impl Into<String>, initial_cash: f64, risk: RiskParams) -> Self {
        Ledger {
            symbol: symbol.into(),
            cash: initial_cash,
            position: None,
            trades: Vec::new(),
            risk,
        }
    }

    pub fn state(&self) -> LedgerState {
        if self.position.is_some() {
            LedgerState::Long
        } else {
            LedgerState::Flat
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Cash plus the open position marked at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position.as_ref().map_or(0.0, |p| p.market_value(price))
    }

    /// Advance the state machine for one bar.
    pub fn apply(&mut self, signal: Signal, time: NaiveDateTime, price: f64) -> Transition {
        let entry = self.position.as_ref().map(|p| p.entry_price);
        match decide(entry, signal, price, &self.risk) {
            Action::Open => self.open(time, price),
            Action::Close(reason) => self.close(time, price, reason),
            Action::Hold => Transition::NoOp,
        }
    }

    /// Force-close any open position at the end of a replay.
    pub fn close_at_end(&mut self, time: NaiveDateTime, price: f64) -> Option<Trade> {
        match self.close(time, price, ExitReason::EndOfWindow) {
            Transition::Closed(trade) => Some(trade),
            _ => None,
        }
    }

    /// Consume the ledger, returning final cash and the trade list.
    pub fn into_parts(self) -> (f64, Vec<Trade>) {
        (self.cash, self.trades)
    }

    fn open(&mut self, time: NaiveDateTime, price: f64) -> Transition {
        let shares = self.risk.shares_for(self.cash, price);
        if shares == 0 {
            warn!(symbol = %self.symbol, cash = self.cash, price, "insufficient capital for entry");
            return Transition::NoOp;
        }
        let cost = shares as f64 * price;
        self.cash -= cost;
        self.position = Some(Position {
            entry_price: price,
            shares,
            entry_time: time,
        });
        info!(symbol = %self.symbol, shares, price, %time, "BUY");
        Transition::Opened { shares, cost }
    }

    fn close(&mut self, time: NaiveDateTime, price: f64, reason: ExitReason) -> Transition {
        let Some(position) = self.position.take() else {
            return Transition::NoOp;
        };
        self.cash += position.market_value(price);
        let trade = position.close(price, time, reason);
        if reason == ExitReason::StopLoss {
            warn!(symbol = %self.symbol, price, pnl = trade.pnl, "stop-loss triggered");
        }
        info!(
            symbol = %self.symbol,
            shares = trade.shares,
            price,
            pnl = trade.pnl,
            pnl_pct = trade.pnl_pct,
            reason = %reason,
            "SELL"
        );
        self.trades.push(trade.clone());
        Transition::Closed(trade)
    }
}
