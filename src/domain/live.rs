//! Live trading driver.
//!
//! One tick per symbol: fetch recent bars, score them, and reconcile the
//! decision with the broker's position. Scheduling and retry policy belong to
//! the caller.

use tracing::{error, info, warn};

use super::error::ConfluenceError;
use super::indicator::IndicatorParams;
use super::ledger::{decide, Action, RiskParams};
use super::order::{OrderAck, OrderRequest, OrderSide};
use super::position::ExitReason;
use super::signal::{evaluate, Signal};
use super::timeframe::Timeframe;
use crate::ports::broker_port::BrokerPort;
use crate::ports::data_port::DataPort;

/// Bars requested from the data source each tick.
pub const TICK_BARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Data source unavailable or empty; nothing was touched.
    NoData,
    /// No order was needed.
    Hold(Signal),
    /// BUY while flat, but the sized order was under one share.
    InsufficientCapital { price: f64, buying_power: f64 },
    Entered(OrderAck),
    Exited { ack: OrderAck, reason: ExitReason },
}

#[derive(Debug)]
pub enum CycleOutcome {
    MarketClosed,
    Completed(Vec<(String, Result<TickOutcome, ConfluenceError>)>),
}

pub struct LiveTrader<D, B> {
    data: D,
    broker: B,
    timeframe: Timeframe,
    risk: RiskParams,
    indicators: IndicatorParams,
}

impl<D: DataPort, B: BrokerPort> LiveTrader<D, B> {
    pub fn new(
        data: D,
        broker: B,
        timeframe: Timeframe,
        risk: RiskParams,
        indicators: IndicatorParams,
    ) -> Self {
        LiveTrader {
            data,
            broker,
            timeframe,
            risk,
            indicators,
        }
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn tick(&mut self, symbol: &str) -> Result<TickOutcome, ConfluenceError> {
        let bars = match self.data.get_bars(symbol, self.timeframe, TICK_BARS) {
            Ok(bars) if !bars.is_empty() => bars,
            Ok(_) => {
                warn!(symbol, "no bars returned, skipping tick");
                return Ok(TickOutcome::NoData);
            }
            Err(ConfluenceError::UpstreamUnavailable { reason }) => {
                error!(symbol, %reason, "bar source unavailable, skipping tick");
                return Ok(TickOutcome::NoData);
            }
            Err(e) => return Err(e),
        };

        let position = match self.broker.get_position(symbol) {
            Ok(position) => position,
            Err(ConfluenceError::UpstreamUnavailable { reason }) => {
                error!(symbol, %reason, "position lookup failed, skipping tick");
                return Ok(TickOutcome::NoData);
            }
            Err(e) => return Err(e),
        };

        let signal = match evaluate(symbol, &bars, &self.indicators) {
            Ok(evaluation) => evaluation.signal,
            Err(ConfluenceError::InsufficientData { bars, minimum, .. }) => {
                warn!(symbol, bars, minimum, "not enough bars to score, holding");
                Signal::Hold
            }
            Err(e) => return Err(e),
        };

        // Non-empty checked above.
        let price = bars.last().map_or(0.0, |b| b.close);
        let entry = position.as_ref().map(|p| p.avg_entry_price);

        match (decide(entry, signal, price, &self.risk), position) {
            (Action::Open, _) => {
                let buying_power = match self.broker.buying_power() {
                    Ok(value) => value,
                    Err(ConfluenceError::UpstreamUnavailable { reason }) => {
                        error!(symbol, %reason, "buying power lookup failed, skipping tick");
                        return Ok(TickOutcome::NoData);
                    }
                    Err(e) => return Err(e),
                };
                let qty = self.risk.shares_for(buying_power, price);
                if qty == 0 {
                    warn!(symbol, buying_power, price, "insufficient buying power for entry");
                    return Ok(TickOutcome::InsufficientCapital {
                        price,
                        buying_power,
                    });
                }
                let ack = self
                    .broker
                    .place_order(&OrderRequest::market(symbol, qty, OrderSide::Buy))?;
                info!(symbol, qty, price, order_id = %ack.order_id, "entered position");
                Ok(TickOutcome::Entered(ack))
            }
            (Action::Close(reason), Some(held)) => {
                if reason == ExitReason::StopLoss {
                    warn!(symbol, price, entry = held.avg_entry_price, "stop-loss triggered");
                } else if reason == ExitReason::TakeProfit {
                    info!(symbol, price, entry = held.avg_entry_price, "take-profit triggered");
                }
                let ack = self
                    .broker
                    .place_order(&OrderRequest::market(symbol, held.qty, OrderSide::Sell))?;
                info!(symbol, qty = held.qty, price, %reason, order_id = %ack.order_id, "exited position");
                Ok(TickOutcome::Exited { ack, reason })
            }
            _ => Ok(TickOutcome::Hold(signal)),
        }
    }

    /// Tick every symbol once, unless the market is closed or the clock
    /// cannot be read. A failing symbol does not stop the rest.
    pub fn run_cycle(&mut self, symbols: &[String]) -> Result<CycleOutcome, ConfluenceError> {
        match self.broker.is_market_open() {
            Ok(true) => {}
            Ok(false) => {
                info!("market closed, skipping cycle");
                return Ok(CycleOutcome::MarketClosed);
            }
            Err(ConfluenceError::UpstreamUnavailable { reason }) => {
                error!(%reason, "market clock unavailable, treating market as closed");
                return Ok(CycleOutcome::MarketClosed);
            }
            Err(e) => return Err(e),
        }

        let outcomes = symbols
            .iter()
            .map(|symbol| {
                let outcome = self.tick(symbol);
                if let Err(e) = &outcome {
                    error!(symbol = %symbol, error = %e, "tick failed");
                }
                (symbol.clone(), outcome)
            })
            .collect();
        Ok(CycleOutcome::Completed(outcomes))
    }
}
