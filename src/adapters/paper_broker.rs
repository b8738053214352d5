//! In-memory paper trading broker.
//!
//! Market orders fill immediately at the last marked price for the symbol,
//! limit orders at their limit price. One long holding per symbol; selling
//! more than is held is rejected.

use std::collections::HashMap;

use tracing::info;

use crate::domain::error::ConfluenceError;
use crate::domain::order::{OrderAck, OrderRequest, OrderSide, OrderType};
use crate::ports::broker_port::{BrokerPort, BrokerPosition};

#[derive(Debug, Clone)]
pub struct PaperBroker {
    cash: f64,
    market_open: bool,
    prices: HashMap<String, f64>,
    positions: HashMap<String, BrokerPosition>,
    next_order_id: u64,
}

impl PaperBroker {
    pub fn new(cash: f64) -> Self {
        PaperBroker {
            cash,
            market_open: true,
            prices: HashMap::new(),
            positions: HashMap::new(),
            next_order_id: 1,
        }
    }

    /// Record the latest traded price for `symbol`.
    pub fn mark(&mut self, symbol: &str, price: f64) {
        self.prices.insert(symbol.to_uppercase(), price);
    }

    pub fn set_market_open(&mut self, open: bool) {
        self.market_open = open;
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    fn fill_price(&self, order: &OrderRequest) -> Result<f64, ConfluenceError> {
        match (order.order_type, order.limit_price) {
            (OrderType::Limit, Some(price)) => Ok(price),
            _ => self
                .prices
                .get(&order.symbol.to_uppercase())
                .copied()
                .ok_or_else(|| ConfluenceError::UpstreamUnavailable {
                    reason: format!("no price available for {}", order.symbol),
                }),
        }
    }
}

impl BrokerPort for PaperBroker {
    fn get_position(&self, symbol: &str) -> Result<Option<BrokerPosition>, ConfluenceError> {
        Ok(self.positions.get(&symbol.to_uppercase()).cloned())
    }

    fn buying_power(&self) -> Result<f64, ConfluenceError> {
        Ok(self.cash)
    }

    fn is_market_open(&self) -> Result<bool, ConfluenceError> {
        Ok(self.market_open)
    }

    fn place_order(&mut self, order: &OrderRequest) -> Result<OrderAck, ConfluenceError> {
        order.validate()?;
        let symbol = order.symbol.to_uppercase();
        let price = self.fill_price(order)?;
        let notional = order.qty as f64 * price;

        match order.side {
            OrderSide::Buy => {
                if notional > self.cash {
                    return Err(ConfluenceError::invalid_order(format!(
                        "insufficient buying power: need {notional:.2}, have {:.2}",
                        self.cash
                    )));
                }
                self.cash -= notional;
                let position = self
                    .positions
                    .entry(symbol.clone())
                    .or_insert_with(|| BrokerPosition {
                        symbol: symbol.clone(),
                        qty: 0,
                        avg_entry_price: 0.0,
                    });
                let total_qty = position.qty + order.qty;
                position.avg_entry_price = (position.avg_entry_price * position.qty as f64
                    + notional)
                    / total_qty as f64;
                position.qty = total_qty;
            }
            OrderSide::Sell => {
                let held = self.positions.get(&symbol).map_or(0, |p| p.qty);
                if order.qty > held {
                    return Err(ConfluenceError::invalid_order(format!(
                        "cannot sell {} {symbol}, holding {held}",
                        order.qty
                    )));
                }
                self.cash += notional;
                if order.qty == held {
                    self.positions.remove(&symbol);
                } else if let Some(position) = self.positions.get_mut(&symbol) {
                    position.qty -= order.qty;
                }
            }
        }

        let order_id = format!("paper-{}", self.next_order_id);
        self.next_order_id += 1;
        info!(%order_id, symbol = %symbol, side = %order.side, qty = order.qty, price, "order filled");

        Ok(OrderAck {
            order_id,
            symbol,
            qty: order.qty,
            side: order.side,
            fill_price: price,
        })
    }
}
