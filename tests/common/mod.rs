#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use confluence::domain::error::ConfluenceError;
pub use confluence::domain::ohlcv::Bar;
use confluence::domain::order::{OrderAck, OrderRequest, OrderSide};
use confluence::domain::timeframe::Timeframe;
use confluence::ports::broker_port::{BrokerPort, BrokerPosition};
use confluence::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn lookup(&self, symbol: &str) -> Result<Vec<Bar>, ConfluenceError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ConfluenceError::UpstreamUnavailable {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

impl DataPort for MockDataPort {
    fn get_bars(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, ConfluenceError> {
        let mut bars = self.lookup(symbol)?;
        let skip = bars.len().saturating_sub(limit);
        Ok(bars.split_off(skip))
    }

    fn fetch_range(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, ConfluenceError> {
        Ok(self
            .lookup(symbol)?
            .into_iter()
            .filter(|b| {
                let d = b.timestamp.date();
                start.is_none_or(|s| d >= s) && end.is_none_or(|e| d <= e)
            })
            .collect())
    }
}

/// Broker double that records every order it accepts.
pub struct MockBroker {
    pub positions: HashMap<String, BrokerPosition>,
    pub buying_power: f64,
    pub market_open: bool,
    pub reject_orders: Option<String>,
    pub account_error: Option<String>,
    pub clock_error: Option<String>,
    pub orders: Vec<OrderRequest>,
    pub fill_price: f64,
}

impl MockBroker {
    pub fn new(buying_power: f64) -> Self {
        Self {
            positions: HashMap::new(),
            buying_power,
            market_open: true,
            reject_orders: None,
            account_error: None,
            clock_error: None,
            orders: Vec::new(),
            fill_price: 100.0,
        }
    }

    pub fn with_position(mut self, symbol: &str, qty: u64, avg_entry_price: f64) -> Self {
        self.positions.insert(
            symbol.to_string(),
            BrokerPosition {
                symbol: symbol.to_string(),
                qty,
                avg_entry_price,
            },
        );
        self
    }

    pub fn closed(mut self) -> Self {
        self.market_open = false;
        self
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject_orders = Some(reason.to_string());
        self
    }

    /// Account and clock endpoints both fail with `reason`.
    pub fn unreachable(mut self, reason: &str) -> Self {
        self.account_error = Some(reason.to_string());
        self.clock_error = Some(reason.to_string());
        self
    }
}

impl BrokerPort for MockBroker {
    fn get_position(&self, symbol: &str) -> Result<Option<BrokerPosition>, ConfluenceError> {
        Ok(self.positions.get(symbol).cloned())
    }

    fn buying_power(&self) -> Result<f64, ConfluenceError> {
        match &self.account_error {
            Some(reason) => Err(ConfluenceError::UpstreamUnavailable {
                reason: reason.clone(),
            }),
            None => Ok(self.buying_power),
        }
    }

    fn is_market_open(&self) -> Result<bool, ConfluenceError> {
        match &self.clock_error {
            Some(reason) => Err(ConfluenceError::UpstreamUnavailable {
                reason: reason.clone(),
            }),
            None => Ok(self.market_open),
        }
    }

    fn place_order(&mut self, order: &OrderRequest) -> Result<OrderAck, ConfluenceError> {
        order.validate()?;
        if let Some(reason) = &self.reject_orders {
            return Err(ConfluenceError::UpstreamUnavailable {
                reason: reason.clone(),
            });
        }
        self.orders.push(order.clone());
        match order.side {
            OrderSide::Buy => {
                self.positions.insert(
                    order.symbol.clone(),
                    BrokerPosition {
                        symbol: order.symbol.clone(),
                        qty: order.qty,
                        avg_entry_price: self.fill_price,
                    },
                );
            }
            OrderSide::Sell => {
                self.positions.remove(&order.symbol);
            }
        }
        Ok(OrderAck {
            order_id: format!("mock-{}", self.orders.len()),
            symbol: order.symbol.clone(),
            qty: order.qty,
            side: order.side,
            fill_price: self.fill_price,
        })
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// Five-minute bars with open = high = low = close.
pub fn make_bars(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Bar {
            timestamp: start_time() + chrono::Duration::minutes(5 * i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        })
        .collect()
}

pub fn flat_bars(count: usize, price: f64) -> Vec<Bar> {
    make_bars(&vec![price; count], &vec![1000.0; count])
}

/// 101 bars falling one point per bar from 200 to 100, then a rebound to 103
/// on triple volume. Scores BUY (5.5 vs 1.0) on the final bar.
pub fn v_shape_bars() -> Vec<Bar> {
    v_shape_then(&[])
}

/// The V-shape followed by extra closes at ordinary volume.
pub fn v_shape_then(extra: &[f64]) -> Vec<Bar> {
    let mut closes: Vec<f64> = (0..=100).map(|k| 200.0 - k as f64).collect();
    let mut volumes = vec![1000.0; 101];
    closes.push(103.0);
    volumes.push(3000.0);
    closes.extend_from_slice(extra);
    volumes.extend(std::iter::repeat_n(1000.0, extra.len()));
    make_bars(&closes, &volumes)
}

pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
