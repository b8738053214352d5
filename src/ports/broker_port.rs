//! Broker gateway port trait.

use crate::domain::error::ConfluenceError;
use crate::domain::order::{OrderAck, OrderRequest};

/// A broker's view of one open holding.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerPosition {
    pub symbol: String,
    pub qty: u64,
    pub avg_entry_price: f64,
}

pub trait BrokerPort {
    fn get_position(&self, symbol: &str) -> Result<Option<BrokerPosition>, ConfluenceError>;

    fn buying_power(&self) -> Result<f64, ConfluenceError>;

    fn is_market_open(&self) -> Result<bool, ConfluenceError>;

    /// Submit an order. Implementations must call
    /// [`OrderRequest::validate`] before acting on it.
    fn place_order(&mut self, order: &OrderRequest) -> Result<OrderAck, ConfluenceError>;
}
