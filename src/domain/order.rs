//! Order requests sent to the broker.
//!
//! Requests are validated before they reach any [`BrokerPort`] so a malformed
//! order never leaves the process.
//!
//! [`BrokerPort`]: crate::ports::broker_port::BrokerPort

use std::fmt;
use std::str::FromStr;

use super::error::ConfluenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl FromStr for OrderSide {
    type Err = ConfluenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(ConfluenceError::invalid_order(format!(
                "unrecognized side '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub qty: u64,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub limit_price: Option<f64>,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, qty: u64, side: OrderSide) -> Self {
        OrderRequest {
            symbol: symbol.into(),
            qty,
            side,
            order_type: OrderType::Market,
            limit_price: None,
        }
    }

    pub fn limit(symbol: impl Into<String>, qty: u64, side: OrderSide, limit_price: f64) -> Self {
        OrderRequest {
            symbol: symbol.into(),
            qty,
            side,
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
        }
    }

    pub fn validate(&self) -> Result<(), ConfluenceError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfluenceError::invalid_order("symbol is empty"));
        }
        if self.qty < 1 {
            return Err(ConfluenceError::invalid_order(format!(
                "quantity must be at least 1 for {}",
                self.symbol
            )));
        }
        if self.order_type == OrderType::Limit {
            match self.limit_price {
                Some(price) if price.is_finite() && price > 0.0 => {}
                Some(price) => {
                    return Err(ConfluenceError::invalid_order(format!(
                        "limit price must be positive, got {price}"
                    )));
                }
                None => {
                    return Err(ConfluenceError::invalid_order(
                        "limit order requires a limit price",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Acknowledgement returned by the broker for an accepted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub order_id: String,
    pub symbol: String,
    pub qty: u64,
    pub side: OrderSide,
    pub fill_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("buy".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("SELL".parse::<OrderSide>().unwrap(), OrderSide::Sell);
    }

    #[test]
    fn unknown_side_is_invalid_order() {
        let err = "short".parse::<OrderSide>().unwrap_err();
        assert!(matches!(err, ConfluenceError::InvalidOrderRequest { .. }));
    }

    #[test]
    fn market_order_is_valid() {
        assert!(OrderRequest::market("AAPL", 5, OrderSide::Buy).validate().is_ok());
    }

    #[test]
    fn zero_quantity_rejected() {
        let err = OrderRequest::market("AAPL", 0, OrderSide::Buy)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfluenceError::InvalidOrderRequest { .. }));
    }

    #[test]
    fn empty_symbol_rejected() {
        assert!(OrderRequest::market("  ", 1, OrderSide::Sell).validate().is_err());
    }

    #[test]
    fn limit_without_price_rejected() {
        let mut order = OrderRequest::limit("AAPL", 1, OrderSide::Buy, 100.0);
        assert!(order.validate().is_ok());
        order.limit_price = None;
        let err = order.validate().unwrap_err();
        assert!(err.to_string().contains("limit price"));
    }

    #[test]
    fn limit_with_non_positive_price_rejected() {
        assert!(OrderRequest::limit("AAPL", 1, OrderSide::Buy, 0.0).validate().is_err());
        assert!(OrderRequest::limit("AAPL", 1, OrderSide::Buy, -3.0).validate().is_err());
    }
}
