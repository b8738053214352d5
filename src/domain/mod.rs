//! Core domain types and logic.

pub mod ohlcv;
pub mod timeframe;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod ledger;
pub mod order;
pub mod backtest;
pub mod metrics;
pub mod live;
pub mod config_validation;
pub mod settings;
pub mod error;
