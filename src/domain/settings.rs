//! Typed run settings resolved from a [`ConfigPort`].
//!
//! Every builder validates its section first, so the values returned here are
//! always in range.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::backtest::BacktestConfig;
use crate::domain::config_validation::{
    parse_date, parse_symbols, read_indicator_params, validate_backtest_config, validate_broker_config,
    validate_config, validate_indicator_config, validate_risk_config,
};
use crate::domain::error::ConfluenceError;
use crate::domain::indicator::IndicatorParams;
use crate::domain::ledger::RiskParams;
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SYMBOLS: &str = "AAPL,TSLA,MSFT,GOOGL,AMZN";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PAPER_CASH: f64 = 100_000.0;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BrokerSettings {
    pub symbols: Vec<String>,
    pub timeframe: Timeframe,
    pub data_dir: PathBuf,
    pub paper_cash: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub symbol: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub config: BacktestConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub risk: RiskParams,
    pub indicators: IndicatorParams,
    pub backtest: BacktestSettings,
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ConfluenceError> {
        validate_config(config)?;
        let broker = build_broker_settings(config)?;
        Ok(Settings {
            risk: build_risk_params(config)?,
            indicators: build_indicator_params(config)?,
            backtest: build_backtest_settings(config, &broker)?,
            broker,
        })
    }
}

pub fn build_broker_settings(config: &dyn ConfigPort) -> Result<BrokerSettings, ConfluenceError> {
    validate_broker_config(config)?;
    let timeframe = config
        .get_string("broker", "timeframe")
        .map(|s| Timeframe::parse_or_default(&s))
        .unwrap_or_default();
    let data_dir = config
        .get_string("broker", "data_dir")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    Ok(BrokerSettings {
        symbols: parse_symbols(config, DEFAULT_SYMBOLS),
        timeframe,
        data_dir: PathBuf::from(data_dir.trim()),
        paper_cash: config.get_double("broker", "paper_cash", DEFAULT_PAPER_CASH),
    })
}

pub fn build_risk_params(config: &dyn ConfigPort) -> Result<RiskParams, ConfluenceError> {
    validate_risk_config(config)?;
    let defaults = RiskParams::default();
    Ok(RiskParams {
        position_size: config.get_double("risk", "position_size", defaults.position_size),
        stop_loss_pct: config.get_double("risk", "stop_loss_pct", defaults.stop_loss_pct),
        take_profit_pct: config.get_double("risk", "take_profit_pct", defaults.take_profit_pct),
    })
}

pub fn build_indicator_params(config: &dyn ConfigPort) -> Result<IndicatorParams, ConfluenceError> {
    validate_indicator_config(config)?;
    Ok(read_indicator_params(config))
}

pub fn build_backtest_settings(
    config: &dyn ConfigPort,
    broker: &BrokerSettings,
) -> Result<BacktestSettings, ConfluenceError> {
    validate_backtest_config(config)?;
    let symbol = match config.get_string("backtest", "symbol") {
        Some(s) => s.trim().to_uppercase(),
        None => broker.symbols.first().cloned().ok_or_else(|| {
            ConfluenceError::ConfigMissing {
                section: "backtest".into(),
                key: "symbol".into(),
            }
        })?,
    };

    Ok(BacktestSettings {
        symbol,
        start: parse_date(config, "start")?,
        end: parse_date(config, "end")?,
        config: BacktestConfig {
            initial_capital: config.get_double(
                "backtest",
                "initial_capital",
                DEFAULT_INITIAL_CAPITAL,
            ),
            risk: build_risk_params(config)?,
            indicators: build_indicator_params(config)?,
        },
    })
}
