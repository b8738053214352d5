//! Configuration validation.
//!
//! Checks every recognized key before a run. Absent keys fall back to their
//! defaults; present keys must parse and satisfy their range.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::backtest::WARMUP_BARS;
use crate::domain::error::ConfluenceError;
use crate::domain::indicator::IndicatorParams;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    validate_broker_config(config)?;
    validate_risk_config(config)?;
    validate_indicator_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

pub fn validate_broker_config(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(symbols) = config.get_list("broker", "symbols") {
        if symbols.is_empty() {
            return Err(ConfluenceError::config_invalid(
                "broker",
                "symbols",
                "at least one symbol is required",
            ));
        }
    }
    if let Some(cash) = parsed::<f64>(config, "broker", "paper_cash")? {
        if !is_positive(cash) {
            return Err(ConfluenceError::config_invalid(
                "broker",
                "paper_cash",
                "paper_cash must be positive",
            ));
        }
    }
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(size) = parsed::<f64>(config, "risk", "position_size")? {
        if !is_positive(size) || size > 1.0 {
            return Err(ConfluenceError::config_invalid(
                "risk",
                "position_size",
                "position_size must be between 0 and 1",
            ));
        }
    }
    for key in ["stop_loss_pct", "take_profit_pct"] {
        if let Some(value) = parsed::<f64>(config, "risk", key)? {
            if !is_positive(value) {
                return Err(ConfluenceError::config_invalid(
                    "risk",
                    key,
                    format!("{key} must be positive"),
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    const PERIODS: [&str; 8] = [
        "rsi_period",
        "macd_fast",
        "macd_slow",
        "macd_signal",
        "bb_period",
        "ema_fast",
        "ema_slow",
        "volume_period",
    ];
    for key in PERIODS {
        if let Some(value) = parsed::<i64>(config, "indicators", key)? {
            if value < 1 {
                return Err(ConfluenceError::config_invalid(
                    "indicators",
                    key,
                    format!("{key} must be a positive integer"),
                ));
            }
        }
    }
    if let Some(value) = parsed::<f64>(config, "indicators", "bb_std")? {
        if !is_positive(value) {
            return Err(ConfluenceError::config_invalid(
                "indicators",
                "bb_std",
                "bb_std must be positive",
            ));
        }
    }

    let macd_fast = config.get_int("indicators", "macd_fast", 12);
    let macd_slow = config.get_int("indicators", "macd_slow", 26);
    if macd_fast >= macd_slow {
        return Err(ConfluenceError::config_invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    let ema_fast = config.get_int("indicators", "ema_fast", 9);
    let ema_slow = config.get_int("indicators", "ema_slow", 21);
    if ema_fast >= ema_slow {
        return Err(ConfluenceError::config_invalid(
            "indicators",
            "ema_fast",
            "ema_fast must be less than ema_slow",
        ));
    }
    validate_lookback(config)
}

/// Indicator parameters as configured, with defaults for absent keys. Does
/// not validate.
pub(crate) fn read_indicator_params(config: &dyn ConfigPort) -> IndicatorParams {
    let d = IndicatorParams::default();
    let period = |key: &str, default: usize| -> usize {
        usize::try_from(config.get_int("indicators", key, default as i64)).unwrap_or(default)
    };
    IndicatorParams {
        rsi_period: period("rsi_period", d.rsi_period),
        macd_fast: period("macd_fast", d.macd_fast),
        macd_slow: period("macd_slow", d.macd_slow),
        macd_signal: period("macd_signal", d.macd_signal),
        bb_period: period("bb_period", d.bb_period),
        bb_std: config.get_double("indicators", "bb_std", d.bb_std),
        ema_fast: period("ema_fast", d.ema_fast),
        ema_slow: period("ema_slow", d.ema_slow),
        volume_period: period("volume_period", d.volume_period),
    }
}

/// The scorer needs two complete rows inside a `WARMUP_BARS` window, so the
/// longest lookback may be at most `WARMUP_BARS - 1`.
fn validate_lookback(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    let params = read_indicator_params(config);
    let lookback = params.lookback();
    if lookback < WARMUP_BARS {
        return Ok(());
    }

    let spans = [
        ("rsi_period", params.rsi_period),
        ("macd_slow", params.macd_slow + params.macd_signal.saturating_sub(1)),
        ("bb_period", params.bb_period),
        ("ema_slow", params.ema_slow),
        ("volume_period", params.volume_period),
    ];
    let key = spans
        .iter()
        .max_by_key(|(_, span)| *span)
        .map_or("macd_slow", |(key, _)| key);
    Err(ConfluenceError::config_invalid(
        "indicators",
        key,
        format!("lookback of {lookback} bars must be below the {WARMUP_BARS}-bar scoring window"),
    ))
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(capital) = parsed::<f64>(config, "backtest", "initial_capital")? {
        if !is_positive(capital) {
            return Err(ConfluenceError::config_invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    if let Some(symbol) = config.get_string("backtest", "symbol") {
        if symbol.trim().is_empty() {
            return Err(ConfluenceError::config_invalid(
                "backtest",
                "symbol",
                "symbol must not be empty",
            ));
        }
    }

    let start = parse_date(config, "start")?;
    let end = parse_date(config, "end")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ConfluenceError::config_invalid(
                "backtest",
                "start",
                "start must not be after end",
            ));
        }
    }
    Ok(())
}

/// Optional `YYYY-MM-DD` date under `[backtest]`.
pub fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, ConfluenceError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ConfluenceError::config_invalid(
                    "backtest",
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

/// Upper-cased `[broker] symbols`, or the default list when absent.
pub fn parse_symbols(config: &dyn ConfigPort, default: &str) -> Vec<String> {
    let items = config.get_list("broker", "symbols").unwrap_or_else(|| {
        default.split(',').map(|s| s.trim().to_string()).collect()
    });
    items.into_iter().map(|s| s.to_uppercase()).collect()
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, ConfluenceError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            ConfluenceError::config_invalid(section, key, format!("'{raw}' is not a number"))
        }),
    }
}
