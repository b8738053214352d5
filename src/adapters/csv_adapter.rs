//! CSV file bar adapter.
//!
//! One file per symbol and timeframe: `<data_dir>/<SYMBOL>_<timeframe>.csv`
//! with header `timestamp,open,high,low,close,volume`.

use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::{ensure_ascending, Bar};
use crate::domain::timeframe::Timeframe;
use crate::ports::data_port::DataPort;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Deserialize)]
struct BarRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvBarAdapter {
    base_path: PathBuf,
}

impl CsvBarAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn csv_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.to_uppercase(), timeframe.label()))
    }

    fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, ConfluenceError> {
        let path = self.csv_path(symbol, timeframe);
        let content =
            fs::read_to_string(&path).map_err(|e| ConfluenceError::UpstreamUnavailable {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<BarRecord>().enumerate() {
            let record = result.map_err(|e| ConfluenceError::InvalidData {
                reason: format!("{}: row {}: {}", path.display(), line + 1, e),
            })?;
            bars.push(Bar {
                timestamp: parse_timestamp(&record.timestamp)?,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }

        ensure_ascending(&bars)?;
        debug!(symbol, %timeframe, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare date
/// (midnight).
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ConfluenceError> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ConfluenceError::InvalidData {
            reason: format!("invalid timestamp '{value}'"),
        })
}

impl DataPort for CsvBarAdapter {
    fn get_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, ConfluenceError> {
        let mut bars = self.load(symbol, timeframe)?;
        let skip = bars.len().saturating_sub(limit);
        Ok(bars.split_off(skip))
    }

    fn fetch_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, ConfluenceError> {
        let bars = self.load(symbol, timeframe)?;
        Ok(bars
            .into_iter()
            .filter(|b| {
                let date = b.timestamp.date();
                start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
            })
            .collect())
    }
}
