//! CSV export of the trade list and equity curve.
//!
//! Writes `<dir>/<SYMBOL>_trades.csv` and `<dir>/<SYMBOL>_equity.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ConfluenceError;
use crate::domain::metrics::PerformanceReport;
use crate::ports::report_port::ReportPort;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
struct TradeRow {
    entry_time: String,
    exit_time: String,
    entry_price: f64,
    exit_price: f64,
    shares: u64,
    pnl: f64,
    pnl_pct: f64,
    exit_reason: String,
}

#[derive(Serialize)]
struct EquityRow {
    timestamp: String,
    equity: f64,
}

pub struct CsvReportAdapter {
    dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn trades_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_trades.csv"))
    }

    pub fn equity_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_equity.csv"))
    }
}

fn csv_error(path: &Path, e: csv::Error) -> ConfluenceError {
    ConfluenceError::Io(std::io::Error::other(format!(
        "failed to write {}: {}",
        path.display(),
        e
    )))
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        _report: &PerformanceReport,
    ) -> Result<(), ConfluenceError> {
        fs::create_dir_all(&self.dir)?;

        let trades_path = self.trades_path(&result.symbol);
        let mut wtr = csv::Writer::from_path(&trades_path).map_err(|e| csv_error(&trades_path, e))?;
        for trade in &result.trades {
            wtr.serialize(TradeRow {
                entry_time: trade.entry_time.format(TIMESTAMP_FORMAT).to_string(),
                exit_time: trade.exit_time.format(TIMESTAMP_FORMAT).to_string(),
                entry_price: trade.entry_price,
                exit_price: trade.exit_price,
                shares: trade.shares,
                pnl: trade.pnl,
                pnl_pct: trade.pnl_pct,
                exit_reason: trade.exit_reason.to_string(),
            })
            .map_err(|e| csv_error(&trades_path, e))?;
        }
        wtr.flush()?;

        let equity_path = self.equity_path(&result.symbol);
        let mut wtr = csv::Writer::from_path(&equity_path).map_err(|e| csv_error(&equity_path, e))?;
        for point in &result.equity_curve {
            wtr.serialize(EquityRow {
                timestamp: point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                equity: point.equity,
            })
            .map_err(|e| csv_error(&equity_path, e))?;
        }
        wtr.flush()?;

        info!(
            trades = %trades_path.display(),
            equity = %equity_path.display(),
            "exported backtest csv"
        );
        Ok(())
    }
}
