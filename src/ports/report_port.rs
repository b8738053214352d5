//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ConfluenceError;
use crate::domain::metrics::PerformanceReport;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        report: &PerformanceReport,
    ) -> Result<(), ConfluenceError>;
}
