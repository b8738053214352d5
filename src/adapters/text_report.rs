//! Plain-text backtest report.
//!
//! Renders the summary block followed by a fixed-width trade table, and
//! writes it to a file or to stdout.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ConfluenceError;
use crate::domain::metrics::PerformanceReport;
use crate::ports::report_port::ReportPort;

const RULE_WIDTH: usize = 60;

pub struct TextReportAdapter {
    output: Option<PathBuf>,
}

impl TextReportAdapter {
    /// Write to `output`, or to stdout when `None`.
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        report: &PerformanceReport,
    ) -> Result<(), ConfluenceError> {
        let text = render(result, report);
        match &self.output {
            Some(path) => fs::write(path, text)?,
            None => io::stdout().lock().write_all(text.as_bytes())?,
        }
        Ok(())
    }
}

pub fn render(result: &BacktestResult, report: &PerformanceReport) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("\n{heavy}\n"));
    out.push_str(&format!("BACKTEST RESULTS - {}\n", result.symbol));
    out.push_str(&format!("{heavy}\n"));
    out.push_str(&format!(
        "Initial Capital:    {}\n",
        format_money(report.initial_capital)
    ));
    out.push_str(&format!(
        "Final Capital:      {}\n",
        format_money(report.final_capital)
    ));
    out.push_str(&format!("Total Return:       {:.2}%\n", report.total_return));
    out.push_str(&format!("Max Drawdown:       {:.2}%\n", report.max_drawdown));
    out.push_str(&format!("{light}\n"));
    out.push_str(&format!("Total Trades:       {}\n", report.total_trades));
    out.push_str(&format!("Winning Trades:     {}\n", report.winning_trades));
    out.push_str(&format!("Losing Trades:      {}\n", report.losing_trades));
    out.push_str(&format!("Breakeven Trades:   {}\n", report.breakeven_trades));
    out.push_str(&format!("Win Rate:           {:.2}%\n", report.win_rate));
    out.push_str(&format!("Avg Win:            {}\n", format_money(report.avg_win)));
    out.push_str(&format!("Avg Loss:           {}\n", format_money(report.avg_loss)));
    out.push_str(&format!("Profit Factor:      {:.2}\n", report.profit_factor));
    out.push_str(&format!("{heavy}\n"));

    if result.trades.is_empty() {
        out.push_str("\nNo trades.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<19}  {:<19}  {:>10}  {:>10}  {:>6}  {:>10}  {:>8}  {}\n",
        "Entry", "Exit", "Entry Px", "Exit Px", "Shares", "P&L", "P&L %", "Reason"
    ));
    for trade in &result.trades {
        out.push_str(&format!(
            "{:<19}  {:<19}  {:>10.2}  {:>10.2}  {:>6}  {:>10.2}  {:>7.2}%  {}\n",
            trade.entry_time.format("%Y-%m-%d %H:%M:%S"),
            trade.exit_time.format("%Y-%m-%d %H:%M:%S"),
            trade.entry_price,
            trade.exit_price,
            trade.shares,
            trade.pnl,
            trade.pnl_pct,
            trade.exit_reason,
        ));
    }
    out
}

/// Largest magnitude whose cent count fits exactly in an `f64`.
const MAX_GROUPED: f64 = 1e13;

/// `$1,234.56`, with a leading minus for negatives. Non-finite values print
/// as `n/a`; magnitudes beyond `MAX_GROUPED` print ungrouped.
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    if value.abs() >= MAX_GROUPED {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}${:.2}", value.abs());
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::EquityPoint;
    use crate::domain::position::{ExitReason, Trade};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_result() -> BacktestResult {
        let t0 = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let t1 = t0 + chrono::Duration::minutes(5);
        BacktestResult {
            symbol: "AAPL".into(),
            initial_capital: 10_000.0,
            final_capital: 9_973.0,
            trades: vec![Trade {
                entry_time: t0,
                exit_time: t1,
                entry_price: 103.0,
                exit_price: 100.0,
                shares: 9,
                pnl: -27.0,
                pnl_pct: -2.912621359223301,
                exit_reason: ExitReason::StopLoss,
            }],
            equity_curve: vec![
                EquityPoint { timestamp: t0, equity: 10_000.0 },
                EquityPoint { timestamp: t1, equity: 9_973.0 },
            ],
        }
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(10_000.0), "$10,000.00");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_money(999.5), "$999.50");
        assert_eq!(format_money(-27.0), "-$27.00");
        assert_eq!(format_money(0.0), "$0.00");
    }

    #[test]
    fn money_outside_range_is_not_zero() {
        assert_eq!(format_money(f64::NAN), "n/a");
        assert_eq!(format_money(f64::INFINITY), "n/a");
        assert_eq!(format_money(-2.5e13), "-$25000000000000.00");
    }

    #[test]
    fn render_contains_summary_and_trades() {
        let result = sample_result();
        let report = PerformanceReport::compute(&result);
        let text = render(&result, &report);

        assert!(text.contains("BACKTEST RESULTS - AAPL"));
        assert!(text.contains("Initial Capital:    $10,000.00"));
        assert!(text.contains("Final Capital:      $9,973.00"));
        assert!(text.contains("Total Return:       -0.27%"));
        assert!(text.contains("Losing Trades:      1"));
        assert!(text.contains("Avg Loss:           -$27.00"));
        assert!(text.contains("STOP_LOSS"));
    }

    #[test]
    fn render_without_trades() {
        let mut result = sample_result();
        result.trades.clear();
        let report = PerformanceReport::compute(&result);
        assert!(render(&result, &report).contains("No trades."));
    }

    #[test]
    fn writes_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        let result = sample_result();
        let report = PerformanceReport::compute(&result);

        TextReportAdapter::new(Some(path.clone()))
            .write(&result, &report)
            .unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert_eq!(written, render(&result, &report));
    }
}
