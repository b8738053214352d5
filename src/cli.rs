//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvBarAdapter;
use crate::adapters::csv_report::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_broker::PaperBroker;
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::backtest::run_backtest;
use crate::domain::error::ConfluenceError;
use crate::domain::live::{CycleOutcome, LiveTrader, TickOutcome};
use crate::domain::metrics::PerformanceReport;
use crate::domain::settings::Settings;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

/// Environment variable holding a tracing filter; overrides `--log-level`.
pub const LOG_ENV: &str = "CONFLUENCE_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "confluence",
    about = "Multi-indicator signal scoring and backtesting"
)]
pub struct Cli {
    /// Log level or tracing filter directive
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    /// Log output format: text or json
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay historical bars for one symbol and report performance
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Run one trading tick per symbol against a paper broker
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Validate a configuration file and print the resolved parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    if let Err(reason) = init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {reason}");
        return ExitCode::from(2);
    }

    let outcome = match cli.command {
        Command::Backtest {
            config,
            symbol,
            data_dir,
            output,
            export_dir,
        } => run_backtest_command(
            &config,
            symbol.as_deref(),
            data_dir,
            output,
            export_dir,
        ),
        Command::Signal { config, symbol } => run_signal_command(&config, symbol.as_deref()),
        Command::Validate { config } => run_validate_command(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing(log_level: &str, log_format: &str) -> Result<(), String> {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let format = log_format.trim().to_lowercase();
    let _ = match format.as_str() {
        "json" => builder.json().try_init(),
        "text" => builder.try_init(),
        other => return Err(format!("unknown log format '{other}' (expected text or json)")),
    };
    Ok(())
}

pub fn load_settings(path: &Path) -> Result<Settings, ConfluenceError> {
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    Settings::from_config(&adapter)
}

fn run_backtest_command(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_dir_override: Option<PathBuf>,
    output: Option<PathBuf>,
    export_dir: Option<PathBuf>,
) -> Result<(), ConfluenceError> {
    let settings = load_settings(config_path)?;
    let symbol = symbol_override
        .map(|s| s.trim().to_uppercase())
        .unwrap_or_else(|| settings.backtest.symbol.clone());
    let data_dir = data_dir_override.unwrap_or_else(|| settings.broker.data_dir.clone());

    let data = CsvBarAdapter::new(data_dir);
    let bars = data.fetch_range(
        &symbol,
        settings.broker.timeframe,
        settings.backtest.start,
        settings.backtest.end,
    )?;

    let result = run_backtest(&symbol, &bars, &settings.backtest.config)?;
    let report = PerformanceReport::compute(&result);

    TextReportAdapter::new(output).write(&result, &report)?;
    if let Some(dir) = export_dir {
        CsvReportAdapter::new(dir).write(&result, &report)?;
    }
    Ok(())
}

fn run_signal_command(
    config_path: &Path,
    symbol_override: Option<&str>,
) -> Result<(), ConfluenceError> {
    let settings = load_settings(config_path)?;
    let symbols: Vec<String> = match symbol_override {
        Some(s) => vec![s.trim().to_uppercase()],
        None => settings.broker.symbols.clone(),
    };
    let timeframe = settings.broker.timeframe;
    let data = CsvBarAdapter::new(&settings.broker.data_dir);

    let mut broker = PaperBroker::new(settings.broker.paper_cash);
    for symbol in &symbols {
        match data.get_bars(symbol, timeframe, 1) {
            Ok(bars) => {
                if let Some(last) = bars.last() {
                    broker.mark(symbol, last.close);
                }
            }
            Err(e) => warn!(symbol = %symbol, error = %e, "no price to mark"),
        }
    }

    let mut trader = LiveTrader::new(
        data,
        broker,
        timeframe,
        settings.risk.clone(),
        settings.indicators.clone(),
    );

    match trader.run_cycle(&symbols)? {
        CycleOutcome::MarketClosed => println!("market closed"),
        CycleOutcome::Completed(outcomes) => {
            for (symbol, outcome) in outcomes {
                println!("{}", describe_tick(&symbol, &outcome));
            }
        }
    }
    Ok(())
}

pub fn describe_tick(symbol: &str, outcome: &Result<TickOutcome, ConfluenceError>) -> String {
    match outcome {
        Ok(TickOutcome::NoData) => format!("{symbol}: no data"),
        Ok(TickOutcome::Hold(signal)) => format!("{symbol}: {signal} (no action)"),
        Ok(TickOutcome::InsufficientCapital {
            price,
            buying_power,
        }) => format!(
            "{symbol}: BUY skipped, buying power {buying_power:.2} too low at {price:.2}"
        ),
        Ok(TickOutcome::Entered(ack)) => format!(
            "{symbol}: BUY {} @ {:.2} (order {})",
            ack.qty, ack.fill_price, ack.order_id
        ),
        Ok(TickOutcome::Exited { ack, reason }) => format!(
            "{symbol}: SELL {} @ {:.2} {reason} (order {})",
            ack.qty, ack.fill_price, ack.order_id
        ),
        Err(e) => format!("{symbol}: error: {e}"),
    }
}

fn run_validate_command(config_path: &Path) -> Result<(), ConfluenceError> {
    let settings = load_settings(config_path)?;
    let ind = &settings.indicators;
    let risk = &settings.risk;
    let bt = &settings.backtest;

    println!("Config validated successfully");
    println!("\n[broker]");
    println!("  symbols:          {}", settings.broker.symbols.join(","));
    let timeframe = settings.broker.timeframe;
    println!(
        "  timeframe:        {} ({} min bars)",
        timeframe,
        timeframe.duration().num_minutes()
    );
    println!("  data_dir:         {}", settings.broker.data_dir.display());
    println!("  paper_cash:       {:.2}", settings.broker.paper_cash);
    println!("\n[risk]");
    println!("  position_size:    {}", risk.position_size);
    println!("  stop_loss_pct:    {}", risk.stop_loss_pct);
    println!("  take_profit_pct:  {}", risk.take_profit_pct);
    println!("\n[indicators]");
    println!("  rsi_period:       {}", ind.rsi_period);
    println!(
        "  macd:             {}/{}/{}",
        ind.macd_fast, ind.macd_slow, ind.macd_signal
    );
    println!("  bollinger:        {} x {}", ind.bb_period, ind.bb_std);
    println!("  ema:              {}/{}", ind.ema_fast, ind.ema_slow);
    println!("  volume_period:    {}", ind.volume_period);
    println!("  lookback:         {} bars", ind.lookback());
    println!("\n[backtest]");
    println!("  symbol:           {}", bt.symbol);
    println!("  initial_capital:  {:.2}", bt.config.initial_capital);
    println!(
        "  window:           {} .. {}",
        bt.start.map_or("open".to_string(), |d| d.to_string()),
        bt.end.map_or("open".to_string(), |d| d.to_string())
    );
    Ok(())
}
