//! # Run a backtest
//! collar-backtest run --config config/default.toml --bars data/SPY.csv --output results
//!
//! # Run with prefetched market premiums instead of pure model pricing
//! collar-backtest run --config config/default.toml --bars data/SPY.csv \
//!     --premiums results/premiums.csv --output results
//!
//! # Prefetch observed open premiums from Polygon.io (needs POLYGON_API_KEY)
//! collar-backtest fetch --config config/default.toml --bars data/SPY.csv \
//!     --output results/premiums.csv

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use collar_backtest::config::{BacktestConfig, StrikeSelection};
use collar_backtest::data::{
    load_bars, load_premium_table, DailyBar, FetchSettings, OptionKind, OptionRequest,
    PolygonClient,
};
use collar_backtest::pricing::strike_band;
use collar_backtest::{Backtest, BuyAndHold, CollarOverlay, Portfolio, ZeroCostCollar};

#[derive(Parser)]
#[command(name = "collar-backtest")]
#[command(about = "Daily zero-cost-collar overlay backtester")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest with the given configuration
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Path to the daily bar CSV for the underlying
        #[arg(short, long)]
        bars: PathBuf,

        /// Optional prefetched premium CSV (from the `fetch` command)
        #[arg(short, long)]
        premiums: Option<PathBuf>,

        /// Limit the run to the first N trading days
        #[arg(short, long)]
        days: Option<usize>,

        /// Output directory for result CSVs
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Fetch observed open premiums for every contract a run would trade
    Fetch {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Path to the daily bar CSV for the underlying
        #[arg(short, long)]
        bars: PathBuf,

        /// Output CSV path for the premium table
        #[arg(short, long, default_value = "results/premiums.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            bars,
            premiums,
            days,
            output,
        } => run(&config, &bars, premiums.as_deref(), days, &output),
        Commands::Fetch {
            config,
            bars,
            output,
        } => fetch(&config, &bars, &output).await,
    }
}

fn run(
    config_path: &std::path::Path,
    bars_path: &std::path::Path,
    premiums_path: Option<&std::path::Path>,
    days: Option<usize>,
    output: &std::path::Path,
) -> anyhow::Result<()> {
    let config = BacktestConfig::load(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let bars =
        load_bars(bars_path).with_context(|| format!("loading bars {}", bars_path.display()))?;

    let mut collar = ZeroCostCollar::new(&config.underlying, config.strike_selection, &config.model);
    if let Some(path) = premiums_path {
        let table = load_premium_table(path)
            .with_context(|| format!("loading premiums {}", path.display()))?;
        println!("Loaded {} observed premiums", table.len());
        collar = collar.with_quote_source(Box::new(table));
    }

    let portfolio = Portfolio::new(config.nominal_value, config.collateral_ratio, &config.weights)?;
    let mut strategy = CollarOverlay::new(
        BuyAndHold::new(&config.underlying, config.equity_quantity, config.leverage),
        collar,
    );

    let mut backtest = Backtest::new(portfolio, bars, &config.underlying)?;
    match days {
        Some(limit) => backtest.run_days(&mut strategy, limit)?,
        None => backtest.run(&mut strategy)?,
    }

    std::fs::create_dir_all(output)?;
    collar_backtest::report::write_history_csv(
        backtest.portfolio(),
        backtest.bars(),
        &output.join("history.csv"),
    )?;
    collar_backtest::report::write_transactions_csv(
        backtest.portfolio(),
        &output.join("transactions.csv"),
    )?;
    collar_backtest::report::write_collar_csv(
        strategy.collar().records(),
        &output.join("collar.csv"),
    )?;

    let portfolio = backtest.portfolio();
    let final_nav = portfolio.nav_history().last().copied().unwrap_or(Decimal::ONE);
    let option_pnl: Decimal = strategy.collar().records().iter().map(|r| r.pnl()).sum();

    println!("Backtest complete");
    println!("  Days:            {}", backtest.days_run());
    println!("  Collar days:     {}", strategy.collar().records().len());
    println!("  Final NAV:       {final_nav}");
    println!("  Option-leg P&L:  {option_pnl} per hedged share");
    if premiums_path.is_some() {
        println!(
            "  Model-priced:    {} contracts lacked market data",
            strategy.collar().model_priced().len()
        );
    }
    println!("  Results in {}", output.display());
    Ok(())
}

/// Every contract a run would trade, across both selection policies.
fn fetch_requests(config: &BacktestConfig, bars: &[DailyBar]) -> Vec<OptionRequest> {
    let mut requests = Vec::new();
    for bar in bars {
        let open: f64 = bar.open.try_into().unwrap_or(0.0);
        match config.strike_selection {
            StrikeSelection::ZeroCostSearch {
                lower_bound,
                upper_bound,
            } => {
                for strike in strike_band(open, lower_bound, upper_bound) {
                    for kind in [OptionKind::Call, OptionKind::Put] {
                        requests.push(OptionRequest {
                            date: bar.date,
                            strike: Decimal::from(strike),
                            kind,
                        });
                    }
                }
            }
            StrikeSelection::FixedRule { call, put } => {
                for (rule, kind) in [(call, OptionKind::Call), (put, OptionKind::Put)] {
                    requests.push(OptionRequest {
                        date: bar.date,
                        strike: Decimal::from_f64_retain(rule.strike(open)).unwrap_or_default(),
                        kind,
                    });
                }
            }
        }
    }
    requests
}

async fn fetch(
    config_path: &std::path::Path,
    bars_path: &std::path::Path,
    output: &std::path::Path,
) -> anyhow::Result<()> {
    let config = BacktestConfig::load(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let bars =
        load_bars(bars_path).with_context(|| format!("loading bars {}", bars_path.display()))?;

    let api_key = std::env::var("POLYGON_API_KEY")
        .context("POLYGON_API_KEY environment variable is required for fetch")?;
    let client = PolygonClient::new(api_key);
    let settings = FetchSettings::default();

    let requests = fetch_requests(&config, &bars);
    println!(
        "Fetching {} contracts across {} trading days",
        requests.len(),
        bars.len()
    );

    let progress = ProgressBar::new(requests.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let outcome = client
        .fetch_premiums(&config.underlying, &requests, &settings, || {
            progress.inc(1);
        })
        .await;
    progress.finish();

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    collar_backtest::report::write_premiums_csv(&outcome.premiums, output)?;

    println!("Fetched {} premiums", outcome.premiums.len());
    if !outcome.unavailable.is_empty() {
        println!(
            "  {} contracts had no market data and will be model-priced",
            outcome.unavailable.len()
        );
    }
    println!("  Written to {}", output.display());
    Ok(())
}
