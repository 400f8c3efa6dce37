//! Day-by-day simulation stepper.
//!
//! The stepper owns the ledger and the bar history. Each day it lets the
//! strategy trade at that day's prices, builds the closing mark map, checks
//! that every held asset class is priceable, and records the day's
//! valuation. Any error stops the run; a backtest that cannot price what it
//! holds has no meaningful NAV to report.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::data::DailyBar;
use crate::portfolio::{AssetClass, LedgerError, MarkMap, Portfolio};
use crate::strategy::Strategy;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("held asset class {class} has no mark price on {date}")]
    UnpriceableAssetClass { date: NaiveDate, class: AssetClass },

    #[error("no candidate strikes on {0}")]
    NoCandidateStrikes(NaiveDate),

    #[error("bar history is empty")]
    EmptyCalendar,
}

/// Runs one strategy over a daily bar history against one ledger.
pub struct Backtest {
    portfolio: Portfolio,
    bars: Vec<DailyBar>,
    underlying: String,
    days_run: usize,
}

impl Backtest {
    /// Registers the bar dates as the ledger's trading calendar.
    pub fn new(
        mut portfolio: Portfolio,
        bars: Vec<DailyBar>,
        underlying: impl Into<String>,
    ) -> Result<Self, BacktestError> {
        if bars.is_empty() {
            return Err(BacktestError::EmptyCalendar);
        }
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        portfolio.register_calendar(&dates)?;
        Ok(Self {
            portfolio,
            bars,
            underlying: underlying.into(),
            days_run: 0,
        })
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn days_run(&self) -> usize {
        self.days_run
    }

    /// Run the full bar history.
    pub fn run(&mut self, strategy: &mut dyn Strategy) -> Result<(), BacktestError> {
        self.run_days(strategy, usize::MAX)
    }

    /// Run at most `limit` days from the start of the history.
    pub fn run_days(
        &mut self,
        strategy: &mut dyn Strategy,
        limit: usize,
    ) -> Result<(), BacktestError> {
        let bars: Vec<DailyBar> = self.bars.iter().take(limit).cloned().collect();
        info!(
            strategy = strategy.name(),
            days = bars.len(),
            "starting backtest"
        );

        for bar in &bars {
            self.step(strategy, bar)?;
        }

        info!(days = self.days_run, "backtest complete");
        Ok(())
    }

    /// One simulated day: trade, mark, validate coverage, record.
    fn step(&mut self, strategy: &mut dyn Strategy, bar: &DailyBar) -> Result<(), BacktestError> {
        debug!(date = %bar.date, open = %bar.open, close = %bar.close, "stepping");
        strategy.execute(bar, &mut self.portfolio)?;

        let mut marks = MarkMap::new();
        marks.insert(AssetClass::Equity, &self.underlying, bar.close);

        // Every held class must be priceable before valuation. A leftover
        // short option, for example, has no closing mark here and must stop
        // the run rather than distort NAV.
        let priceable = marks.classes();
        for class in self.portfolio.held_classes() {
            if !priceable.contains(&class) {
                return Err(BacktestError::UnpriceableAssetClass {
                    date: bar.date,
                    class,
                });
            }
        }

        self.portfolio.update(&marks, &self.underlying)?;
        self.days_run += 1;
        Ok(())
    }
}
