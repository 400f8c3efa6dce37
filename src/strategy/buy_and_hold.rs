//! One-time equity entry held for the rest of the run.

use rust_decimal::Decimal;
use tracing::debug;

use crate::backtest::BacktestError;
use crate::data::DailyBar;
use crate::portfolio::{AssetClass, Portfolio};

use super::Strategy;

/// Buys a fixed quantity of the underlying at the open of the first day it
/// runs. The stepper calls `execute` every day, so subsequent days are
/// deliberate no-ops rather than errors.
pub struct BuyAndHold {
    asset: String,
    quantity: Decimal,
    leverage: Decimal,
    entered: bool,
}

impl BuyAndHold {
    pub fn new(asset: impl Into<String>, quantity: Decimal, leverage: Decimal) -> Self {
        Self {
            asset: asset.into(),
            quantity,
            leverage,
            entered: false,
        }
    }

    pub fn entered(&self) -> bool {
        self.entered
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &'static str {
        "buy_and_hold"
    }

    fn execute(
        &mut self,
        day: &DailyBar,
        portfolio: &mut Portfolio,
    ) -> Result<(), BacktestError> {
        if self.entered {
            debug!(date = %day.date, asset = %self.asset, "already entered, holding");
            return Ok(());
        }
        portfolio.buy(
            day.date,
            AssetClass::Equity,
            &self.asset,
            day.open,
            self.quantity,
            self.leverage,
        )?;
        self.entered = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn bar(day: u32, price: Decimal) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 0,
        }
    }

    fn portfolio() -> Portfolio {
        let weights: BTreeMap<_, _> = [
            (AssetClass::Equity, dec!(0.6)),
            (AssetClass::Cash, dec!(0.4)),
        ]
        .into_iter()
        .collect();
        let mut p = Portfolio::new(dec!(1_000_000), dec!(1), &weights).unwrap();
        p.register_calendar(&[
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
        ])
        .unwrap();
        p
    }

    #[test]
    fn test_buys_only_once() {
        let mut portfolio = portfolio();
        let mut strategy = BuyAndHold::new("SPY", dec!(1000), dec!(1));

        strategy.execute(&bar(20, dec!(500)), &mut portfolio).unwrap();
        assert!(strategy.entered());
        assert_eq!(portfolio.position(AssetClass::Equity, "SPY"), dec!(1000));
        let cash_after_entry = portfolio.cash();

        // Day two is a no-op even at a different price.
        strategy.execute(&bar(21, dec!(600)), &mut portfolio).unwrap();
        assert_eq!(portfolio.position(AssetClass::Equity, "SPY"), dec!(1000));
        assert_eq!(portfolio.cash(), cash_after_entry);
    }
}
