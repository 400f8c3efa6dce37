//! Trading strategies driven by the backtest stepper.
//!
//! A strategy receives one day's bar and the ledger, and submits zero or
//! more trades. Strategies never own the ledger; the stepper lends it for
//! the duration of the call.

mod buy_and_hold;
mod collar;

pub use buy_and_hold::BuyAndHold;
pub use collar::{CollarRecord, ZeroCostCollar};

use crate::backtest::BacktestError;
use crate::data::DailyBar;
use crate::portfolio::Portfolio;

pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Act on one trading day. Called exactly once per day, in calendar
    /// order, before the day's mark-to-market.
    fn execute(&mut self, day: &DailyBar, portfolio: &mut Portfolio)
        -> Result<(), BacktestError>;
}

/// The full overlay: a one-time equity entry followed by the daily collar,
/// run in that order within each day so the first day's collar already
/// hedges the freshly-entered position.
pub struct CollarOverlay {
    entry: BuyAndHold,
    collar: ZeroCostCollar,
}

impl CollarOverlay {
    pub fn new(entry: BuyAndHold, collar: ZeroCostCollar) -> Self {
        Self { entry, collar }
    }

    /// The collar leg, for its per-day records and pricing diagnostics.
    pub fn collar(&self) -> &ZeroCostCollar {
        &self.collar
    }
}

impl Strategy for CollarOverlay {
    fn name(&self) -> &'static str {
        "buy_and_hold_with_collar"
    }

    fn execute(
        &mut self,
        day: &DailyBar,
        portfolio: &mut Portfolio,
    ) -> Result<(), BacktestError> {
        self.entry.execute(day, portfolio)?;
        self.collar.execute(day, portfolio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LegRule, ModelConfig, Rounding, StrikeSelection};
    use crate::portfolio::AssetClass;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    #[test]
    fn test_overlay_enters_then_collars_same_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let weights: BTreeMap<_, _> = [
            (AssetClass::Equity, dec!(0.6)),
            (AssetClass::Cash, dec!(0.4)),
        ]
        .into_iter()
        .collect();
        let mut portfolio = Portfolio::new(dec!(1_000_000), dec!(1), &weights).unwrap();
        portfolio.register_calendar(&[date]).unwrap();

        let selection = StrikeSelection::FixedRule {
            call: LegRule {
                multiplier: 1.01,
                rounding: Rounding::Floor,
                offset: 0.0,
            },
            put: LegRule {
                multiplier: 1.0,
                rounding: Rounding::Floor,
                offset: -1.0,
            },
        };
        let mut overlay = CollarOverlay::new(
            BuyAndHold::new("SPY", dec!(10), dec!(1)),
            ZeroCostCollar::new("SPY", selection, &ModelConfig::default()),
        );

        let day = DailyBar {
            date,
            open: dec!(100),
            high: dec!(100),
            low: dec!(100),
            close: dec!(100),
            volume: 0,
        };
        overlay.execute(&day, &mut portfolio).unwrap();

        // Entry happened first, so the same-day collar hedged it.
        assert_eq!(portfolio.position(AssetClass::Equity, "SPY"), dec!(10));
        assert_eq!(overlay.collar().records().len(), 1);
        assert_eq!(overlay.collar().records()[0].call_strike, dec!(101));
        // Both legs settled at the close; only the equity remains.
        assert_eq!(portfolio.held_classes().len(), 1);
    }
}
