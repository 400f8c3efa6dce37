//! Portfolio ledger: cash, margin, signed positions, and derived NAV history.
//!
//! The ledger is the accounting core of the backtester. It owns:
//! - free cash and the cash liability accrued from levered buys
//! - signed positions keyed by (asset class, asset id); positive = long,
//!   negative = short
//! - margin accounts posted against open shorts, released proportionally
//!   as the short is covered
//! - the registered trading calendar and an append-only transaction log
//! - per-day value / NAV / exposure histories
//!
//! Every mutator is atomic: it either fully applies or returns an error with
//! no state change. Funding and position shortfalls are errors rather than
//! silently adjusted trades, since masking them would corrupt NAV history.

mod asset_class;

pub use asset_class::AssetClass;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by ledger construction and mutation.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("target weights sum to {got}, expected collateral ratio {expected}")]
    InvalidWeights { got: Decimal, expected: Decimal },

    #[error("trading calendar has already been registered")]
    CalendarAlreadyRegistered,

    #[error("trading calendar must be non-empty and strictly ascending")]
    InvalidCalendar,

    #[error("trading calendar has not been registered")]
    CalendarNotRegistered,

    #[error("date {0} is not in the registered trading calendar")]
    UnregisteredDate(NaiveDate),

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("leverage must be >= 1, got {0}")]
    InvalidLeverage(Decimal),

    #[error("insufficient funds: need {needed}, available cash {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    #[error("insufficient shorting power: margin {needed}, available cash {available}")]
    InsufficientShortingPower { needed: Decimal, available: Decimal },

    #[error("insufficient position in {asset} ({class}): held {held}, requested {requested}")]
    InsufficientPosition {
        class: AssetClass,
        asset: String,
        held: Decimal,
        requested: Decimal,
    },

    #[error("no margin account open for {asset} ({class})")]
    NoMarginAccount { class: AssetClass, asset: String },

    #[error("no mark price for held asset {asset} ({class})")]
    MissingMark { class: AssetClass, asset: String },
}

/// Mark-to-market price map for one valuation pass, keyed by asset class
/// and asset id.
#[derive(Debug, Clone, Default)]
pub struct MarkMap {
    marks: BTreeMap<AssetClass, BTreeMap<String, Decimal>>,
}

impl MarkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: AssetClass, asset: &str, price: Decimal) {
        self.marks
            .entry(class)
            .or_default()
            .insert(asset.to_string(), price);
    }

    pub fn get(&self, class: AssetClass, asset: &str) -> Option<Decimal> {
        self.marks.get(&class).and_then(|m| m.get(asset)).copied()
    }

    /// Asset classes with at least one mark.
    pub fn classes(&self) -> BTreeSet<AssetClass> {
        self.marks
            .iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(c, _)| *c)
            .collect()
    }
}

/// The accounting ledger for one backtest run.
///
/// Constructed once with initial nominal capital, a collateral ratio, and
/// target weights; the calendar is registered once; each simulated day
/// appends exactly one entry to each history. Never reset mid-run.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: Decimal,
    cash_liability: Decimal,
    positions: BTreeMap<AssetClass, BTreeMap<String, Decimal>>,
    margin_accounts: BTreeMap<AssetClass, BTreeMap<String, Decimal>>,
    calendar: Vec<NaiveDate>,
    transaction_log: BTreeMap<NaiveDate, Vec<String>>,
    value_history: Vec<Decimal>,
    nav_history: Vec<Decimal>,
    equity_exposure_history: Vec<Decimal>,
    cash_exposure_history: Vec<Decimal>,
    nominal_value: Decimal,
    shares: Decimal,
    collateral_ratio: Decimal,
    target_weights: BTreeMap<AssetClass, Decimal>,
}

impl Portfolio {
    /// Create a ledger with `nominal_value` of capital at $1 per share.
    ///
    /// Initial cash is `nominal_value * collateral_ratio`; the portion of the
    /// ratio above 1 is unencumbered over-collateralization. The target
    /// weights must sum exactly to the collateral ratio.
    pub fn new(
        nominal_value: Decimal,
        collateral_ratio: Decimal,
        target_weights: &BTreeMap<AssetClass, Decimal>,
    ) -> Result<Self, LedgerError> {
        let weight_sum: Decimal = target_weights.values().copied().sum();
        if weight_sum != collateral_ratio {
            return Err(LedgerError::InvalidWeights {
                got: weight_sum,
                expected: collateral_ratio,
            });
        }

        // Class buckets exist from the start, even while empty.
        let empty_buckets = || {
            AssetClass::ALL
                .iter()
                .map(|c| (*c, BTreeMap::new()))
                .collect::<BTreeMap<_, _>>()
        };

        Ok(Self {
            cash: nominal_value * collateral_ratio,
            cash_liability: Decimal::ZERO,
            positions: empty_buckets(),
            margin_accounts: empty_buckets(),
            calendar: Vec::new(),
            transaction_log: BTreeMap::new(),
            value_history: Vec::new(),
            nav_history: Vec::new(),
            equity_exposure_history: Vec::new(),
            cash_exposure_history: Vec::new(),
            nominal_value,
            shares: nominal_value,
            collateral_ratio,
            target_weights: target_weights.clone(),
        })
    }

    /// Register the trading calendar. Allowed exactly once; the dates must be
    /// strictly ascending (which also rules out duplicates).
    pub fn register_calendar(&mut self, dates: &[NaiveDate]) -> Result<(), LedgerError> {
        if !self.calendar.is_empty() {
            return Err(LedgerError::CalendarAlreadyRegistered);
        }
        if dates.is_empty() || dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LedgerError::InvalidCalendar);
        }
        self.calendar = dates.to_vec();
        self.transaction_log = dates.iter().map(|d| (*d, Vec::new())).collect();
        Ok(())
    }

    fn check_date(&self, date: NaiveDate) -> Result<(), LedgerError> {
        if self.calendar.is_empty() {
            return Err(LedgerError::CalendarNotRegistered);
        }
        if !self.transaction_log.contains_key(&date) {
            return Err(LedgerError::UnregisteredDate(date));
        }
        Ok(())
    }

    fn check_quantity(quantity: Decimal) -> Result<(), LedgerError> {
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveQuantity(quantity));
        }
        Ok(())
    }

    fn check_leverage(leverage: Decimal) -> Result<(), LedgerError> {
        if leverage < Decimal::ONE {
            return Err(LedgerError::InvalidLeverage(leverage));
        }
        Ok(())
    }

    fn add_position(&mut self, class: AssetClass, asset: &str, delta: Decimal) {
        let bucket = self.positions.entry(class).or_default();
        let quantity = bucket.entry(asset.to_string()).or_insert(Decimal::ZERO);
        *quantity += delta;
        if quantity.is_zero() {
            bucket.remove(asset);
        }
    }

    fn log(&mut self, date: NaiveDate, record: String) {
        debug!(date = %date, "{record}");
        if let Some(records) = self.transaction_log.get_mut(&date) {
            records.push(record);
        }
    }

    /// Buy `quantity` of `asset` at `price`, borrowing `(1 - 1/leverage)` of
    /// the notional cost as cash liability.
    pub fn buy(
        &mut self,
        date: NaiveDate,
        class: AssetClass,
        asset: &str,
        price: Decimal,
        quantity: Decimal,
        leverage: Decimal,
    ) -> Result<(), LedgerError> {
        self.check_date(date)?;
        Self::check_quantity(quantity)?;
        Self::check_leverage(leverage)?;

        let notional = price * quantity;
        let cash_needed = notional / leverage;
        if cash_needed > self.cash {
            return Err(LedgerError::InsufficientFunds {
                needed: cash_needed,
                available: self.cash,
            });
        }

        self.cash -= cash_needed;
        self.cash_liability += notional - cash_needed;
        self.add_position(class, asset, quantity);
        self.log(date, format!("bought {quantity} {asset} ({class}) at {price}"));
        Ok(())
    }

    /// Sell `quantity` of a long position at `price`.
    pub fn sell(
        &mut self,
        date: NaiveDate,
        class: AssetClass,
        asset: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<(), LedgerError> {
        self.check_date(date)?;
        Self::check_quantity(quantity)?;

        let held = self.position(class, asset);
        if held < quantity {
            return Err(LedgerError::InsufficientPosition {
                class,
                asset: asset.to_string(),
                held,
                requested: quantity,
            });
        }

        self.cash += price * quantity;
        self.add_position(class, asset, -quantity);
        self.log(date, format!("sold {quantity} {asset} ({class}) at {price}"));
        Ok(())
    }

    /// Short `quantity` of `asset` at `price`, posting `proceeds / leverage`
    /// as margin. Proceeds beyond the posted margin become usable cash.
    pub fn short(
        &mut self,
        date: NaiveDate,
        class: AssetClass,
        asset: &str,
        price: Decimal,
        quantity: Decimal,
        leverage: Decimal,
    ) -> Result<(), LedgerError> {
        self.check_date(date)?;
        Self::check_quantity(quantity)?;
        Self::check_leverage(leverage)?;

        let proceeds = price * quantity;
        let margin = proceeds / leverage;
        if margin > self.cash {
            return Err(LedgerError::InsufficientShortingPower {
                needed: margin,
                available: self.cash,
            });
        }

        self.cash += proceeds - margin;
        *self
            .margin_accounts
            .entry(class)
            .or_default()
            .entry(asset.to_string())
            .or_insert(Decimal::ZERO) += margin;
        self.add_position(class, asset, -quantity);
        self.log(date, format!("shorted {quantity} {asset} ({class}) at {price}"));
        Ok(())
    }

    /// Cover `quantity` of an open short at `price`.
    ///
    /// Releases margin proportionally to the fraction of the outstanding
    /// short being covered, then buys the same quantity back at `price`.
    /// The margin account is deleted once its balance reaches zero.
    pub fn cover_short(
        &mut self,
        date: NaiveDate,
        class: AssetClass,
        asset: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<(), LedgerError> {
        self.check_date(date)?;
        Self::check_quantity(quantity)?;

        let margin_balance = self
            .margin_accounts
            .get(&class)
            .and_then(|m| m.get(asset))
            .copied()
            .ok_or_else(|| LedgerError::NoMarginAccount {
                class,
                asset: asset.to_string(),
            })?;

        let outstanding = -self.position(class, asset);
        if outstanding <= Decimal::ZERO || quantity > outstanding {
            return Err(LedgerError::InsufficientPosition {
                class,
                asset: asset.to_string(),
                held: -outstanding,
                requested: quantity,
            });
        }

        let cover_ratio = quantity / outstanding;
        let released = margin_balance * cover_ratio;

        // Pre-check the buy-back so the whole cover is atomic.
        let cost = price * quantity;
        if cost > self.cash + released {
            return Err(LedgerError::InsufficientFunds {
                needed: cost,
                available: self.cash + released,
            });
        }

        self.cash += released;
        let bucket = self
            .margin_accounts
            .entry(class)
            .or_default();
        if let Some(balance) = bucket.get_mut(asset) {
            *balance -= released;
            if balance.is_zero() {
                bucket.remove(asset);
            }
        }
        self.log(
            date,
            format!("released {released} margin covering {quantity} {asset} ({class})"),
        );

        self.buy(date, class, asset, price, quantity, Decimal::ONE)
    }

    /// Current signed position; zero if not held.
    pub fn position(&self, class: AssetClass, asset: &str) -> Decimal {
        self.positions
            .get(&class)
            .and_then(|m| m.get(asset))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Posted margin balance; zero if no margin account is open.
    pub fn margin_balance(&self, class: AssetClass, asset: &str) -> Decimal {
        self.margin_accounts
            .get(&class)
            .and_then(|m| m.get(asset))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Open (non-zero) positions.
    pub fn open_positions(&self) -> impl Iterator<Item = (AssetClass, &str, Decimal)> {
        self.positions.iter().flat_map(|(class, bucket)| {
            bucket
                .iter()
                .filter(|(_, q)| !q.is_zero())
                .map(|(asset, q)| (*class, asset.as_str(), *q))
        })
    }

    /// Asset classes with at least one open position.
    pub fn held_classes(&self) -> BTreeSet<AssetClass> {
        self.open_positions().map(|(class, _, _)| class).collect()
    }

    /// Mark-to-market value: `cash - liability + sum(quantity * price)`.
    ///
    /// Any held asset missing from the mark map is a fatal pricing gap.
    pub fn portfolio_value(&self, marks: &MarkMap) -> Result<Decimal, LedgerError> {
        let mut total = self.cash - self.cash_liability;
        for (class, asset, quantity) in self.open_positions() {
            let price = marks
                .get(class, asset)
                .ok_or_else(|| LedgerError::MissingMark {
                    class,
                    asset: asset.to_string(),
                })?;
            total += quantity * price;
        }
        Ok(total)
    }

    /// Value, NAV, and exposure recording for one simulated day, in that
    /// order. Called by the stepper exactly once per day.
    pub fn update(&mut self, marks: &MarkMap, primary_equity: &str) -> Result<(), LedgerError> {
        let value = self.portfolio_value(marks)?;
        self.value_history.push(value);
        self.nav_history
            .push(value / self.collateral_ratio / self.shares);

        let equity_quantity = self.position(AssetClass::Equity, primary_equity);
        let equity_exposure = if equity_quantity.is_zero() {
            Decimal::ZERO
        } else {
            let price = marks
                .get(AssetClass::Equity, primary_equity)
                .ok_or_else(|| LedgerError::MissingMark {
                    class: AssetClass::Equity,
                    asset: primary_equity.to_string(),
                })?;
            equity_quantity * price / self.nominal_value
        };
        self.equity_exposure_history.push(equity_exposure);
        self.cash_exposure_history.push(self.cash / self.nominal_value);
        Ok(())
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn cash_liability(&self) -> Decimal {
        self.cash_liability
    }

    pub fn nominal_value(&self) -> Decimal {
        self.nominal_value
    }

    pub fn shares(&self) -> Decimal {
        self.shares
    }

    pub fn collateral_ratio(&self) -> Decimal {
        self.collateral_ratio
    }

    pub fn target_weights(&self) -> &BTreeMap<AssetClass, Decimal> {
        &self.target_weights
    }

    pub fn calendar(&self) -> &[NaiveDate] {
        &self.calendar
    }

    /// Trade records for one day; empty for registered days without trades.
    pub fn transactions(&self, date: NaiveDate) -> &[String] {
        self.transaction_log
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn value_history(&self) -> &[Decimal] {
        &self.value_history
    }

    pub fn nav_history(&self) -> &[Decimal] {
        &self.nav_history
    }

    pub fn equity_exposure_history(&self) -> &[Decimal] {
        &self.equity_exposure_history
    }

    pub fn cash_exposure_history(&self) -> &[Decimal] {
        &self.cash_exposure_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn weights(entries: &[(AssetClass, Decimal)]) -> BTreeMap<AssetClass, Decimal> {
        entries.iter().copied().collect()
    }

    fn test_portfolio() -> Portfolio {
        let mut portfolio = Portfolio::new(
            dec!(1_000_000),
            dec!(1),
            &weights(&[
                (AssetClass::Equity, dec!(0.6)),
                (AssetClass::Cash, dec!(0.4)),
            ]),
        )
        .unwrap();
        portfolio.register_calendar(&dates()).unwrap();
        portfolio
    }

    fn dates() -> Vec<NaiveDate> {
        vec![
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
        ]
    }

    fn day() -> NaiveDate {
        dates()[0]
    }

    #[test]
    fn test_weights_must_sum_to_collateral_ratio() {
        let result = Portfolio::new(
            dec!(1_000_000),
            dec!(1.02),
            &weights(&[
                (AssetClass::Equity, dec!(0.6)),
                (AssetClass::Cash, dec!(0.4)),
            ]),
        );
        assert!(matches!(result, Err(LedgerError::InvalidWeights { .. })));
    }

    #[test]
    fn test_over_collateralized_initial_cash() {
        let portfolio = Portfolio::new(
            dec!(1_000_000),
            dec!(1.02),
            &weights(&[
                (AssetClass::Equity, dec!(0.6)),
                (AssetClass::Cash, dec!(0.42)),
            ]),
        )
        .unwrap();
        assert_eq!(portfolio.cash(), dec!(1_020_000));
        assert_eq!(portfolio.shares(), dec!(1_000_000));
    }

    #[test]
    fn test_calendar_registered_once() {
        let mut portfolio = test_portfolio();
        assert!(matches!(
            portfolio.register_calendar(&dates()),
            Err(LedgerError::CalendarAlreadyRegistered)
        ));
    }

    #[test]
    fn test_mutators_require_registered_date() {
        let mut portfolio = Portfolio::new(
            dec!(1000),
            dec!(1),
            &weights(&[(AssetClass::Cash, dec!(1))]),
        )
        .unwrap();
        let result = portfolio.buy(day(), AssetClass::Equity, "SPY", dec!(10), dec!(1), dec!(1));
        assert!(matches!(result, Err(LedgerError::CalendarNotRegistered)));

        portfolio.register_calendar(&dates()).unwrap();
        let unknown = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let result = portfolio.buy(unknown, AssetClass::Equity, "SPY", dec!(10), dec!(1), dec!(1));
        assert!(matches!(result, Err(LedgerError::UnregisteredDate(_))));
    }

    #[test]
    fn test_buy_cash_and_liability_math() {
        let mut portfolio = test_portfolio();
        portfolio
            .buy(day(), AssetClass::Equity, "SPY", dec!(500), dec!(1000), dec!(2))
            .unwrap();
        // notional 500_000, cash needed 250_000, liability 250_000
        assert_eq!(portfolio.cash(), dec!(750_000));
        assert_eq!(portfolio.cash_liability(), dec!(250_000));
        assert_eq!(portfolio.position(AssetClass::Equity, "SPY"), dec!(1000));
    }

    #[test]
    fn test_buy_then_full_sell_round_trip() {
        let mut portfolio = test_portfolio();
        let cash_before = portfolio.cash();
        portfolio
            .buy(day(), AssetClass::Equity, "SPY", dec!(543.21), dec!(100), dec!(1))
            .unwrap();
        portfolio
            .sell(day(), AssetClass::Equity, "SPY", dec!(543.21), dec!(100))
            .unwrap();
        assert_eq!(portfolio.cash(), cash_before);
        assert_eq!(portfolio.position(AssetClass::Equity, "SPY"), Decimal::ZERO);
        assert_eq!(portfolio.open_positions().count(), 0);
    }

    #[test]
    fn test_insufficient_funds_is_atomic() {
        let mut portfolio = test_portfolio();
        let cash_before = portfolio.cash();
        let result = portfolio.buy(
            day(),
            AssetClass::Equity,
            "SPY",
            dec!(2_000_000),
            dec!(1),
            dec!(1),
        );
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(portfolio.cash(), cash_before);
        assert_eq!(portfolio.position(AssetClass::Equity, "SPY"), Decimal::ZERO);
    }

    #[test]
    fn test_sell_more_than_held() {
        let mut portfolio = test_portfolio();
        portfolio
            .buy(day(), AssetClass::Equity, "SPY", dec!(100), dec!(5), dec!(1))
            .unwrap();
        let result = portfolio.sell(day(), AssetClass::Equity, "SPY", dec!(100), dec!(6));
        assert!(matches!(result, Err(LedgerError::InsufficientPosition { .. })));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut portfolio = test_portfolio();
        let result = portfolio.buy(day(), AssetClass::Equity, "SPY", dec!(10), dec!(0), dec!(1));
        assert!(matches!(result, Err(LedgerError::NonPositiveQuantity(_))));
        let result = portfolio.short(day(), AssetClass::Option, "X", dec!(10), dec!(-1), dec!(1));
        assert!(matches!(result, Err(LedgerError::NonPositiveQuantity(_))));
    }

    #[test]
    fn test_short_posts_margin_and_frees_excess() {
        let mut portfolio = test_portfolio();
        let cash_before = portfolio.cash();
        portfolio
            .short(day(), AssetClass::Option, "C101", dec!(0.50), dec!(100), dec!(2))
            .unwrap();
        // proceeds 50, margin 25, excess 25 added to cash
        assert_eq!(portfolio.cash(), cash_before + dec!(25));
        assert_eq!(portfolio.margin_balance(AssetClass::Option, "C101"), dec!(25));
        assert_eq!(portfolio.position(AssetClass::Option, "C101"), dec!(-100));
    }

    #[test]
    fn test_short_then_full_cover_round_trip() {
        let mut portfolio = test_portfolio();
        let cash_before = portfolio.cash();
        portfolio
            .short(day(), AssetClass::Option, "C101", dec!(0.50), dec!(100), dec!(1))
            .unwrap();
        portfolio
            .cover_short(day(), AssetClass::Option, "C101", dec!(0.50), dec!(100))
            .unwrap();
        assert_eq!(portfolio.cash(), cash_before);
        assert_eq!(portfolio.position(AssetClass::Option, "C101"), Decimal::ZERO);
        assert_eq!(
            portfolio.margin_balance(AssetClass::Option, "C101"),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_partial_cover_releases_margin_proportionally() {
        let mut portfolio = test_portfolio();
        portfolio
            .short(day(), AssetClass::Option, "C101", dec!(2), dec!(100), dec!(1))
            .unwrap();
        assert_eq!(portfolio.margin_balance(AssetClass::Option, "C101"), dec!(200));
        portfolio
            .cover_short(day(), AssetClass::Option, "C101", dec!(2), dec!(25))
            .unwrap();
        // 25/100 covered: 50 of 200 margin released
        assert_eq!(portfolio.margin_balance(AssetClass::Option, "C101"), dec!(150));
        assert_eq!(portfolio.position(AssetClass::Option, "C101"), dec!(-75));
    }

    #[test]
    fn test_cover_without_margin_account() {
        let mut portfolio = test_portfolio();
        let result = portfolio.cover_short(day(), AssetClass::Option, "C101", dec!(1), dec!(1));
        assert!(matches!(result, Err(LedgerError::NoMarginAccount { .. })));
    }

    #[test]
    fn test_portfolio_value_and_pricing_gap() {
        let mut portfolio = test_portfolio();
        portfolio
            .buy(day(), AssetClass::Equity, "SPY", dec!(500), dec!(1000), dec!(1))
            .unwrap();

        let mut marks = MarkMap::new();
        marks.insert(AssetClass::Equity, "SPY", dec!(510));
        let value = portfolio.portfolio_value(&marks).unwrap();
        // 1_000_000 - 500_000 cash spent + 510_000 marked
        assert_eq!(value, dec!(1_010_000));

        let empty = MarkMap::new();
        assert!(matches!(
            portfolio.portfolio_value(&empty),
            Err(LedgerError::MissingMark { .. })
        ));
    }

    #[test]
    fn test_update_appends_all_histories() {
        let mut portfolio = test_portfolio();
        portfolio
            .buy(day(), AssetClass::Equity, "SPY", dec!(400), dec!(1000), dec!(1))
            .unwrap();
        let mut marks = MarkMap::new();
        marks.insert(AssetClass::Equity, "SPY", dec!(400));
        portfolio.update(&marks, "SPY").unwrap();

        assert_eq!(portfolio.value_history(), &[dec!(1_000_000)]);
        assert_eq!(portfolio.nav_history(), &[dec!(1)]);
        assert_eq!(portfolio.equity_exposure_history(), &[dec!(0.4)]);
        assert_eq!(portfolio.cash_exposure_history(), &[dec!(0.6)]);
    }

    #[test]
    fn test_transaction_log_appends_in_order() {
        let mut portfolio = test_portfolio();
        portfolio
            .buy(day(), AssetClass::Equity, "SPY", dec!(100), dec!(1), dec!(1))
            .unwrap();
        portfolio
            .sell(day(), AssetClass::Equity, "SPY", dec!(100), dec!(1))
            .unwrap();
        let records = portfolio.transactions(day());
        assert_eq!(records.len(), 2);
        assert!(records[0].starts_with("bought"));
        assert!(records[1].starts_with("sold"));
        assert!(portfolio.transactions(dates()[1]).is_empty());
    }
}
