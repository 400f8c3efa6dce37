//! Market data: core types, bar loading, and historical premium retrieval.

mod loader;
mod polygon;
mod types;

pub use loader::{load_bars, load_premium_table, LoaderError};
pub use polygon::{FetchOutcome, FetchSettings, PolygonClient, PolygonError, PriceField, Timespan};
pub use types::{option_ticker, DailyBar, OptionKind, OptionRequest};

use std::collections::HashMap;

use rust_decimal::Decimal;

/// Observed market premiums, consulted before falling back to the pricing
/// model. A `None` result is a per-request data-unavailable signal, never a
/// batch failure.
pub trait QuoteSource {
    fn premium(&self, request: &OptionRequest) -> Option<Decimal>;
}

/// In-memory table of observed open premiums, fully resolved before a run
/// starts.
#[derive(Debug, Clone, Default)]
pub struct PremiumTable {
    premiums: HashMap<OptionRequest, Decimal>,
}

impl PremiumTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, request: OptionRequest, premium: Decimal) {
        self.premiums.insert(request, premium);
    }

    pub fn len(&self) -> usize {
        self.premiums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.premiums.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionRequest, Decimal)> {
        self.premiums.iter().map(|(r, p)| (r, *p))
    }
}

impl QuoteSource for PremiumTable {
    fn premium(&self, request: &OptionRequest) -> Option<Decimal> {
        self.premiums.get(request).copied()
    }
}
