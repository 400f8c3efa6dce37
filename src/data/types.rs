//! Core market-data types.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Option kind (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }

    /// Single-letter code used in OCC-style option tickers.
    pub fn letter(&self) -> char {
        match self {
            Self::Call => 'C',
            Self::Put => 'P',
        }
    }
}

/// Daily OHLCV bar for the underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

/// One option contract to price or retrieve: expiration date (same as the
/// trade date for 0DTE), strike, and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionRequest {
    pub date: NaiveDate,
    pub strike: Decimal,
    pub kind: OptionKind,
}

/// OCC-style option ticker, e.g. `O:SPY240620C00550000`.
///
/// The expiration date makes the ticker unique per day, so same-strike
/// contracts opened on different days never alias each other in the
/// position map.
pub fn option_ticker(
    underlying: &str,
    date: NaiveDate,
    kind: OptionKind,
    strike: Decimal,
) -> String {
    let scaled = (strike * dec!(1000)).trunc().to_i64().unwrap_or(0);
    format!(
        "O:{}{}{}{:08}",
        underlying.to_uppercase(),
        date.format("%y%m%d"),
        kind.letter(),
        scaled
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_kind_parsing() {
        assert_eq!(OptionKind::from_str("C"), Some(OptionKind::Call));
        assert_eq!(OptionKind::from_str("put"), Some(OptionKind::Put));
        assert_eq!(OptionKind::from_str("CALL"), Some(OptionKind::Call));
        assert_eq!(OptionKind::from_str("X"), None);
    }

    #[test]
    fn test_option_ticker_format() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        assert_eq!(
            option_ticker("spy", date, OptionKind::Call, dec!(550)),
            "O:SPY240620C00550000"
        );
        assert_eq!(
            option_ticker("SPY", date, OptionKind::Put, dec!(549.5)),
            "O:SPY240620P00549500"
        );
    }

    #[test]
    fn test_tickers_differ_across_days() {
        let strike = dec!(550);
        let a = option_ticker(
            "SPY",
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            OptionKind::Call,
            strike,
        );
        let b = option_ticker(
            "SPY",
            NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
            OptionKind::Call,
            strike,
        );
        assert_ne!(a, b);
    }
}
