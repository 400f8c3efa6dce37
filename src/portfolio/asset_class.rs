//! The closed set of asset classes the ledger accepts.
//!
//! Every mutator takes an `AssetClass`, so an invalid class cannot reach the
//! ledger at runtime: unknown values are rejected when configuration or
//! external input is parsed, not on every call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Asset class bucket for positions and margin accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Cash,
    #[serde(rename = "mmf")]
    MoneyMarket,
    Equity,
    Bond,
    Option,
}

impl AssetClass {
    /// All allowed asset classes, in bucket order.
    pub const ALL: [AssetClass; 5] = [
        Self::Cash,
        Self::MoneyMarket,
        Self::Equity,
        Self::Bond,
        Self::Option,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "mmf" | "moneymarket" => Some(Self::MoneyMarket),
            "equity" => Some(Self::Equity),
            "bond" => Some(Self::Bond),
            "option" => Some(Self::Option),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::MoneyMarket => "mmf",
            Self::Equity => "equity",
            Self::Bond => "bond",
            Self::Option => "option",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_class_parsing() {
        assert_eq!(AssetClass::from_str("cash"), Some(AssetClass::Cash));
        assert_eq!(AssetClass::from_str("MMF"), Some(AssetClass::MoneyMarket));
        assert_eq!(AssetClass::from_str("Equity"), Some(AssetClass::Equity));
        assert_eq!(AssetClass::from_str("option"), Some(AssetClass::Option));
        assert_eq!(AssetClass::from_str("real_estate"), None);
    }

    #[test]
    fn test_round_trip() {
        for class in AssetClass::ALL {
            assert_eq!(AssetClass::from_str(class.as_str()), Some(class));
        }
    }
}
