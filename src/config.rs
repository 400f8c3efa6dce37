//! Run configuration.
//!
//! All tunables live in one validated value object loaded from TOML and
//! passed to the ledger, strategies, and stepper at construction. Unknown
//! enum values (asset classes, rounding methods, strike policies) are
//! rejected when the file is parsed, not when they are first used.
//!
//! ```toml
//! underlying = "SPY"
//! nominal_value = 1000000
//! collateral_ratio = 1.0
//! equity_quantity = 1100
//! leverage = 1.0
//!
//! [weights]
//! equity = 0.6
//! cash = 0.4
//!
//! [model]
//! vol = 0.2
//! rate = 0.05
//! dividend_yield = 0.0
//! time_to_expiry = 0.0027397
//!
//! [strike_selection]
//! policy = "zero_cost_search"
//! lower_bound = -0.02
//! upper_bound = 0.02
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::portfolio::AssetClass;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("target weights sum to {got}, expected collateral ratio {expected}")]
    InvalidWeights { got: Decimal, expected: Decimal },

    #[error("leverage must be >= 1, got {0}")]
    InvalidLeverage(Decimal),

    #[error("nominal value must be positive, got {0}")]
    InvalidNominalValue(Decimal),

    #[error("strike band is inverted: lower_bound {lower} >= upper_bound {upper}")]
    InvalidBand { lower: f64, upper: f64 },

    #[error("model requires positive vol and time_to_expiry, got vol {vol}, time_to_expiry {time_to_expiry}")]
    InvalidModel { vol: f64, time_to_expiry: f64 },
}

/// Black-Scholes assumptions for theoretical pricing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Constant implied volatility assumption.
    pub vol: f64,
    /// Annualized risk-free rate.
    pub rate: f64,
    /// Annualized continuous dividend yield.
    pub dividend_yield: f64,
    /// Time to expiry in years; one calendar day for 0DTE.
    pub time_to_expiry: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vol: 0.2,
            rate: 0.05,
            dividend_yield: 0.0,
            time_to_expiry: 1.0 / 365.0,
        }
    }
}

/// Closed set of rounding methods for fixed-rule strikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    Floor,
    Ceil,
}

impl Rounding {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Floor => x.floor(),
            Self::Ceil => x.ceil(),
        }
    }
}

/// Static strike rule for one collar leg:
/// `strike = round(base * multiplier) + offset`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LegRule {
    pub multiplier: f64,
    pub rounding: Rounding,
    pub offset: f64,
}

impl LegRule {
    pub fn strike(&self, base: f64) -> f64 {
        self.rounding.apply(base * self.multiplier) + self.offset
    }
}

/// Strike selection policy; exactly one per run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum StrikeSelection {
    /// Enumerate integer strikes in the band around the open and pick the
    /// call/put pair whose net premium is closest to zero.
    ZeroCostSearch { lower_bound: f64, upper_bound: f64 },
    /// Derive each leg's strike directly from a static rule.
    FixedRule { call: LegRule, put: LegRule },
}

/// Complete configuration for one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Primary equity ticker, e.g. "SPY".
    pub underlying: String,
    /// Initial nominal capital; also the share count at $1 per share.
    pub nominal_value: Decimal,
    /// Initial cash = nominal value * collateral ratio.
    pub collateral_ratio: Decimal,
    /// Target weights per asset class; must sum to the collateral ratio.
    pub weights: BTreeMap<AssetClass, Decimal>,
    /// Shares of the underlying bought on day one and hedged daily.
    pub equity_quantity: Decimal,
    /// Leverage applied to the initial equity entry.
    pub leverage: Decimal,
    #[serde(default)]
    pub model: ModelConfig,
    pub strike_selection: StrikeSelection,
}

impl BacktestConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nominal_value <= Decimal::ZERO {
            return Err(ConfigError::InvalidNominalValue(self.nominal_value));
        }
        if self.leverage < Decimal::ONE {
            return Err(ConfigError::InvalidLeverage(self.leverage));
        }
        let weight_sum: Decimal = self.weights.values().copied().sum();
        if weight_sum != self.collateral_ratio {
            return Err(ConfigError::InvalidWeights {
                got: weight_sum,
                expected: self.collateral_ratio,
            });
        }
        if self.model.vol <= 0.0 || self.model.time_to_expiry <= 0.0 {
            return Err(ConfigError::InvalidModel {
                vol: self.model.vol,
                time_to_expiry: self.model.time_to_expiry,
            });
        }
        if let StrikeSelection::ZeroCostSearch {
            lower_bound,
            upper_bound,
        } = self.strike_selection
        {
            if lower_bound >= upper_bound {
                return Err(ConfigError::InvalidBand {
                    lower: lower_bound,
                    upper: upper_bound,
                });
            }
        }
        Ok(())
    }
}
