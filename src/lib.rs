pub mod analytics;
pub mod backtest;
pub mod config;
pub mod data;
pub mod portfolio;
pub mod pricing;
pub mod report;
pub mod strategy;

// Re-export commonly used types
pub use analytics::closest_zero_sum_pair;
pub use backtest::{Backtest, BacktestError};
pub use config::{BacktestConfig, LegRule, ModelConfig, Rounding, StrikeSelection};
pub use data::{DailyBar, OptionKind, OptionRequest, PremiumTable, QuoteSource};
pub use portfolio::{AssetClass, LedgerError, MarkMap, Portfolio};
pub use pricing::BlackScholes;
pub use strategy::{BuyAndHold, CollarOverlay, CollarRecord, Strategy, ZeroCostCollar};
