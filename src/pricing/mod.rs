//! Theoretical option pricing.

mod black_scholes;
mod chain;

pub use black_scholes::BlackScholes;
pub use chain::strike_band;
