//! Black-Scholes pricing collaborator.
//!
//! Pure and deterministic: premium from strike, spot, time-to-expiry,
//! volatility, rate, and dividend yield, plus the inverse problem (implied
//! volatility via Newton-Raphson). Prices at or past expiry collapse to
//! intrinsic value.

use std::f64::consts::PI;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::data::OptionKind;

/// Black-Scholes calculator with fixed rate and dividend-yield assumptions.
#[derive(Debug, Clone, Copy)]
pub struct BlackScholes {
    /// Annualized risk-free interest rate, continuously compounded.
    pub rate: f64,
    /// Annualized continuous dividend yield.
    pub dividend: f64,
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self {
            rate: 0.05,
            dividend: 0.0,
        }
    }
}

impl BlackScholes {
    pub fn new(rate: f64, dividend: f64) -> Self {
        Self { rate, dividend }
    }

    fn d1(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        let numerator =
            (spot / strike).ln() + (self.rate - self.dividend + 0.5 * vol * vol) * time;
        numerator / (vol * time.sqrt())
    }

    fn d2(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        self.d1(spot, strike, time, vol) - vol * time.sqrt()
    }

    fn norm_cdf(x: f64) -> f64 {
        let normal = Normal::new(0.0, 1.0).unwrap();
        normal.cdf(x)
    }

    fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
    }

    /// Call premium.
    pub fn call_price(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        if time <= 0.0 {
            return (spot - strike).max(0.0);
        }

        let d1 = self.d1(spot, strike, time, vol);
        let d2 = self.d2(spot, strike, time, vol);

        spot * (-self.dividend * time).exp() * Self::norm_cdf(d1)
            - strike * (-self.rate * time).exp() * Self::norm_cdf(d2)
    }

    /// Put premium.
    pub fn put_price(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        if time <= 0.0 {
            return (strike - spot).max(0.0);
        }

        let d1 = self.d1(spot, strike, time, vol);
        let d2 = self.d2(spot, strike, time, vol);

        strike * (-self.rate * time).exp() * Self::norm_cdf(-d2)
            - spot * (-self.dividend * time).exp() * Self::norm_cdf(-d1)
    }

    /// Premium for either kind.
    pub fn price(&self, spot: f64, strike: f64, time: f64, vol: f64, kind: OptionKind) -> f64 {
        match kind {
            OptionKind::Call => self.call_price(spot, strike, time, vol),
            OptionKind::Put => self.put_price(spot, strike, time, vol),
        }
    }

    /// Vectorized invocation over a strike array at a common spot/expiry.
    pub fn price_strikes(
        &self,
        spot: f64,
        strikes: &[f64],
        time: f64,
        vol: f64,
        kind: OptionKind,
    ) -> Vec<f64> {
        strikes
            .iter()
            .map(|&strike| self.price(spot, strike, time, vol, kind))
            .collect()
    }

    /// Implied volatility from an observed premium, via Newton-Raphson.
    pub fn implied_vol(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        price: f64,
        kind: OptionKind,
    ) -> Option<f64> {
        if time <= 0.0 || price <= 0.0 {
            return None;
        }

        // Brenner-Subrahmanyam starting guess
        let mut vol = (price / spot) * (2.0 * PI / time).sqrt();
        vol = vol.clamp(0.01, 5.0);

        let max_iter = 100;
        let tolerance = 1e-6;

        for _ in 0..max_iter {
            let calc_price = self.price(spot, strike, time, vol, kind);
            let diff = calc_price - price;

            if diff.abs() < tolerance {
                return Some(vol);
            }

            let vega = spot
                * (-self.dividend * time).exp()
                * Self::norm_pdf(self.d1(spot, strike, time, vol))
                * time.sqrt();

            if vega.abs() < 1e-10 {
                break;
            }

            vol -= diff / vega;
            vol = vol.clamp(0.001, 10.0);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_put_price() {
        // Reference value: K=95, T=0.25, S=100, vol=0.2, r=0.05
        let bs = BlackScholes::new(0.05, 0.0);
        let price = bs.put_price(100.0, 95.0, 0.25, 0.2);
        assert_relative_eq!(price, 1.5342604771222823, epsilon = 1e-9);
    }

    #[test]
    fn test_put_call_parity() {
        let bs = BlackScholes::new(0.05, 0.0);
        let (spot, strike, time, vol) = (100.0, 100.0, 1.0, 0.20);

        let call = bs.call_price(spot, strike, time, vol);
        let put = bs.put_price(spot, strike, time, vol);

        // C - P = S - K*e^(-rT)
        let parity_rhs = spot - strike * (-bs.rate * time).exp();
        assert_relative_eq!(call - put, parity_rhs, epsilon = 1e-9);
    }

    #[test]
    fn test_expired_options_are_intrinsic() {
        let bs = BlackScholes::default();
        assert_eq!(bs.call_price(105.0, 100.0, 0.0, 0.2), 5.0);
        assert_eq!(bs.put_price(105.0, 100.0, 0.0, 0.2), 0.0);
    }

    #[test]
    fn test_vectorized_matches_scalar() {
        let bs = BlackScholes::new(0.05, 0.0);
        let strikes = [95.0, 100.0, 105.0];
        let prices = bs.price_strikes(100.0, &strikes, 1.0 / 365.0, 0.2, OptionKind::Call);
        assert_eq!(prices.len(), 3);
        for (strike, price) in strikes.iter().zip(&prices) {
            assert_eq!(
                *price,
                bs.call_price(100.0, *strike, 1.0 / 365.0, 0.2)
            );
        }
    }

    #[test]
    fn test_implied_vol_round_trip() {
        let bs = BlackScholes::new(0.05, 0.0);
        let vol = 0.25;
        let price = bs.call_price(100.0, 100.0, 0.5, vol);

        let iv = bs
            .implied_vol(100.0, 100.0, 0.5, price, OptionKind::Call)
            .unwrap();
        assert_relative_eq!(iv, vol, epsilon = 1e-3);
    }
}
