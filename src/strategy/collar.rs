//! Daily 0DTE zero-cost collar overlay.
//!
//! Each day, independently of prior days: pick a call strike and a put
//! strike around the open, short the call and buy the put sized to the
//! equity position currently held, then settle both legs at the close.
//! No leg ever survives into the next day; contracts are identified by
//! their OCC-style ticker, which embeds the expiration date.

use rust_decimal::Decimal;
use tracing::debug;

use crate::backtest::BacktestError;
use crate::config::{ModelConfig, StrikeSelection};
use crate::data::{option_ticker, DailyBar, OptionKind, OptionRequest, QuoteSource};
use crate::portfolio::{AssetClass, Portfolio};
use crate::pricing::{strike_band, BlackScholes};
use crate::{analytics::closest_zero_sum_pair, strategy::Strategy};

/// One day's collar: selected strikes, net premium at the open, and net
/// settlement at the close.
#[derive(Debug, Clone)]
pub struct CollarRecord {
    pub date: chrono::NaiveDate,
    pub call_strike: Decimal,
    pub put_strike: Decimal,
    /// Put premium paid minus call premium received.
    pub net_cost: Decimal,
    /// Put settlement received minus call settlement paid.
    pub net_payoff: Decimal,
}

impl CollarRecord {
    /// Option-leg P&L for the day, excluding the underlying.
    pub fn pnl(&self) -> Decimal {
        self.net_payoff - self.net_cost
    }
}

pub struct ZeroCostCollar {
    underlying: String,
    selection: StrikeSelection,
    model: BlackScholes,
    vol: f64,
    time_to_expiry: f64,
    quotes: Option<Box<dyn QuoteSource>>,
    model_priced: Vec<OptionRequest>,
    records: Vec<CollarRecord>,
}

impl ZeroCostCollar {
    pub fn new(
        underlying: impl Into<String>,
        selection: StrikeSelection,
        model: &ModelConfig,
    ) -> Self {
        Self {
            underlying: underlying.into(),
            selection,
            model: BlackScholes::new(model.rate, model.dividend_yield),
            vol: model.vol,
            time_to_expiry: model.time_to_expiry,
            quotes: None,
            model_priced: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Attach observed market premiums, consulted before the model.
    pub fn with_quote_source(mut self, quotes: Box<dyn QuoteSource>) -> Self {
        self.quotes = Some(quotes);
        self
    }

    /// Contracts that had to be priced by the model because no observed
    /// premium was available. Empty when no quote source is attached.
    pub fn model_priced(&self) -> &[OptionRequest] {
        &self.model_priced
    }

    /// Per-day collar records, in calendar order.
    pub fn records(&self) -> &[CollarRecord] {
        &self.records
    }

    /// Observed premium where available, theoretical premium otherwise.
    /// The substitution is recorded as a diagnostic, never an error.
    fn premium(&mut self, request: OptionRequest, spot: f64) -> Decimal {
        if let Some(quotes) = &self.quotes {
            if let Some(premium) = quotes.premium(&request) {
                return premium;
            }
            self.model_priced.push(request.clone());
        }
        let strike: f64 = request.strike.try_into().unwrap_or(0.0);
        let premium = self
            .model
            .price(spot, strike, self.time_to_expiry, self.vol, request.kind);
        Decimal::from_f64_retain(premium).unwrap_or_default()
    }

    fn request(&self, day: &DailyBar, strike: Decimal, kind: OptionKind) -> OptionRequest {
        OptionRequest {
            date: day.date,
            strike,
            kind,
        }
    }

    /// Pick the day's strikes and their opening premiums.
    fn select_legs(
        &mut self,
        day: &DailyBar,
        open: f64,
    ) -> Result<(Decimal, Decimal, Decimal, Decimal), BacktestError> {
        match self.selection {
            StrikeSelection::FixedRule { call, put } => {
                let call_strike = Decimal::from_f64_retain(call.strike(open))
                    .unwrap_or_default();
                let put_strike = Decimal::from_f64_retain(put.strike(open)).unwrap_or_default();
                let call_open =
                    self.premium(self.request(day, call_strike, OptionKind::Call), open);
                let put_open = self.premium(self.request(day, put_strike, OptionKind::Put), open);
                Ok((call_strike, put_strike, call_open, put_open))
            }
            StrikeSelection::ZeroCostSearch {
                lower_bound,
                upper_bound,
            } => {
                let strikes = strike_band(open, lower_bound, upper_bound);
                if strikes.is_empty() {
                    return Err(BacktestError::NoCandidateStrikes(day.date));
                }

                let mut call_premiums = Vec::with_capacity(strikes.len());
                let mut put_premiums = Vec::with_capacity(strikes.len());
                for &strike in &strikes {
                    let strike = Decimal::from(strike);
                    call_premiums
                        .push(self.premium(self.request(day, strike, OptionKind::Call), open));
                    put_premiums
                        .push(self.premium(self.request(day, strike, OptionKind::Put), open));
                }

                // The call leg is short, so its premium enters negated: the
                // minimal |put - call| pair is the zero-cost collar.
                let negated_calls: Vec<f64> = call_premiums
                    .iter()
                    .map(|p| -f64::try_from(*p).unwrap_or(0.0))
                    .collect();
                let puts: Vec<f64> = put_premiums
                    .iter()
                    .map(|p| f64::try_from(*p).unwrap_or(0.0))
                    .collect();

                let (call_idx, put_idx) = closest_zero_sum_pair(&negated_calls, &puts)
                    .ok_or(BacktestError::NoCandidateStrikes(day.date))?;

                Ok((
                    Decimal::from(strikes[call_idx]),
                    Decimal::from(strikes[put_idx]),
                    call_premiums[call_idx],
                    put_premiums[put_idx],
                ))
            }
        }
    }
}

impl Strategy for ZeroCostCollar {
    fn name(&self) -> &'static str {
        "zero_cost_collar_0dte"
    }

    fn execute(
        &mut self,
        day: &DailyBar,
        portfolio: &mut Portfolio,
    ) -> Result<(), BacktestError> {
        // The collar hedges exactly the held share count.
        let hedged = portfolio.position(AssetClass::Equity, &self.underlying);
        if hedged <= Decimal::ZERO {
            debug!(date = %day.date, "no equity held, skipping collar");
            return Ok(());
        }

        let open: f64 = day.open.try_into().unwrap_or(0.0);
        let (call_strike, put_strike, call_open, put_open) = self.select_legs(day, open)?;

        let call_id = option_ticker(&self.underlying, day.date, OptionKind::Call, call_strike);
        let put_id = option_ticker(&self.underlying, day.date, OptionKind::Put, put_strike);

        // Open both legs at the open.
        portfolio.short(
            day.date,
            AssetClass::Option,
            &call_id,
            call_open,
            hedged,
            Decimal::ONE,
        )?;
        portfolio.buy(
            day.date,
            AssetClass::Option,
            &put_id,
            put_open,
            hedged,
            Decimal::ONE,
        )?;

        // Settle both legs at the close; 0DTE contracts expire today.
        let call_settle = (day.close - call_strike).max(Decimal::ZERO);
        let put_settle = (put_strike - day.close).max(Decimal::ZERO);
        portfolio.sell(day.date, AssetClass::Option, &put_id, put_settle, hedged)?;
        portfolio.cover_short(day.date, AssetClass::Option, &call_id, call_settle, hedged)?;

        self.records.push(CollarRecord {
            date: day.date,
            call_strike,
            put_strike,
            net_cost: put_open - call_open,
            net_payoff: put_settle - call_settle,
        });
        Ok(())
    }
}
