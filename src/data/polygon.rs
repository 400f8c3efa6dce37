//! Polygon.io client for observed 0DTE option premiums.
//!
//! Retrieves the first aggregate bar of the contract's expiration day and
//! reads the configured price field from it (the "price at market open").
//! Batch retrieval runs under a bounded worker pool; a contract with no
//! data degrades to an unavailable entry instead of failing the batch, so
//! the caller can fall back to theoretical pricing per contract.

use std::sync::Arc;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use super::types::{option_ticker, OptionRequest};
use super::PremiumTable;

const BASE_URL: &str = "https://api.polygon.io";

#[derive(Error, Debug)]
pub enum PolygonError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error: {0}")]
    Api(String),

    #[error("no data available for {ticker}")]
    DataUnavailable { ticker: String },
}

/// Bar duration unit for aggregate requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timespan {
    Second,
    Minute,
    Hour,
    Day,
}

impl Timespan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

/// Which price of the opening bar counts as the premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    /// Volume-weighted average price of the bar.
    Vwap,
}

/// Parameters for premium retrieval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Duration of the opening bar, in `timespan` units.
    pub bar_multiplier: u32,
    pub timespan: Timespan,
    pub price_field: PriceField,
    /// Worker-pool cap for batch retrieval.
    pub concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            bar_multiplier: 3,
            timespan: Timespan::Second,
            price_field: PriceField::Vwap,
            concurrency: 8,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AggResponse {
    #[serde(default)]
    results: Vec<AggBar>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "vw", default)]
    vwap: Option<f64>,
}

/// Result of a batch fetch: resolved premiums plus the requests for which no
/// market data exists (to be priced by the model instead).
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub premiums: PremiumTable,
    pub unavailable: Vec<OptionRequest>,
}

/// Polygon.io REST client.
#[derive(Debug, Clone)]
pub struct PolygonClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PolygonClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Observed premium of one 0DTE contract at market open.
    pub async fn open_premium(
        &self,
        underlying: &str,
        request: &OptionRequest,
        settings: &FetchSettings,
    ) -> Result<Decimal, PolygonError> {
        let ticker = option_ticker(underlying, request.date, request.kind, request.strike);
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/{}/{}/{}/{}",
            self.base_url,
            ticker,
            settings.bar_multiplier,
            settings.timespan.as_str(),
            request.date,
            request.date,
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("sort", "asc"),
                ("limit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: AggResponse = response.json().await?;
        let bar = body
            .results
            .first()
            .ok_or_else(|| PolygonError::DataUnavailable {
                ticker: ticker.clone(),
            })?;

        let price = match settings.price_field {
            PriceField::Open => Some(bar.open),
            PriceField::High => Some(bar.high),
            PriceField::Low => Some(bar.low),
            PriceField::Close => Some(bar.close),
            PriceField::Vwap => bar.vwap,
        }
        .ok_or_else(|| PolygonError::DataUnavailable {
            ticker: ticker.clone(),
        })?;

        Decimal::from_f64_retain(price)
            .ok_or_else(|| PolygonError::Api(format!("non-finite premium for {ticker}")))
    }

    /// Fetch a batch of contracts under a bounded worker pool.
    ///
    /// Per-contract failures (no data, timeouts, transport errors) are
    /// collected as unavailable; only the caller decides what to do with
    /// them. `on_done` is invoked once per completed request, for progress
    /// reporting.
    pub async fn fetch_premiums(
        &self,
        underlying: &str,
        requests: &[OptionRequest],
        settings: &FetchSettings,
        mut on_done: impl FnMut(),
    ) -> FetchOutcome {
        let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for request in requests {
            let client = self.clone();
            let underlying = underlying.to_string();
            let request = request.clone();
            let settings = *settings;
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // Closed only if the semaphore is dropped, which cannot
                // happen while tasks hold a clone.
                let _permit = semaphore.acquire().await;
                let result = client.open_premium(&underlying, &request, &settings).await;
                (request, result)
            });
        }

        let mut outcome = FetchOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            on_done();
            let Ok((request, result)) = joined else {
                continue;
            };
            match result {
                Ok(premium) => outcome.premiums.insert(request, premium),
                Err(err) => {
                    warn!(
                        date = %request.date,
                        strike = %request.strike,
                        kind = request.kind.as_str(),
                        "premium unavailable, will fall back to model: {err}"
                    );
                    outcome.unavailable.push(request);
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fetch_settings() {
        let settings = FetchSettings::default();
        assert_eq!(settings.bar_multiplier, 3);
        assert_eq!(settings.timespan, Timespan::Second);
        assert_eq!(settings.price_field, PriceField::Vwap);
    }

    #[test]
    fn test_timespan_strings() {
        assert_eq!(Timespan::Second.as_str(), "second");
        assert_eq!(Timespan::Day.as_str(), "day");
    }
}
