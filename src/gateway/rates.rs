//! Exchange rate gateway
//!
//! Client for the external currency-quote service. Registration consults
//! it once per foreign-currency transaction and records rate 0 on any
//! failure; retries are deliberately absent here.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use super::GatewayError;

/// Source of currency quotes.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Current rate for the given currency code against the local currency.
    async fn quote(&self, currency: &str) -> Result<Decimal, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    rate: Decimal,
}

/// HTTP client for the quote service
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateSource {
    /// Build a client with a finite request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn quote(&self, currency: &str) -> Result<Decimal, GatewayError> {
        let url = format!("{}/rates/{}", self.base_url, currency);
        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<QuoteResponse>()
            .await?;

        Ok(response.rate)
    }
}
