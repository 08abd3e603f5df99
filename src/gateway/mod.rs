//! External Service Gateways
//!
//! Thin clients for the two out-of-process collaborators: the currency
//! quote service and the externally-hosted balance ledger. Both are
//! consumed under a degrade-not-fail policy; the fallback decisions live
//! with the callers.

mod balance;
mod rates;

pub use balance::{BalanceSource, HttpBalanceSource, MemoryBalanceSource};
pub use rates::{HttpRateSource, RateSource};

/// Failures talking to an external service
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no quote available for {0}")]
    MissingQuote(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}
