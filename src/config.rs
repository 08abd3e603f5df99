//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::settlement::RetryPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Settlement topic name (the dead-letter topic derives from it)
    pub settlement_topic: String,

    /// Number of settlement consumer workers
    pub settlement_workers: usize,

    /// Total settlement attempts per event
    pub retry_max_attempts: u32,

    /// Backoff before the second attempt, in milliseconds
    pub retry_base_delay_ms: u64,

    /// Backoff multiplier per failed attempt
    pub retry_multiplier: u32,

    /// Base URL of the currency quote service
    pub rate_api_url: String,

    /// Base URL of the external balance ledger
    pub balance_api_url: String,

    /// Request timeout for both gateways, in seconds
    pub gateway_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let settlement_topic = env::var("SETTLEMENT_TOPIC")
            .unwrap_or_else(|_| "fluxo.transactions".to_string());

        let settlement_workers = env::var("SETTLEMENT_WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SETTLEMENT_WORKERS"))?;

        let retry_max_attempts = env::var("SETTLEMENT_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SETTLEMENT_RETRY_ATTEMPTS"))?;

        let retry_base_delay_ms = env::var("SETTLEMENT_BACKOFF_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SETTLEMENT_BACKOFF_MS"))?;

        let retry_multiplier = env::var("SETTLEMENT_BACKOFF_MULTIPLIER")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SETTLEMENT_BACKOFF_MULTIPLIER"))?;

        let rate_api_url =
            env::var("RATE_API_URL").map_err(|_| ConfigError::MissingEnv("RATE_API_URL"))?;

        let balance_api_url = env::var("BALANCE_API_URL")
            .map_err(|_| ConfigError::MissingEnv("BALANCE_API_URL"))?;

        let gateway_timeout_secs = env::var("GATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("GATEWAY_TIMEOUT_SECS"))?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            settlement_topic,
            settlement_workers,
            retry_max_attempts,
            retry_base_delay_ms,
            retry_multiplier,
            rate_api_url,
            balance_api_url,
            gateway_timeout_secs,
        })
    }

    /// Retry policy for the settlement consumers
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            multiplier: self.retry_multiplier,
        }
    }

    /// Request timeout applied to both gateway clients
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
