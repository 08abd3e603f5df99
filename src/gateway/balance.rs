//! External balance source
//!
//! Client for the externally-hosted balance ledger. The ledger stores one
//! record per account; an account with no record reads as balance 0.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use super::GatewayError;

/// Externally-sourced account balances.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Provision a ledger record with an initial balance. Callers treat
    /// this as fire-and-forget and swallow failures after logging.
    async fn create_account(
        &self,
        account_id: Uuid,
        initial_balance: Decimal,
    ) -> Result<(), GatewayError>;

    /// Stored balance for the account; 0 when no record exists.
    async fn fetch_balance(&self, account_id: Uuid) -> Result<Decimal, GatewayError>;
}

/// Wire shape of a ledger record
#[derive(Debug, Serialize, Deserialize)]
struct LedgerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    account_id: Uuid,
    balance: Decimal,
}

/// HTTP client for the balance ledger
#[derive(Debug, Clone)]
pub struct HttpBalanceSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBalanceSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl BalanceSource for HttpBalanceSource {
    async fn create_account(
        &self,
        account_id: Uuid,
        initial_balance: Decimal,
    ) -> Result<(), GatewayError> {
        let record = LedgerRecord {
            id: None,
            account_id,
            balance: initial_balance,
        };

        self.client
            .post(format!("{}/balances", self.base_url))
            .json(&record)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn fetch_balance(&self, account_id: Uuid) -> Result<Decimal, GatewayError> {
        let records = self
            .client
            .get(format!("{}/balances", self.base_url))
            .query(&[("account_id", account_id.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<LedgerRecord>>()
            .await?;

        // The ledger keeps at most one record per account; absent means zero.
        Ok(records
            .first()
            .map(|record| record.balance)
            .unwrap_or(Decimal::ZERO))
    }
}

/// Process-local balance ledger for tests and database-free setups.
#[derive(Debug, Default)]
pub struct MemoryBalanceSource {
    balances: Mutex<HashMap<Uuid, Decimal>>,
}

impl MemoryBalanceSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceSource for MemoryBalanceSource {
    async fn create_account(
        &self,
        account_id: Uuid,
        initial_balance: Decimal,
    ) -> Result<(), GatewayError> {
        self.balances
            .lock()
            .expect("ledger lock poisoned")
            .insert(account_id, initial_balance);
        Ok(())
    }

    async fn fetch_balance(&self, account_id: Uuid) -> Result<Decimal, GatewayError> {
        Ok(self
            .balances
            .lock()
            .expect("ledger lock poisoned")
            .get(&account_id)
            .copied()
            .unwrap_or(Decimal::ZERO))
    }
}
