//! Common test fixtures
//!
//! In-memory seams and fault-injecting fakes wired through the same
//! traits the binary injects.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use fluxo::directory::MemoryAccountDirectory;
use fluxo::domain::{Transaction, TransactionStatus};
use fluxo::gateway::{BalanceSource, GatewayError, MemoryBalanceSource, RateSource};
use fluxo::service::TransactionService;
use fluxo::settlement::{
    BrokerQueues, EventPublisher, PublishError, SettlementBroker, SettlementEvent,
};
use fluxo::store::{MemoryTransactionStore, StatusTransition, StoreError, TransactionStore};

/// Rate source returning a fixed quote for any foreign currency
pub struct FixedRateSource(pub Decimal);

#[async_trait]
impl RateSource for FixedRateSource {
    async fn quote(&self, _currency: &str) -> Result<Decimal, GatewayError> {
        Ok(self.0)
    }
}

/// Rate source simulating a quote service outage
pub struct FailingRateSource;

#[async_trait]
impl RateSource for FailingRateSource {
    async fn quote(&self, currency: &str) -> Result<Decimal, GatewayError> {
        Err(GatewayError::Unavailable(format!(
            "quote service down for {currency}"
        )))
    }
}

/// Balance source simulating a ledger outage
pub struct FailingBalanceSource;

#[async_trait]
impl BalanceSource for FailingBalanceSource {
    async fn create_account(
        &self,
        _account_id: Uuid,
        _initial_balance: Decimal,
    ) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("ledger down".to_string()))
    }

    async fn fetch_balance(&self, _account_id: Uuid) -> Result<Decimal, GatewayError> {
        Err(GatewayError::Unavailable("ledger down".to_string()))
    }
}

/// Publisher whose broker is permanently gone
pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: SettlementEvent) -> Result<(), PublishError> {
        Err(PublishError::ChannelClosed)
    }
}

/// Store wrapper that fails every approval, counting the attempts.
/// Error-status writes pass through, so the dead-letter path still works.
pub struct ApprovalFailingStore {
    inner: MemoryTransactionStore,
    approve_attempts: AtomicU32,
}

impl ApprovalFailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryTransactionStore::new(),
            approve_attempts: AtomicU32::new(0),
        }
    }

    pub fn approve_attempts(&self) -> u32 {
        self.approve_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionStore for ApprovalFailingStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), StoreError> {
        self.inner.insert(transaction).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transaction>, StoreError> {
        self.inner.get(id).await
    }

    async fn history(&self, account_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        self.inner.history(account_id).await
    }

    async fn in_range(
        &self,
        account_id: Uuid,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        self.inner.in_range(account_id, from, to).await
    }

    async fn transition_status(
        &self,
        id: Uuid,
        to: TransactionStatus,
    ) -> Result<StatusTransition, StoreError> {
        if to == TransactionStatus::Approved {
            self.approve_attempts.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        self.inner.transition_status(id, to).await
    }
}

/// Everything a service-level test needs, wired over memory seams.
pub struct TestEnv {
    pub directory: Arc<MemoryAccountDirectory>,
    pub store: Arc<MemoryTransactionStore>,
    pub balances: Arc<MemoryBalanceSource>,
    pub broker: SettlementBroker,
    pub service: Arc<TransactionService>,
}

/// Build a service over in-memory seams with a fixed foreign-currency
/// quote. The returned queues feed a `ConsumerPool` when the test wants
/// the pipeline running.
pub fn test_env() -> (TestEnv, BrokerQueues) {
    let directory = Arc::new(MemoryAccountDirectory::new());
    let store = Arc::new(MemoryTransactionStore::new());
    let balances = Arc::new(MemoryBalanceSource::new());
    let (broker, queues) = SettlementBroker::new("fluxo.transactions.test");

    let service = Arc::new(TransactionService::new(
        directory.clone(),
        store.clone(),
        Arc::new(FixedRateSource(Decimal::new(525, 2))),
        balances.clone(),
        Arc::new(broker.clone()),
    ));

    (
        TestEnv {
            directory,
            store,
            balances,
            broker,
            service,
        },
        queues,
    )
}

/// Poll the store until the transaction reaches the wanted status.
/// Panics after the (virtual) deadline.
pub async fn wait_for_status(
    store: &dyn TransactionStore,
    id: Uuid,
    status: TransactionStatus,
) {
    for _ in 0..400 {
        if let Some(tx) = store.get(id).await.unwrap() {
            if tx.status == status {
                return;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    panic!("transaction {id} never reached {status:?}");
}
