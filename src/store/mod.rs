//! Transaction Store
//!
//! Persistence seam for transaction records. The trait is injected into
//! every component that touches the store; nothing in the crate holds
//! process-wide storage state.
//!
//! `transition_status` is the single write path for settlement: it applies
//! the status state machine atomically, so a record that already reached a
//! terminal state can never be overwritten, no matter how many consumers
//! race on the same id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};

mod memory;
mod postgres;

pub use memory::MemoryTransactionStore;
pub use postgres::PgTransactionStore;

/// Storage failures surfaced to callers
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a guarded status write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// The record was Pending and now carries the requested status
    Applied,
    /// The record already reached a terminal status; nothing was written
    AlreadyTerminal,
    /// No record with that id exists
    NotFound,
}

/// Persistent record of all transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist a freshly registered transaction.
    async fn insert(&self, transaction: &Transaction) -> Result<(), StoreError>;

    /// Load a single transaction by id.
    async fn get(&self, id: Uuid) -> Result<Option<Transaction>, StoreError>;

    /// Full history where the account appears as owner or counterparty,
    /// newest first.
    async fn history(&self, account_id: Uuid) -> Result<Vec<Transaction>, StoreError>;

    /// Transactions involving the account inside the inclusive timestamp
    /// window, oldest first.
    async fn in_range(
        &self,
        account_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Atomically move a Pending record to the given terminal status.
    ///
    /// The read-check-write happens as one operation; callers learn
    /// whether their write applied, hit an already-terminal record, or
    /// targeted a missing id.
    async fn transition_status(
        &self,
        id: Uuid,
        to: TransactionStatus,
    ) -> Result<StatusTransition, StoreError>;
}
