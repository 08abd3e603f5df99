//! In-memory transaction store
//!
//! Mutex-guarded map behind the same trait as the Postgres store. Used by
//! the test suite and by single-process setups that run without a
//! database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};

use super::{StatusTransition, StoreError, TransactionStore};

/// Transaction store over a process-local map
#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    records: Mutex<HashMap<Uuid, Transaction>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, for assertions in tests.
    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("store lock poisoned")
            .insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transaction>, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("store lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn history(&self, account_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let mut matches: Vec<Transaction> = self
            .records
            .lock()
            .expect("store lock poisoned")
            .values()
            .filter(|tx| tx.involves(account_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn in_range(
        &self,
        account_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut matches: Vec<Transaction> = self
            .records
            .lock()
            .expect("store lock poisoned")
            .values()
            .filter(|tx| tx.involves(account_id) && tx.created_at >= from && tx.created_at <= to)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        to: TransactionStatus,
    ) -> Result<StatusTransition, StoreError> {
        debug_assert!(to.is_terminal(), "settlement only writes terminal statuses");

        let mut records = self.records.lock().expect("store lock poisoned");
        match records.get_mut(&id) {
            Some(tx) if tx.status.can_transition_to(to) => {
                tx.status = to;
                Ok(StatusTransition::Applied)
            }
            Some(_) => Ok(StatusTransition::AlreadyTerminal),
            None => Ok(StatusTransition::NotFound),
        }
    }
}
