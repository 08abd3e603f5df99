//! Settlement event payload

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionCategory, TransactionKind, TransactionStatus};

/// Full snapshot of a transaction as handed to the broker.
///
/// Consumers treat the stored record, not this snapshot, as the source of
/// truth; the id is what they act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementEvent {
    pub transaction_id: Uuid,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: TransactionCategory,
    pub owner_id: Uuid,
    pub counterparty_id: Option<Uuid>,
    pub exchange_rate: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for SettlementEvent {
    fn from(tx: &Transaction) -> Self {
        Self {
            transaction_id: tx.id,
            amount: tx.amount,
            kind: tx.kind,
            category: tx.category,
            owner_id: tx.owner_id,
            counterparty_id: tx.counterparty_id,
            exchange_rate: tx.exchange_rate,
            currency: tx.currency.clone(),
            status: tx.status,
            created_at: tx.created_at,
        }
    }
}
