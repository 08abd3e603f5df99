//! Transaction record and settlement status state machine
//!
//! A transaction is created Pending by registration and moved to a
//! terminal status only by the settlement pipeline. Identity and
//! monetary fields are immutable after creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Amount, DomainError};

/// Currency assumed when a registration carries no explicit code.
/// Local-currency transactions always record an exchange rate of exactly 1.
pub const LOCAL_CURRENCY: &str = "BRL";

/// Kind of monetary movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Purchase,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "deposit"),
            TransactionKind::Withdrawal => write!(f, "withdrawal"),
            TransactionKind::Purchase => write!(f, "purchase"),
            TransactionKind::Transfer => write!(f, "transfer"),
        }
    }
}

impl From<String> for TransactionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "deposit" => TransactionKind::Deposit,
            "withdrawal" => TransactionKind::Withdrawal,
            "purchase" => TransactionKind::Purchase,
            _ => TransactionKind::Transfer,
        }
    }
}

/// Spending category, defaults to Other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    Food,
    Transport,
    Leisure,
    Health,
    Education,
    Salary,
    #[default]
    Other,
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionCategory::Food => write!(f, "food"),
            TransactionCategory::Transport => write!(f, "transport"),
            TransactionCategory::Leisure => write!(f, "leisure"),
            TransactionCategory::Health => write!(f, "health"),
            TransactionCategory::Education => write!(f, "education"),
            TransactionCategory::Salary => write!(f, "salary"),
            TransactionCategory::Other => write!(f, "other"),
        }
    }
}

impl From<String> for TransactionCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "food" => TransactionCategory::Food,
            "transport" => TransactionCategory::Transport,
            "leisure" => TransactionCategory::Leisure,
            "health" => TransactionCategory::Health,
            "education" => TransactionCategory::Education,
            "salary" => TransactionCategory::Salary,
            _ => TransactionCategory::Other,
        }
    }
}

/// Settlement status.
///
/// Pending is the sole initial state; Approved and Error are terminal.
/// No transition out of a terminal state is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Error,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Whether the state machine permits moving to `next` from here.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(self, TransactionStatus::Pending) && next.is_terminal()
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Approved => write!(f, "approved"),
            TransactionStatus::Error => write!(f, "error"),
        }
    }
}

impl From<String> for TransactionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "approved" => TransactionStatus::Approved,
            "error" => TransactionStatus::Error,
            _ => TransactionStatus::Pending,
        }
    }
}

/// A recorded monetary movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: TransactionCategory,
    pub owner_id: Uuid,
    /// Present only for transfers, never equal to the owner
    pub counterparty_id: Option<Uuid>,
    /// Rate applied at creation: 1 for local currency, 0 when the quote
    /// service degraded
    pub exchange_rate: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build a new Pending transaction, enforcing the counterparty
    /// invariant: set if and only if the kind is Transfer, and distinct
    /// from the owner.
    ///
    /// Non-transfer kinds discard any counterparty they were given.
    pub fn pending(
        amount: Amount,
        kind: TransactionKind,
        category: TransactionCategory,
        owner_id: Uuid,
        counterparty_id: Option<Uuid>,
        exchange_rate: Decimal,
        currency: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let counterparty_id = match kind {
            TransactionKind::Transfer => {
                let recipient = counterparty_id.ok_or(DomainError::RecipientRequired)?;
                if recipient == owner_id {
                    return Err(DomainError::SelfTransfer);
                }
                Some(recipient)
            }
            _ => None,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            amount: amount.value(),
            kind,
            category,
            owner_id,
            counterparty_id,
            exchange_rate,
            currency: currency.into(),
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Whether the account appears on this record as owner or counterparty.
    pub fn involves(&self, account_id: Uuid) -> bool {
        self.owner_id == account_id || self.counterparty_id == Some(account_id)
    }
}
