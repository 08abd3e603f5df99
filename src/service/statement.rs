//! Statement composition
//!
//! Merges the externally-sourced balance with the full local history into
//! a read-only view. Transfer direction is decided by account id
//! comparison; display names never participate, so name collisions
//! cannot misattribute a movement.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::directory::AccountRef;
use crate::domain::{DomainError, Transaction, TransactionKind};
use crate::error::AppError;

use super::TransactionService;

/// Which side of a transfer the statement owner is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Sent,
    Received,
}

/// One history line of a statement
#[derive(Debug, Clone, Serialize)]
pub struct StatementEntry {
    pub transaction: Transaction,
    /// Present only for transfers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<TransferDirection>,
}

/// Composed, non-persisted view of an account's money
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub account_id: Uuid,
    pub display_name: String,
    /// Externally-sourced current balance
    pub balance: Decimal,
    /// Total of deposits and received transfers in the history
    pub inflow: Decimal,
    /// Total of withdrawals, purchases, and sent transfers
    pub outflow: Decimal,
    /// Newest first
    pub entries: Vec<StatementEntry>,
}

impl TransactionService {
    /// Externally-sourced balance for the account; 0 when the ledger is
    /// unreachable or holds no record.
    pub async fn balance(&self, account_id: Uuid) -> Decimal {
        self.fetch_balance_or_zero(account_id).await
    }

    /// Compose the statement for an account.
    pub async fn statement(&self, account_id: Uuid) -> Result<Statement, AppError> {
        let account = self
            .directory
            .find(account_id)
            .await?
            .ok_or(DomainError::AccountNotFound(account_id))?;

        let balance = self.fetch_balance_or_zero(account_id).await;
        let history = self.store.history(account_id).await?;

        Ok(compose_statement(account, balance, history))
    }

    pub(super) async fn fetch_balance_or_zero(&self, account_id: Uuid) -> Decimal {
        match self.balances.fetch_balance(account_id).await {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!(
                    %account_id,
                    error = %e,
                    "balance source unavailable, reporting 0"
                );
                Decimal::ZERO
            }
        }
    }
}

fn compose_statement(
    account: AccountRef,
    balance: Decimal,
    history: Vec<Transaction>,
) -> Statement {
    let mut inflow = Decimal::ZERO;
    let mut outflow = Decimal::ZERO;

    let entries = history
        .into_iter()
        .map(|tx| {
            let direction = match tx.kind {
                TransactionKind::Transfer => Some(if tx.owner_id == account.id {
                    TransferDirection::Sent
                } else {
                    TransferDirection::Received
                }),
                _ => None,
            };

            match (tx.kind, direction) {
                (TransactionKind::Deposit, _) => inflow += tx.amount,
                (TransactionKind::Withdrawal | TransactionKind::Purchase, _) => {
                    outflow += tx.amount
                }
                (TransactionKind::Transfer, Some(TransferDirection::Sent)) => {
                    outflow += tx.amount
                }
                (TransactionKind::Transfer, _) => inflow += tx.amount,
            }

            StatementEntry {
                transaction: tx,
                direction,
            }
        })
        .collect();

    Statement {
        account_id: account.id,
        display_name: account.display_name,
        balance,
        inflow,
        outflow,
        entries,
    }
}
