//! Transaction registration
//!
//! Validates the input, resolves the parties, records the exchange rate,
//! persists the transaction as Pending, and hands it to the settlement
//! pipeline. The durable write decides the caller's result; dispatch is
//! best-effort.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Amount, DomainError, Transaction, TransactionCategory, TransactionKind, LOCAL_CURRENCY,
};
use crate::error::AppError;
use crate::settlement::SettlementEvent;

use super::TransactionService;

/// Registration input
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub owner_id: Uuid,
    pub category: Option<TransactionCategory>,
    pub counterparty_id: Option<Uuid>,
    pub currency: Option<String>,
}

impl TransactionService {
    /// Register a transaction and return the persisted record.
    pub async fn register(&self, input: NewTransaction) -> Result<Transaction, AppError> {
        tracing::info!(
            kind = %input.kind,
            owner_id = %input.owner_id,
            currency = input.currency.as_deref().unwrap_or(LOCAL_CURRENCY),
            "registering transaction"
        );

        let amount = Amount::new(input.amount).map_err(DomainError::from)?;

        self.directory
            .find(input.owner_id)
            .await?
            .ok_or(DomainError::AccountNotFound(input.owner_id))?;

        let counterparty_id = self.resolve_counterparty(&input).await?;

        let currency = input
            .currency
            .unwrap_or_else(|| LOCAL_CURRENCY.to_string());
        let exchange_rate = self.resolve_rate(&currency).await;

        let transaction = Transaction::pending(
            amount,
            input.kind,
            input.category.unwrap_or_default(),
            input.owner_id,
            counterparty_id,
            exchange_rate,
            currency,
        )?;

        self.store.insert(&transaction).await?;
        self.dispatch(&transaction).await;

        Ok(transaction)
    }

    /// Apply the transfer rules: recipient required, distinct from the
    /// owner, and resolvable. Any other kind carries no counterparty,
    /// whatever the input said.
    async fn resolve_counterparty(
        &self,
        input: &NewTransaction,
    ) -> Result<Option<Uuid>, AppError> {
        if input.kind != TransactionKind::Transfer {
            return Ok(None);
        }

        let recipient = input
            .counterparty_id
            .ok_or(DomainError::RecipientRequired)?;

        if recipient == input.owner_id {
            return Err(DomainError::SelfTransfer.into());
        }

        self.directory
            .find(recipient)
            .await?
            .ok_or(DomainError::AccountNotFound(recipient))?;

        Ok(Some(recipient))
    }

    /// Resolve the exchange rate for the given currency code.
    ///
    /// Local currency short-circuits to exactly 1 without a gateway call.
    /// Any quote failure records rate 0 and lets the registration proceed;
    /// a quote outage never blocks recording a movement.
    async fn resolve_rate(&self, currency: &str) -> Decimal {
        if currency.eq_ignore_ascii_case(LOCAL_CURRENCY) {
            return Decimal::ONE;
        }

        match self.rates.quote(currency).await {
            Ok(rate) => rate,
            Err(e) => {
                tracing::warn!(
                    currency,
                    error = %e,
                    "quote lookup failed, recording rate 0"
                );
                Decimal::ZERO
            }
        }
    }

    /// Best-effort settlement dispatch. Failures are logged and never
    /// surfaced; the record stays Pending until external reconciliation.
    async fn dispatch(&self, transaction: &Transaction) {
        match self.publisher.publish(SettlementEvent::from(transaction)).await {
            Ok(()) => {
                tracing::info!(transaction_id = %transaction.id, "settlement event dispatched");
            }
            Err(e) => {
                tracing::error!(
                    transaction_id = %transaction.id,
                    error = %e,
                    "settlement dispatch failed, record remains pending"
                );
            }
        }
    }
}
