//! Postgres-backed transaction store
//!
//! One durable row per transaction, keyed by id, indexed for the
//! owner-or-counterparty and time-range queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};

use super::{StatusTransition, StoreError, TransactionStore};

/// Transaction store over a Postgres pool
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the transactions table
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    amount: Decimal,
    kind: String,
    category: String,
    owner_id: Uuid,
    counterparty_id: Option<Uuid>,
    exchange_rate: Decimal,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            amount: row.amount,
            kind: row.kind.into(),
            category: row.category.into(),
            owner_id: row.owner_id,
            counterparty_id: row.counterparty_id,
            exchange_rate: row.exchange_rate,
            currency: row.currency,
            status: row.status.into(),
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, amount, kind, category, owner_id, counterparty_id, \
     exchange_rate, currency, status, created_at";

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, amount, kind, category, owner_id, counterparty_id,
                exchange_rate, currency, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.amount)
        .bind(transaction.kind.to_string())
        .bind(transaction.category.to_string())
        .bind(transaction.owner_id)
        .bind(transaction.counterparty_id)
        .bind(transaction.exchange_rate)
        .bind(&transaction.currency)
        .bind(transaction.status.to_string())
        .bind(transaction.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transaction>, StoreError> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Transaction::from))
    }

    async fn history(&self, account_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM transactions
            WHERE owner_id = $1 OR counterparty_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn in_range(
        &self,
        account_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM transactions
            WHERE (owner_id = $1 OR counterparty_id = $1)
              AND created_at BETWEEN $2 AND $3
            ORDER BY created_at ASC
            "#
        ))
        .bind(account_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        to: TransactionStatus,
    ) -> Result<StatusTransition, StoreError> {
        debug_assert!(to.is_terminal(), "settlement only writes terminal statuses");

        // Conditional update: the WHERE clause is the state-machine guard,
        // evaluated atomically on the row.
        let updated = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $2
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(to.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 1 {
            return Ok(StatusTransition::Applied);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM transactions WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Ok(StatusTransition::AlreadyTerminal)
        } else {
            Ok(StatusTransition::NotFound)
        }
    }
}
