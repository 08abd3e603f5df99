//! Period analytics
//!
//! Aggregations over a closed date interval, restricted to transactions
//! where the account is owner or counterparty. Pure reads; an empty
//! window yields an empty result.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionCategory};
use crate::error::AppError;

use super::TransactionService;

/// Summed amounts for one calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// Summed amounts for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBucket {
    pub category: TransactionCategory,
    pub total: Decimal,
}

impl TransactionService {
    /// Daily totals inside [start, end], ascending by date.
    pub async fn daily_analytics(
        &self,
        account_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBucket>, AppError> {
        tracing::info!(%account_id, %start, %end, "building daily analytics");

        let transactions = self.in_window(account_id, start, end).await?;

        let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for tx in &transactions {
            *buckets.entry(tx.created_at.date_naive()).or_default() += tx.amount;
        }

        Ok(buckets
            .into_iter()
            .map(|(date, total)| DailyBucket { date, total })
            .collect())
    }

    /// Category totals inside [start, end]. No ordering guarantee.
    pub async fn category_analytics(
        &self,
        account_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CategoryBucket>, AppError> {
        let transactions = self.in_window(account_id, start, end).await?;

        let mut buckets: HashMap<TransactionCategory, Decimal> = HashMap::new();
        for tx in &transactions {
            *buckets.entry(tx.category).or_default() += tx.amount;
        }

        Ok(buckets
            .into_iter()
            .map(|(category, total)| CategoryBucket { category, total })
            .collect())
    }

    async fn in_window(
        &self,
        account_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>, AppError> {
        let from = start.and_time(NaiveTime::MIN).and_utc();
        let to = end_of_day(end);

        Ok(self.store.in_range(account_id, from, to).await?)
    }
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .expect("end of day is a valid time")
        .and_utc()
}
