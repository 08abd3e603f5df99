//! Statement and analytics tests

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use fluxo::directory::MemoryAccountDirectory;
use fluxo::domain::{
    Amount, DomainError, Transaction, TransactionCategory, TransactionKind, LOCAL_CURRENCY,
};
use fluxo::gateway::BalanceSource;
use fluxo::service::{TransactionService, TransferDirection};
use fluxo::store::{MemoryTransactionStore, TransactionStore};
use fluxo::AppError;

mod common;

use common::{test_env, FailingBalanceSource, FailingRateSource, FixedRateSource};

fn record(
    kind: TransactionKind,
    category: TransactionCategory,
    amount: Decimal,
    owner: Uuid,
    counterparty: Option<Uuid>,
    age: Duration,
) -> Transaction {
    let mut tx = Transaction::pending(
        Amount::new(amount).unwrap(),
        kind,
        category,
        owner,
        counterparty,
        Decimal::ONE,
        LOCAL_CURRENCY,
    )
    .unwrap();
    tx.created_at = Utc::now() - age;
    tx
}

#[tokio::test]
async fn statement_merges_balance_and_ordered_history() {
    let (env, _queues) = test_env();
    let owner = env.directory.add("Ana");
    let peer = env.directory.add("Bia");
    env.balances.create_account(owner, dec!(1234.56)).await.unwrap();

    let txs = vec![
        record(
            TransactionKind::Deposit,
            TransactionCategory::Salary,
            dec!(1000),
            owner,
            None,
            Duration::days(3),
        ),
        record(
            TransactionKind::Transfer,
            TransactionCategory::Other,
            dec!(150),
            owner,
            Some(peer),
            Duration::days(2),
        ),
        record(
            TransactionKind::Transfer,
            TransactionCategory::Other,
            dec!(70),
            peer,
            Some(owner),
            Duration::days(1),
        ),
        // Not visible to the owner at all
        record(
            TransactionKind::Purchase,
            TransactionCategory::Food,
            dec!(99),
            peer,
            None,
            Duration::days(1),
        ),
    ];
    for tx in &txs {
        env.store.insert(tx).await.unwrap();
    }

    let statement = env.service.statement(owner).await.unwrap();

    assert_eq!(statement.display_name, "Ana");
    assert_eq!(statement.balance, dec!(1234.56));
    assert_eq!(statement.entries.len(), 3);

    // Newest first
    assert_eq!(statement.entries[0].transaction.id, txs[2].id);
    assert_eq!(statement.entries[1].transaction.id, txs[1].id);
    assert_eq!(statement.entries[2].transaction.id, txs[0].id);

    // Direction decided by ids
    assert_eq!(
        statement.entries[0].direction,
        Some(TransferDirection::Received)
    );
    assert_eq!(statement.entries[1].direction, Some(TransferDirection::Sent));
    assert_eq!(statement.entries[2].direction, None);

    assert_eq!(statement.inflow, dec!(1070));
    assert_eq!(statement.outflow, dec!(150));
}

#[tokio::test]
async fn statement_for_unknown_account_is_not_found() {
    let (env, _queues) = test_env();

    let err = env.service.statement(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn balance_outage_degrades_to_zero() {
    let directory = Arc::new(MemoryAccountDirectory::new());
    let store = Arc::new(MemoryTransactionStore::new());
    let (env, _queues) = test_env();
    let service = TransactionService::new(
        directory.clone(),
        store.clone(),
        Arc::new(FailingRateSource),
        Arc::new(FailingBalanceSource),
        Arc::new(env.broker.clone()),
    );
    let owner = directory.add("Ana");

    assert_eq!(service.balance(owner).await, Decimal::ZERO);

    // The statement still composes instead of propagating the outage
    let statement = service.statement(owner).await.unwrap();
    assert_eq!(statement.balance, Decimal::ZERO);
}

#[tokio::test]
async fn empty_interval_yields_empty_buckets() {
    let (env, _queues) = test_env();
    let owner = env.directory.add("Ana");

    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();

    let daily = env
        .service
        .daily_analytics(owner, start, end)
        .await
        .unwrap();
    let categories = env
        .service
        .category_analytics(owner, start, end)
        .await
        .unwrap();

    assert!(daily.is_empty());
    assert!(categories.is_empty());
}

#[tokio::test]
async fn same_day_amounts_sum_into_one_bucket() {
    let (env, _queues) = test_env();
    let owner = env.directory.add("Ana");
    let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

    let mut morning = record(
        TransactionKind::Deposit,
        TransactionCategory::Other,
        dec!(100),
        owner,
        None,
        Duration::zero(),
    );
    morning.created_at = day.and_hms_opt(9, 0, 0).unwrap().and_utc();
    let mut evening = record(
        TransactionKind::Purchase,
        TransactionCategory::Food,
        dec!(50),
        owner,
        None,
        Duration::zero(),
    );
    evening.created_at = day.and_hms_opt(20, 30, 0).unwrap().and_utc();

    env.store.insert(&morning).await.unwrap();
    env.store.insert(&evening).await.unwrap();

    let daily = env
        .service
        .daily_analytics(owner, day - Duration::days(1), day)
        .await
        .unwrap();

    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].date, day);
    assert_eq!(daily[0].total, dec!(150));
}

#[tokio::test]
async fn daily_buckets_ascend_and_respect_window() {
    let (env, _queues) = test_env();
    let owner = env.directory.add("Ana");
    let today = Utc::now().date_naive();

    for (amount, days_ago) in [(dec!(10), 5), (dec!(20), 3), (dec!(30), 1)] {
        env.store
            .insert(&record(
                TransactionKind::Deposit,
                TransactionCategory::Other,
                amount,
                owner,
                None,
                Duration::days(days_ago),
            ))
            .await
            .unwrap();
    }

    // Window excludes the 5-day-old record
    let daily = env
        .service
        .daily_analytics(owner, today - Duration::days(4), today)
        .await
        .unwrap();

    assert_eq!(daily.len(), 2);
    assert!(daily[0].date < daily[1].date);
    assert_eq!(daily[0].total, dec!(20));
    assert_eq!(daily[1].total, dec!(30));
}

#[tokio::test]
async fn category_buckets_group_amounts() {
    let (env, _queues) = test_env();
    let owner = env.directory.add("Ana");
    let today = Utc::now().date_naive();

    let entries = [
        (TransactionCategory::Food, dec!(40)),
        (TransactionCategory::Food, dec!(60)),
        (TransactionCategory::Transport, dec!(25)),
    ];
    for (category, amount) in entries {
        env.store
            .insert(&record(
                TransactionKind::Purchase,
                category,
                amount,
                owner,
                None,
                Duration::hours(1),
            ))
            .await
            .unwrap();
    }

    let buckets = env
        .service
        .category_analytics(owner, today - Duration::days(1), today)
        .await
        .unwrap();

    assert_eq!(buckets.len(), 2);
    let food = buckets
        .iter()
        .find(|b| b.category == TransactionCategory::Food)
        .unwrap();
    let transport = buckets
        .iter()
        .find(|b| b.category == TransactionCategory::Transport)
        .unwrap();
    assert_eq!(food.total, dec!(100));
    assert_eq!(transport.total, dec!(25));
}

#[tokio::test]
async fn counterparty_history_counts_toward_analytics() {
    let (env, _queues) = test_env();
    let owner = env.directory.add("Ana");
    let peer = env.directory.add("Bia");
    let today = Utc::now().date_naive();

    // Incoming transfer: owner is only the counterparty
    env.store
        .insert(&record(
            TransactionKind::Transfer,
            TransactionCategory::Other,
            dec!(80),
            peer,
            Some(owner),
            Duration::hours(1),
        ))
        .await
        .unwrap();

    let daily = env
        .service
        .daily_analytics(owner, today - Duration::days(1), today)
        .await
        .unwrap();

    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].total, dec!(80));
}

// The fixed-quote seam keeps this suite deterministic
#[tokio::test]
async fn fixture_rate_source_sanity() {
    use fluxo::gateway::RateSource;

    let rates = FixedRateSource(dec!(5.25));
    assert_eq!(rates.quote("USD").await.unwrap(), dec!(5.25));
}
