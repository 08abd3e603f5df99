//! API Routes
//!
//! HTTP endpoint definitions, mapped 1:1 onto the service facade.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionCategory, TransactionKind};
use crate::error::AppError;
use crate::service::{CategoryBucket, DailyBucket, NewTransaction, Statement, TransactionService};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterTransactionRequest {
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub owner_id: Uuid,
    #[serde(default)]
    pub category: Option<TransactionCategory>,
    #[serde(default)]
    pub counterparty_id: Option<Uuid>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl From<RegisterTransactionRequest> for NewTransaction {
    fn from(request: RegisterTransactionRequest) -> Self {
        NewTransaction {
            amount: request.amount,
            kind: request.kind,
            owner_id: request.owner_id,
            category: request.category,
            counterparty_id: request.counterparty_id,
            currency: request.currency,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: Uuid,
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<Arc<TransactionService>> {
    Router::new()
        .route("/transactions", post(register_transaction))
        .route("/accounts/:account_id/balance", get(get_balance))
        .route("/accounts/:account_id/statement", get(get_statement))
        .route("/accounts/:account_id/analytics/daily", get(get_daily_analytics))
        .route(
            "/accounts/:account_id/analytics/categories",
            get(get_category_analytics),
        )
}

/// Register a transaction; settlement happens out of band
async fn register_transaction(
    State(service): State<Arc<TransactionService>>,
    Json(request): Json<RegisterTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let transaction = service.register(request.into()).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Externally-sourced balance for an account
async fn get_balance(
    State(service): State<Arc<TransactionService>>,
    Path(account_id): Path<Uuid>,
) -> Json<BalanceResponse> {
    let balance = service.balance(account_id).await;
    Json(BalanceResponse {
        account_id,
        balance,
    })
}

/// Composed statement: external balance plus full history
async fn get_statement(
    State(service): State<Arc<TransactionService>>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Statement>, AppError> {
    Ok(Json(service.statement(account_id).await?))
}

/// Daily totals over a closed date interval
async fn get_daily_analytics(
    State(service): State<Arc<TransactionService>>,
    Path(account_id): Path<Uuid>,
    Query(window): Query<AnalyticsQuery>,
) -> Result<Json<Vec<DailyBucket>>, AppError> {
    Ok(Json(
        service
            .daily_analytics(account_id, window.start, window.end)
            .await?,
    ))
}

/// Category totals over a closed date interval
async fn get_category_analytics(
    State(service): State<Arc<TransactionService>>,
    Path(account_id): Path<Uuid>,
    Query(window): Query<AnalyticsQuery>,
) -> Result<Json<Vec<CategoryBucket>>, AppError> {
    Ok(Json(
        service
            .category_analytics(account_id, window.start, window.end)
            .await?,
    ))
}
