//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Domain errors (4xx)
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            AppError::Domain(domain_err) => match domain_err {
                DomainError::InvalidAmount(e) => (
                    StatusCode::BAD_REQUEST,
                    "invalid_amount",
                    Some(e.to_string()),
                ),
                DomainError::RecipientRequired => {
                    (StatusCode::BAD_REQUEST, "recipient_required", None)
                }
                DomainError::SelfTransfer => {
                    (StatusCode::BAD_REQUEST, "self_transfer", None)
                }
                DomainError::AccountNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "account_not_found",
                    Some(id.to_string()),
                ),
                DomainError::TransactionNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "transaction_not_found",
                    Some(id.to_string()),
                ),
            },

            // 500 Internal Server Error: logged, never leaked beyond a code
            AppError::Store(e) => {
                tracing::error!("storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let response = AppError::Domain(DomainError::SelfTransfer).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::Domain(DomainError::RecipientRequired).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response =
            AppError::Domain(DomainError::AccountNotFound(Uuid::nil())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
