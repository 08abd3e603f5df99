//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;
use uuid::Uuid;

use super::AmountError;

/// Business rule violations and domain invariant failures.
///
/// Independent of the web and storage layers; `AppError` maps these to
/// HTTP statuses at the edge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Amount failed validation (zero, negative, malformed)
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Transfer registered without a recipient
    #[error("recipient required for transfers")]
    RecipientRequired,

    /// Transfer where sender and recipient are the same account
    #[error("sender and recipient must differ")]
    SelfTransfer,

    /// Account id does not resolve in the directory
    #[error("account not found: {0}")]
    AccountNotFound(Uuid),

    /// Transaction id does not resolve in the store
    #[error("transaction not found: {0}")]
    TransactionNotFound(Uuid),
}

impl DomainError {
    /// Check if this is a not-found error (404-equivalent)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::TransactionNotFound(_)
        )
    }
}
