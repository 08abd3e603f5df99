//! Domain Model
//!
//! Core types of the transaction ledger: validated amounts, the
//! transaction record itself, and the settlement status state machine.
//! Everything here is infrastructure-free.

mod amount;
mod error;
mod transaction;

pub use amount::{Amount, AmountError};
pub use error::DomainError;
pub use transaction::{
    Transaction, TransactionCategory, TransactionKind, TransactionStatus, LOCAL_CURRENCY,
};
