//! fluxo Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod directory;
pub mod domain;
pub mod gateway;
pub mod service;
pub mod settlement;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{
    Amount, AmountError, DomainError, Transaction, TransactionCategory, TransactionKind,
    TransactionStatus, LOCAL_CURRENCY,
};
pub use error::{AppError, AppResult};
