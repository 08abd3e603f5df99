//! Transaction Service
//!
//! Facade over the injected seams: account directory, transaction store,
//! exchange-rate gateway, balance source, and settlement publisher. The
//! synchronous read/query surface lives here; the asynchronous half of
//! the lifecycle is the settlement pipeline.

use std::sync::Arc;

use crate::directory::AccountDirectory;
use crate::gateway::{BalanceSource, RateSource};
use crate::settlement::EventPublisher;
use crate::store::TransactionStore;

mod analytics;
mod register;
mod statement;

pub use analytics::{CategoryBucket, DailyBucket};
pub use register::NewTransaction;
pub use statement::{Statement, StatementEntry, TransferDirection};

/// Application service for the transaction lifecycle and its read models.
pub struct TransactionService {
    directory: Arc<dyn AccountDirectory>,
    store: Arc<dyn TransactionStore>,
    rates: Arc<dyn RateSource>,
    balances: Arc<dyn BalanceSource>,
    publisher: Arc<dyn EventPublisher>,
}

impl TransactionService {
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        store: Arc<dyn TransactionStore>,
        rates: Arc<dyn RateSource>,
        balances: Arc<dyn BalanceSource>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            directory,
            store,
            rates,
            balances,
            publisher,
        }
    }
}
