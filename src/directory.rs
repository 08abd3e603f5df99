//! Account Directory
//!
//! Accounts are owned by an external identity service; transactions
//! reference them by id only. The directory resolves an id to a display
//! reference and nothing more; account lifecycle is not managed here.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::store::StoreError;

/// Weak reference to an externally-owned account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub id: Uuid,
    pub display_name: String,
}

/// Lookup of externally-owned accounts by id.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<AccountRef>, StoreError>;
}

/// Directory reading the externally-managed users table (read-only).
#[derive(Debug, Clone)]
pub struct PgAccountDirectory {
    pool: PgPool,
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn find(&self, id: Uuid) -> Result<Option<AccountRef>, StoreError> {
        let row: Option<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT id, COALESCE(display_name, username) AS display_name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, display_name)| AccountRef { id, display_name }))
    }
}

/// Process-local directory for tests and database-free setups.
#[derive(Debug, Default)]
pub struct MemoryAccountDirectory {
    accounts: Mutex<HashMap<Uuid, AccountRef>>,
}

impl MemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and return its generated id.
    pub fn add(&self, display_name: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.accounts
            .lock()
            .expect("directory lock poisoned")
            .insert(
                id,
                AccountRef {
                    id,
                    display_name: display_name.into(),
                },
            );
        id
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccountDirectory {
    async fn find(&self, id: Uuid) -> Result<Option<AccountRef>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .expect("directory lock poisoned")
            .get(&id)
            .cloned())
    }
}
