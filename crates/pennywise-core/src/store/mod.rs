//! Transaction store abstraction
//!
//! # Architecture
//!
//! - `TransactionStore` trait: blocking row-store interface used by the
//!   insight service, server handlers, and CLI commands
//! - `StoreClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backends: `SqliteStore` (persistent), `MemoryStore` (demo and test fixture)
//!
//! The backend is chosen once from [`Config`](crate::config::Config) and
//! handed to whoever needs it. Nothing here is a global.

mod memory;
mod sqlite;

pub use memory::{MemoryStore, DEMO_SAVINGS_BALANCE};
pub use sqlite::{DbConn, DbPool, SqliteStore};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use crate::models::{Account, NewAccount, NewTransaction, Transaction};

/// Counts from one batch import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows already present (same import hash)
    pub skipped: usize,
}

/// Interface shared by all transaction stores
///
/// Implementations must be Send + Sync so one handle can serve concurrent
/// requests.
pub trait TransactionStore: Send + Sync {
    /// Transactions for a user, newest first, optionally bounded by
    /// inclusive calendar dates
    fn list_transactions(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;

    fn get_transaction(&self, user_id: &str, id: &str) -> Result<Option<Transaction>>;

    /// Insert a transaction, returning its id, or `None` when a transaction
    /// with the same import hash already exists for the user
    fn insert_transaction(&self, user_id: &str, tx: &NewTransaction) -> Result<Option<String>>;

    /// Insert a batch of transactions all-or-nothing
    ///
    /// Duplicates are skipped and counted. If any row fails, nothing from
    /// the batch is kept.
    fn import_transactions(&self, user_id: &str, txs: &[NewTransaction]) -> Result<ImportSummary>;

    fn count_transactions(&self, user_id: &str) -> Result<i64>;

    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>>;

    /// Create or update an account matched by name, returning its id
    fn upsert_account(&self, user_id: &str, account: &NewAccount) -> Result<String>;

    /// Check that the store can serve queries
    fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

/// Store client wrapper
///
/// Provides a concrete type that can be cloned into handler state while
/// dispatching to the configured backend.
#[derive(Clone)]
pub enum StoreClient {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl StoreClient {
    /// Build the store selected by configuration
    ///
    /// The memory backend comes pre-seeded with demo data.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let client = match config.backend {
            StoreBackend::Sqlite => Self::Sqlite(SqliteStore::open(&config.path)?),
            StoreBackend::Memory => Self::Memory(MemoryStore::demo()),
        };
        info!(backend = client.backend_name(), "Transaction store ready");
        Ok(client)
    }

    fn inner(&self) -> &dyn TransactionStore {
        match self {
            Self::Sqlite(s) => s,
            Self::Memory(m) => m,
        }
    }
}

impl TransactionStore for StoreClient {
    fn list_transactions(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        self.inner().list_transactions(user_id, from, to)
    }

    fn get_transaction(&self, user_id: &str, id: &str) -> Result<Option<Transaction>> {
        self.inner().get_transaction(user_id, id)
    }

    fn insert_transaction(&self, user_id: &str, tx: &NewTransaction) -> Result<Option<String>> {
        self.inner().insert_transaction(user_id, tx)
    }

    fn import_transactions(&self, user_id: &str, txs: &[NewTransaction]) -> Result<ImportSummary> {
        self.inner().import_transactions(user_id, txs)
    }

    fn count_transactions(&self, user_id: &str) -> Result<i64> {
        self.inner().count_transactions(user_id)
    }

    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        self.inner().list_accounts(user_id)
    }

    fn upsert_account(&self, user_id: &str, account: &NewAccount) -> Result<String> {
        self.inner().upsert_account(user_id, account)
    }

    fn health_check(&self) -> bool {
        self.inner().health_check()
    }

    fn backend_name(&self) -> &'static str {
        self.inner().backend_name()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_memory_is_seeded() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            path: String::new(),
        };
        let store = StoreClient::from_config(&config).unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(store.count_transactions(crate::models::DEFAULT_USER_ID).unwrap() > 0);
    }

    #[test]
    fn test_from_config_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: StoreBackend::Sqlite,
            path: dir.path().join("p.db").to_string_lossy().into_owned(),
        };
        let store = StoreClient::from_config(&config).unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        contract::exercise(&store);
    }
}
