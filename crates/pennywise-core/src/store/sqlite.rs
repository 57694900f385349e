//! SQLite transaction store with connection pooling and migrations

use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info, warn};

use super::{ImportSummary, TransactionStore};
use crate::error::Result;
use crate::models::{Account, Balances, NewAccount, NewTransaction, Transaction};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

const TRANSACTION_COLUMNS: &str =
    "id, account_id, date, name, merchant_name, amount, category, pending";

const ACCOUNT_COLUMNS: &str =
    "id, name, account_type, subtype, balance_available, balance_current, iso_currency_code, mask, institution";

/// SQLite store wrapper with connection pooling
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl SqliteStore {
    /// Open (or create) a database file and run migrations
    pub fn open(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let store = Self {
            pool,
            db_path: path.to_string(),
        };
        store.run_migrations()?;

        info!(path, "Opened SQLite store");
        Ok(store)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so every pooled
    /// connection sees the same database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "pennywise_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::open(&path.to_string_lossy())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                account_type TEXT NOT NULL,
                subtype TEXT,
                balance_available REAL,
                balance_current REAL NOT NULL,
                iso_currency_code TEXT NOT NULL DEFAULT 'USD',
                mask TEXT,
                institution TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(user_id, name)
            );

            -- category holds a JSON array of labels, first one authoritative
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                account_id TEXT,
                date DATE NOT NULL,
                name TEXT NOT NULL,
                merchant_name TEXT,
                amount REAL NOT NULL,
                category TEXT NOT NULL DEFAULT '[]',
                pending INTEGER NOT NULL DEFAULT 0,
                import_hash TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(user_id, import_hash)
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);
            "#,
        )?;

        debug!("Migrations complete");
        Ok(())
    }

    /// Column order: see `TRANSACTION_COLUMNS`
    fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let id: i64 = row.get(0)?;
        let date_str: String = row.get(2)?;
        let category_json: String = row.get(6)?;
        let pending: i64 = row.get(7)?;

        let category = serde_json::from_str(&category_json).unwrap_or_else(|e| {
            warn!(id, error = %e, "Unreadable category column");
            Vec::new()
        });

        Ok(Transaction {
            id: id.to_string(),
            account_id: row.get(1)?,
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            name: row.get(3)?,
            merchant_name: row.get(4)?,
            amount: row.get(5)?,
            category,
            pending: pending != 0,
        })
    }

    /// Column order: see `ACCOUNT_COLUMNS`
    fn row_to_account(row: &rusqlite::Row) -> rusqlite::Result<Account> {
        let id: i64 = row.get(0)?;
        Ok(Account {
            id: id.to_string(),
            name: row.get(1)?,
            account_type: row.get(2)?,
            subtype: row.get(3)?,
            balances: Balances {
                available: row.get(4)?,
                current: row.get(5)?,
                iso_currency_code: row.get(6)?,
            },
            mask: row.get(7)?,
            institution: row.get(8)?,
        })
    }
}

/// Insert one row, returning `None` for a duplicate import hash
fn insert_row(
    conn: &rusqlite::Connection,
    user_id: &str,
    tx: &NewTransaction,
) -> Result<Option<String>> {
    let category = serde_json::to_string(&tx.category)?;

    let inserted = conn.execute(
        r#"
        INSERT OR IGNORE INTO transactions
            (user_id, account_id, date, name, merchant_name, amount, category, pending, import_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            user_id,
            tx.account_id,
            tx.date.to_string(),
            tx.name,
            tx.merchant_name,
            tx.amount,
            category,
            tx.pending as i64,
            tx.import_hash,
        ],
    )?;

    if inserted == 0 {
        debug!(hash = %tx.import_hash, "Skipped duplicate transaction");
        return Ok(None); // Duplicate, skip
    }

    Ok(Some(conn.last_insert_rowid().to_string()))
}

impl TransactionStore for SqliteStore {
    fn list_transactions(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = vec!["user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id.to_string())];

        if let Some(from) = from {
            conditions.push("date >= ?".to_string());
            params.push(Box::new(from.to_string()));
        }
        if let Some(to) = to {
            conditions.push("date <= ?".to_string());
            params.push(Box::new(to.to_string()));
        }

        let sql = format!(
            "SELECT {} FROM transactions WHERE {} ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS,
            conditions.join(" AND ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let transactions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    fn get_transaction(&self, user_id: &str, id: &str) -> Result<Option<Transaction>> {
        let Ok(id) = id.parse::<i64>() else {
            return Ok(None);
        };

        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE id = ? AND user_id = ?",
            TRANSACTION_COLUMNS
        );
        let transaction = conn
            .query_row(&sql, params![id, user_id], Self::row_to_transaction)
            .optional()?;

        Ok(transaction)
    }

    fn insert_transaction(&self, user_id: &str, tx: &NewTransaction) -> Result<Option<String>> {
        let conn = self.conn()?;
        insert_row(&conn, user_id, tx)
    }

    fn import_transactions(&self, user_id: &str, txs: &[NewTransaction]) -> Result<ImportSummary> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;

        let mut summary = ImportSummary::default();
        for tx in txs {
            match insert_row(&db_tx, user_id, tx)? {
                Some(_) => summary.imported += 1,
                None => summary.skipped += 1,
            }
        }

        db_tx.commit()?;
        Ok(summary)
    }

    fn count_transactions(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM accounts WHERE user_id = ? ORDER BY name",
            ACCOUNT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let accounts = stmt
            .query_map(params![user_id], Self::row_to_account)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    fn upsert_account(&self, user_id: &str, account: &NewAccount) -> Result<String> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO accounts (user_id, name, account_type, subtype, balance_available, balance_current)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, name) DO UPDATE SET
                account_type = excluded.account_type,
                subtype = excluded.subtype,
                balance_available = excluded.balance_available,
                balance_current = excluded.balance_current
            "#,
            params![
                user_id,
                account.name,
                account.account_type,
                account.subtype,
                account.balance,
                account.balance,
            ],
        )?;

        let id: i64 = conn.query_row(
            "SELECT id FROM accounts WHERE user_id = ? AND name = ?",
            params![user_id, account.name],
            |row| row.get(0),
        )?;
        Ok(id.to_string())
    }

    fn health_check(&self) -> bool {
        self.conn()
            .and_then(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
            .is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract;
    use super::*;

    #[test]
    fn test_sqlite_contract() {
        let store = SqliteStore::in_memory().unwrap();
        contract::exercise(&store);
    }

    #[test]
    fn test_import_rolls_back_on_failure() {
        let store = SqliteStore::in_memory().unwrap();
        let mut bad = contract::new_tx("2024-01-02", "Broken", -1.0, &[]);
        // NaN binds as NULL and violates the amount column constraint
        bad.amount = f64::NAN;
        let batch = [contract::new_tx("2024-01-01", "Gym", -30.0, &[]), bad];

        assert!(store.import_transactions("u1", &batch).is_err());
        assert_eq!(store.count_transactions("u1").unwrap(), 0);

        let summary = store.import_transactions("u1", &batch[..1]).unwrap();
        assert_eq!(summary.imported, 1);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let path = path.to_string_lossy();

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert_transaction("u1", &contract::new_tx("2024-01-01", "Gym", -30.0, &[]))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count_transactions("u1").unwrap(), 1);
        assert_eq!(store.path(), path);
    }

    #[test]
    fn test_category_round_trips_order() {
        let store = SqliteStore::in_memory().unwrap();
        let tx = contract::new_tx(
            "2024-01-01",
            "Netflix",
            -15.99,
            &["Entertainment", "Subscriptions"],
        );
        let id = store.insert_transaction("u1", &tx).unwrap().unwrap();
        let fetched = store.get_transaction("u1", &id).unwrap().unwrap();
        assert_eq!(fetched.category, vec!["Entertainment", "Subscriptions"]);
        assert_eq!(fetched.merchant_name.as_deref(), Some("Netflix"));
    }
}
