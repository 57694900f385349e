//! In-memory store used for demos and tests

use std::sync::{Arc, RwLock};

use chrono::{Duration, NaiveDate, Utc};

use super::{ImportSummary, TransactionStore};
use crate::error::{Error, Result};
use crate::import::compute_import_hash;
use crate::models::{Account, Balances, NewAccount, NewTransaction, Transaction, DEFAULT_USER_ID};

/// Balance of the seeded savings account
pub const DEMO_SAVINGS_BALANCE: f64 = 15000.0;

const DEMO_CHECKING_BALANCE: f64 = 9580.0;

struct StoredTransaction {
    user_id: String,
    import_hash: String,
    transaction: Transaction,
}

struct StoredAccount {
    user_id: String,
    account: Account,
}

#[derive(Default)]
struct Inner {
    transactions: Vec<StoredTransaction>,
    accounts: Vec<StoredAccount>,
    next_id: u64,
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn insert(&mut self, user_id: &str, tx: &NewTransaction) -> Option<String> {
        if self
            .transactions
            .iter()
            .any(|s| s.user_id == user_id && s.import_hash == tx.import_hash)
        {
            return None;
        }

        let id = self.next_id("tx");
        self.transactions.push(StoredTransaction {
            user_id: user_id.to_string(),
            import_hash: tx.import_hash.clone(),
            transaction: Transaction {
                id: id.clone(),
                account_id: tx.account_id.clone(),
                amount: tx.amount,
                date: tx.date,
                name: tx.name.clone(),
                merchant_name: tx.merchant_name.clone(),
                category: tx.category.clone(),
                pending: tx.pending,
            },
        });
        Some(id)
    }
}

/// Thread-safe in-memory store
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded for the default user, dated relative to today
    pub fn demo() -> Self {
        Self::demo_for(DEFAULT_USER_ID, Utc::now().date_naive())
    }

    /// Create a seeded store for a given user and reference date
    pub fn demo_for(user_id: &str, today: NaiveDate) -> Self {
        let store = Self::new();

        let seed: [(i64, &str, f64, &[&str], &str); 9] = [
            (0, "Starbucks", -4.85, &["Food & Drink"], "Starbucks"),
            (1, "Amazon", -32.99, &["Shopping"], "Amazon"),
            (3, "Salary Deposit", 2250.0, &["Income"], "Employer"),
            (5, "Whole Foods Market", -86.40, &["Food & Drink"], "Whole Foods"),
            (9, "Netflix Subscription", -15.49, &["Entertainment", "Subscriptions"], "Netflix"),
            (12, "Rent Payment", -1450.0, &["Housing"], "Property Manager"),
            (17, "Salary Deposit", 2250.0, &["Income"], "Employer"),
            (24, "Shell Gas Station", -48.10, &["Transportation"], "Shell"),
            (31, "Salary Deposit", 2250.0, &["Income"], "Employer"),
        ];

        for (days_ago, name, amount, category, merchant) in seed {
            let date = today - Duration::days(days_ago);
            let tx = NewTransaction {
                account_id: Some("account1".to_string()),
                date,
                name: name.to_string(),
                amount,
                category: category.iter().map(|c| c.to_string()).collect(),
                merchant_name: Some(merchant.to_string()),
                pending: false,
                import_hash: compute_import_hash(user_id, date, name, amount),
            };
            // Seeding an empty store cannot collide or fail
            let _ = store.insert_transaction(user_id, &tx);
        }

        let accounts = [
            ("Checking Account", "checking", DEMO_CHECKING_BALANCE),
            ("Savings Account", "savings", DEMO_SAVINGS_BALANCE),
        ];
        for (name, subtype, balance) in accounts {
            let _ = store.upsert_account(
                user_id,
                &NewAccount {
                    name: name.to_string(),
                    account_type: "depository".to_string(),
                    subtype: Some(subtype.to_string()),
                    balance,
                },
            );
        }

        store
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| Error::Store("Failed to acquire store lock".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| Error::Store("Failed to acquire store lock".into()))
    }
}

impl TransactionStore for MemoryStore {
    fn list_transactions(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let inner = self.read()?;
        // Reverse insertion order breaks date ties newest-inserted first
        let mut transactions: Vec<Transaction> = inner
            .transactions
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .map(|s| &s.transaction)
            .filter(|t| from.map_or(true, |f| t.date >= f) && to.map_or(true, |end| t.date <= end))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    fn get_transaction(&self, user_id: &str, id: &str) -> Result<Option<Transaction>> {
        let inner = self.read()?;
        Ok(inner
            .transactions
            .iter()
            .find(|s| s.user_id == user_id && s.transaction.id == id)
            .map(|s| s.transaction.clone()))
    }

    fn insert_transaction(&self, user_id: &str, tx: &NewTransaction) -> Result<Option<String>> {
        Ok(self.write()?.insert(user_id, tx))
    }

    fn import_transactions(&self, user_id: &str, txs: &[NewTransaction]) -> Result<ImportSummary> {
        // One write guard for the whole batch
        let mut inner = self.write()?;
        let mut summary = ImportSummary::default();
        for tx in txs {
            match inner.insert(user_id, tx) {
                Some(_) => summary.imported += 1,
                None => summary.skipped += 1,
            }
        }
        Ok(summary)
    }

    fn count_transactions(&self, user_id: &str) -> Result<i64> {
        let inner = self.read()?;
        Ok(inner
            .transactions
            .iter()
            .filter(|s| s.user_id == user_id)
            .count() as i64)
    }

    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let inner = self.read()?;
        let mut accounts: Vec<Account> = inner
            .accounts
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.account.clone())
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    fn upsert_account(&self, user_id: &str, account: &NewAccount) -> Result<String> {
        let mut inner = self.write()?;
        let balances = Balances {
            available: Some(account.balance),
            current: account.balance,
            iso_currency_code: "USD".to_string(),
        };

        if let Some(existing) = inner
            .accounts
            .iter_mut()
            .find(|s| s.user_id == user_id && s.account.name == account.name)
        {
            existing.account.account_type = account.account_type.clone();
            existing.account.subtype = account.subtype.clone();
            existing.account.balances = balances;
            return Ok(existing.account.id.clone());
        }

        let id = inner.next_id("acc");
        inner.accounts.push(StoredAccount {
            user_id: user_id.to_string(),
            account: Account {
                id: id.clone(),
                name: account.name.clone(),
                account_type: account.account_type.clone(),
                subtype: account.subtype.clone(),
                balances,
                mask: None,
                institution: None,
            },
        });
        Ok(id)
    }

    fn health_check(&self) -> bool {
        self.read().is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
