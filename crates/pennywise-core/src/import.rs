//! CSV import for transactions and accounts
//!
//! Transaction files need `date`, `description` and `amount` columns and may
//! carry a `category` column. Account files need `name`, `type` and
//! `balance`, with optional `subtype`. Header names are matched
//! case-insensitively and extra columns are ignored.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Writer};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::categorize::categorize_description;
use crate::dates::parse_transaction_date;
use crate::error::{Error, Result};
use crate::models::{Account, CategoryTotal, NewAccount, NewTransaction, Transaction};

const MISSING_TRANSACTION_FIELDS: &str =
    "CSV file is missing required fields (date, description, amount)";
const MISSING_ACCOUNT_FIELDS: &str = "CSV file is missing required fields (name, type, balance)";

/// Words of the description kept as merchant name for CSV rows
const CSV_MERCHANT_WORDS: usize = 3;
/// Words of the description kept as merchant name for manual entries
const MANUAL_MERCHANT_WORDS: usize = 2;

/// Generate a unique hash for deduplication
pub fn compute_import_hash(user_id: &str, date: NaiveDate, description: &str, amount: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// First few whitespace-separated words of a description
pub fn extract_merchant_name(description: &str, words: usize) -> String {
    description
        .split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an amount, tolerating currency symbols and accounting negatives
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}

fn labels_for(description: &str, category: Option<&str>) -> Vec<String> {
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => vec![category.to_string()],
        None => categorize_description(description),
    }
}

/// Build a transaction typed in by hand
///
/// Without a category the description is run through the keyword rules.
pub fn manual_transaction(
    user_id: &str,
    date: NaiveDate,
    description: &str,
    amount: f64,
    category: Option<&str>,
    account_id: Option<String>,
) -> NewTransaction {
    NewTransaction {
        account_id,
        date,
        name: description.to_string(),
        amount,
        category: labels_for(description, category),
        merchant_name: Some(extract_merchant_name(description, MANUAL_MERCHANT_WORDS)),
        pending: false,
        import_hash: compute_import_hash(user_id, date, description, amount),
    }
}

/// Lower-cased header name to column index
fn header_index(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

fn field<'r>(record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
    column
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a transactions CSV for a user
pub fn parse_transactions_csv<R: Read>(reader: R, user_id: &str) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = header_index(rdr.headers()?);
    let (date_col, desc_col, amount_col) = match (
        columns.get("date"),
        columns.get("description"),
        columns.get("amount"),
    ) {
        (Some(d), Some(s), Some(a)) => (*d, *s, *a),
        _ => return Err(Error::Import(MISSING_TRANSACTION_FIELDS.into())),
    };
    let category_col = columns.get("category").copied();

    let mut transactions = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let (date_str, description, amount_str) = match (
            field(&record, Some(date_col)),
            field(&record, Some(desc_col)),
            record.get(amount_col),
        ) {
            (Some(d), Some(s), Some(a)) => (d, s, a),
            _ => return Err(Error::Import(MISSING_TRANSACTION_FIELDS.into())),
        };

        let date = parse_transaction_date(date_str)
            .map_err(|_| Error::Import(format!("Unable to parse date: {}", date_str)))?;
        let amount = parse_amount(amount_str)?;

        transactions.push(NewTransaction {
            account_id: None,
            date,
            name: description.to_string(),
            amount,
            category: labels_for(description, field(&record, category_col)),
            merchant_name: Some(extract_merchant_name(description, CSV_MERCHANT_WORDS)),
            pending: false,
            import_hash: compute_import_hash(user_id, date, description, amount),
        });
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

/// Parse an accounts CSV
pub fn parse_accounts_csv<R: Read>(reader: R) -> Result<Vec<NewAccount>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = header_index(rdr.headers()?);
    let (name_col, type_col, balance_col) = match (
        columns.get("name"),
        columns.get("type"),
        columns.get("balance"),
    ) {
        (Some(n), Some(t), Some(b)) => (*n, *t, *b),
        _ => return Err(Error::Import(MISSING_ACCOUNT_FIELDS.into())),
    };
    let subtype_col = columns.get("subtype").copied();

    let mut accounts = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let (name, account_type, balance_str) = match (
            field(&record, Some(name_col)),
            field(&record, Some(type_col)),
            record.get(balance_col),
        ) {
            (Some(n), Some(t), Some(b)) => (n, t, b),
            _ => return Err(Error::Import(MISSING_ACCOUNT_FIELDS.into())),
        };

        accounts.push(NewAccount {
            name: name.to_string(),
            account_type: account_type.to_string(),
            subtype: field(&record, subtype_col).map(str::to_string),
            balance: parse_amount(balance_str)?,
        });
    }

    debug!("Parsed {} CSV accounts", accounts.len());
    Ok(accounts)
}

fn write_template(headers: &[&str], rows: &[[&str; 4]]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Import(format!("Failed to write template: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Import(e.to_string()))
}

/// Sample transactions CSV
pub fn transactions_template() -> Result<String> {
    write_template(
        &["date", "description", "amount", "category"],
        &[
            ["2023-01-15", "Grocery Store", "-120.50", "Food & Dining"],
            ["2023-01-16", "Salary Deposit", "2000.00", "Income"],
            ["2023-01-18", "Gas Station", "-45.00", "Transportation"],
        ],
    )
}

/// Sample accounts CSV
pub fn accounts_template() -> Result<String> {
    write_template(
        &["name", "type", "subtype", "balance"],
        &[
            ["Checking Account", "depository", "checking", "5000.00"],
            ["Savings Account", "depository", "savings", "10000.00"],
            ["Credit Card", "credit", "", "-500.00"],
        ],
    )
}

/// Sum of current balances across accounts
pub fn calculate_total_balance(accounts: &[Account]) -> f64 {
    accounts.iter().map(|a| a.balances.current).sum()
}

/// Magnitude totals per primary category, in first-seen order
pub fn group_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tx in transactions {
        let name = tx.primary_category();
        match index.get(name) {
            Some(&i) => totals[i].value += tx.amount.abs(),
            None => {
                index.insert(name, totals.len());
                totals.push(CategoryTotal {
                    name: name.to_string(),
                    value: tx.amount.abs(),
                });
            }
        }
    }

    totals
}
