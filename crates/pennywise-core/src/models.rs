//! Domain models for Pennywise

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::flexible_date;

/// User id used when a request carries no identity
pub const DEFAULT_USER_ID: &str = "local-dev";

/// Category label used when a transaction carries none
pub const OTHER_CATEGORY: &str = "Other";

/// A bank transaction
///
/// Amounts keep the aggregator's sign convention: negative is money out,
/// positive is money in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    pub amount: f64,
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// Ordered labels, only the first is authoritative
    #[serde(default, deserialize_with = "category_labels")]
    pub category: Vec<String>,
    #[serde(default)]
    pub pending: bool,
}

impl Transaction {
    /// The authoritative category label, or "Other" when there is none
    pub fn primary_category(&self) -> &str {
        self.category
            .first()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
            .unwrap_or(OTHER_CATEGORY)
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }
}

/// Accepts `null`, a single string, or an array of strings
fn category_labels<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Labels {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Labels>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Labels::One(label)) => vec![label],
        Some(Labels::Many(labels)) => labels,
    })
}

/// New transaction for insertion (before it has an ID)
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: Option<String>,
    pub date: NaiveDate,
    pub name: String,
    pub amount: f64,
    pub category: Vec<String>,
    pub merchant_name: Option<String>,
    pub pending: bool,
    /// Hash for deduplication
    pub import_hash: String,
}

/// Account balances as reported by the institution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    pub available: Option<f64>,
    pub current: f64,
    pub iso_currency_code: String,
}

/// A bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub subtype: Option<String>,
    pub balances: Balances,
    pub mask: Option<String>,
    pub institution: Option<String>,
}

/// New or updated account, keyed by name
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub account_type: String,
    pub subtype: Option<String>,
    pub balance: f64,
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Transaction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_minimal_transaction_json() {
        let tx = parse(r#"{"amount": -12.5, "date": "2024-05-02"}"#);
        assert_eq!(tx.amount, -12.5);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert!(tx.category.is_empty());
        assert_eq!(tx.primary_category(), "Other");
        assert!(tx.is_expense());
    }

    #[test]
    fn test_category_shapes() {
        let tx = parse(r#"{"amount": 1, "date": "2024-05-02", "category": null}"#);
        assert!(tx.category.is_empty());

        let tx = parse(r#"{"amount": 1, "date": "2024-05-02", "category": "Travel"}"#);
        assert_eq!(tx.category, vec!["Travel"]);

        let tx = parse(
            r#"{"amount": 1, "date": "2024-05-02", "category": ["Food and Drink", "Restaurants"]}"#,
        );
        assert_eq!(tx.primary_category(), "Food and Drink");
    }

    #[test]
    fn test_empty_first_label_is_other() {
        let tx = parse(r#"{"amount": -1, "date": "2024-05-02", "category": ["", "Travel"]}"#);
        assert_eq!(tx.primary_category(), "Other");
    }

    #[test]
    fn test_datetime_date_and_camel_case_output() {
        let tx = parse(
            r#"{"id": "t1", "amount": 10, "date": "2024-05-02T14:00:00Z", "merchantName": "ACME"}"#,
        );
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["date"], "2024-05-02");
        assert_eq!(value["merchantName"], "ACME");
        assert_eq!(value["accountId"], serde_json::Value::Null);
    }

    #[test]
    fn test_zero_amount_is_neither() {
        let tx = parse(r#"{"amount": 0, "date": "2024-05-02"}"#);
        assert!(!tx.is_expense());
        assert!(!tx.is_income());
    }

    #[test]
    fn test_account_type_field_name() {
        let account = Account {
            id: "a1".into(),
            name: "Checking Account".into(),
            account_type: "depository".into(),
            subtype: Some("checking".into()),
            balances: Balances {
                available: Some(10.0),
                current: 10.0,
                iso_currency_code: "USD".into(),
            },
            mask: None,
            institution: None,
        };
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["type"], "depository");
        assert_eq!(value["balances"]["isoCurrencyCode"], "USD");
    }
}
