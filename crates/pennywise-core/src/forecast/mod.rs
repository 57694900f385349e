//! Monthly aggregation and forward projection
//!
//! Transactions are grouped into calendar months by [`calculate_monthly_data`],
//! then projected one month ahead with [`generate_next_month_prediction`] and
//! six months ahead with [`generate_six_month_prediction`].
//!
//! Everything here is pure and total: any slice of transactions, including an
//! empty one, produces a result. Monetary outputs are whole currency units,
//! rounded half away from zero.

mod monthly;
mod projection;

pub use monthly::calculate_monthly_data;
pub use projection::{
    generate_next_month_prediction, generate_six_month_prediction,
    generate_six_month_prediction_with,
};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::models::Transaction;

/// Income growth applied to the historical average for next month
pub const NEXT_MONTH_INCOME_GROWTH: f64 = 1.02;
/// Expense growth applied to the historical average for next month
pub const NEXT_MONTH_EXPENSE_GROWTH: f64 = 1.01;
/// Per-month compounding income growth over the six-month horizon
pub const MONTHLY_INCOME_GROWTH: f64 = 1.005;
/// Per-month compounding expense growth over the six-month horizon
pub const MONTHLY_EXPENSE_GROWTH: f64 = 1.003;
/// Share of predicted expenses given to a standard category with no history
pub const BACKFILL_SHARE: f64 = 0.10;
/// Length of the long-range projection
pub const PROJECTION_MONTHS: usize = 6;

/// Categories every next-month breakdown carries
pub const STANDARD_CATEGORIES: [&str; 6] = [
    "housing",
    "food",
    "transportation",
    "entertainment",
    "utilities",
    "other",
];

/// Round to whole currency units, half away from zero
pub fn round_currency(value: f64) -> i64 {
    value.round() as i64
}

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// Renders as `YYYY-M` (month not zero-padded)
impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Aggregated figures for one calendar month
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthBucket {
    /// Sum of positive amounts
    pub income: f64,
    /// Sum of magnitudes of negative amounts
    pub expenses: f64,
    /// Expense magnitudes per primary category label
    pub breakdown: BTreeMap<String, f64>,
}

/// One bucket per distinct month in the input
pub type MonthlyData = BTreeMap<MonthKey, MonthBucket>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextMonthPrediction {
    pub income: i64,
    pub expenses: i64,
    /// May be negative
    pub savings: i64,
    /// Keyed by lower-cased category
    pub breakdown: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trends {
    pub income: Trend,
    pub expenses: Trend,
    pub savings: Trend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SixMonthPrediction {
    pub average_monthly_income: i64,
    pub average_monthly_expenses: i64,
    pub total_savings: i64,
    pub trends: Trends,
}

/// Both horizons, as returned by the predictions endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictions {
    pub next_month: NextMonthPrediction,
    pub six_months: SixMonthPrediction,
}

/// How six-month trend labels are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPolicy {
    /// Compare the fixed growth constants. Always reports increasing.
    #[default]
    Constant,
    /// Compare the last observed month against the first
    Realized,
}

impl FromStr for TrendPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constant" => Ok(Self::Constant),
            "realized" | "realised" => Ok(Self::Realized),
            _ => Err(format!("Unknown trend policy: {}", s)),
        }
    }
}

/// Aggregate and project in one step
pub fn predict(transactions: &[Transaction], policy: TrendPolicy) -> Predictions {
    let monthly = calculate_monthly_data(transactions);
    predict_from_monthly(&monthly, policy)
}

pub fn predict_from_monthly(monthly: &MonthlyData, policy: TrendPolicy) -> Predictions {
    Predictions {
        next_month: generate_next_month_prediction(monthly),
        six_months: generate_six_month_prediction_with(monthly, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(2.5), 3);
        assert_eq!(round_currency(-2.5), -3);
        assert_eq!(round_currency(2.49), 2);
        assert_eq!(round_currency(-0.4), 0);
    }

    #[test]
    fn test_month_key_format_and_order() {
        let jan = MonthKey::new(2024, 1);
        let dec = MonthKey::new(2023, 12);
        assert_eq!(jan.to_string(), "2024-1");
        assert_eq!(dec.to_string(), "2023-12");
        assert!(dec < jan);
    }

    #[test]
    fn test_predictions_wire_shape() {
        let predictions = predict(&[], TrendPolicy::Constant);
        let value = serde_json::to_value(&predictions).unwrap();

        assert_eq!(value["nextMonth"]["income"], 4500);
        assert_eq!(value["nextMonth"]["breakdown"]["housing"], 1200);
        assert!(value["sixMonths"]["averageMonthlyIncome"].is_i64());
        assert!(value["sixMonths"]["averageMonthlyExpenses"].is_i64());
        assert!(value["sixMonths"]["totalSavings"].is_i64());
        assert_eq!(value["sixMonths"]["trends"]["income"], "increasing");
        assert_eq!(value["sixMonths"]["trends"]["savings"], "increasing");
    }

    #[test]
    fn test_monthly_data_serializes_with_string_keys() {
        let tx: Transaction =
            serde_json::from_str(r#"{"amount": 100, "date": "2024-03-05"}"#).unwrap();
        let value = serde_json::to_value(calculate_monthly_data(&[tx])).unwrap();
        assert_eq!(value["2024-3"]["income"], 100.0);
    }

    #[test]
    fn test_trend_policy_parse() {
        assert_eq!("constant".parse::<TrendPolicy>().unwrap(), TrendPolicy::Constant);
        assert_eq!("Realized".parse::<TrendPolicy>().unwrap(), TrendPolicy::Realized);
        assert!("linear".parse::<TrendPolicy>().is_err());
        assert_eq!(TrendPolicy::default(), TrendPolicy::Constant);
    }
}
