//! Calendar-month aggregation

use super::{MonthBucket, MonthKey, MonthlyData};
use crate::models::Transaction;

/// Group transactions into calendar-month buckets
///
/// Negative amounts count toward `expenses` (as magnitudes) and toward the
/// breakdown of their primary category. Positive amounts count toward
/// `income`. Zero amounts create the bucket but add nothing to it.
pub fn calculate_monthly_data(transactions: &[Transaction]) -> MonthlyData {
    let mut monthly = MonthlyData::new();

    for tx in transactions {
        let bucket: &mut MonthBucket = monthly.entry(MonthKey::from_date(tx.date)).or_default();

        if tx.is_expense() {
            let magnitude = tx.amount.abs();
            bucket.expenses += magnitude;
            *bucket
                .breakdown
                .entry(tx.primary_category().to_string())
                .or_insert(0.0) += magnitude;
        } else if tx.is_income() {
            bucket.income += tx.amount;
        }
    }

    monthly
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(amount: f64, date: &str, category: &[&str]) -> Transaction {
        Transaction {
            id: String::new(),
            account_id: None,
            amount,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            name: "test".into(),
            merchant_name: None,
            category: category.iter().map(|c| c.to_string()).collect(),
            pending: false,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(3000.0, "2024-01-01", &["Income"]),
            tx(-1200.0, "2024-01-03", &["Housing"]),
            tx(-85.25, "2024-01-10", &["Food", "Groceries"]),
            tx(-14.75, "2024-01-21", &[]),
            tx(0.0, "2024-01-22", &["Transfer"]),
            tx(3100.0, "2024-02-01", &["Income"]),
            tx(-50.0, "2024-02-14", &["Food"]),
            tx(-20.0, "2023-12-31", &["Food"]),
        ]
    }

    #[test]
    fn test_empty_input() {
        assert!(calculate_monthly_data(&[]).is_empty());
    }

    #[test]
    fn test_one_bucket_per_month() {
        let monthly = calculate_monthly_data(&sample());
        let keys: Vec<String> = monthly.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-1", "2024-2"]);
    }

    #[test]
    fn test_income_and_expense_conservation() {
        let txs = sample();
        let monthly = calculate_monthly_data(&txs);

        let income: f64 = monthly.values().map(|b| b.income).sum();
        let expenses: f64 = monthly.values().map(|b| b.expenses).sum();
        let positive: f64 = txs.iter().filter(|t| t.amount > 0.0).map(|t| t.amount).sum();
        let negative: f64 = txs
            .iter()
            .filter(|t| t.amount < 0.0)
            .map(|t| t.amount.abs())
            .sum();

        assert!((income - positive).abs() < 1e-9);
        assert!((expenses - negative).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_sums_to_expenses() {
        for bucket in calculate_monthly_data(&sample()).values() {
            let total: f64 = bucket.breakdown.values().sum();
            assert!((total - bucket.expenses).abs() < 1e-9);
        }
    }

    #[test]
    fn test_first_label_and_other() {
        let monthly = calculate_monthly_data(&sample());
        let jan = &monthly[&MonthKey::new(2024, 1)];

        assert_eq!(jan.breakdown["Food"], 85.25);
        assert_eq!(jan.breakdown["Other"], 14.75);
        assert!(!jan.breakdown.contains_key("Groceries"));
        assert!(!jan.breakdown.contains_key("Income"));
    }

    #[test]
    fn test_zero_amount_creates_empty_bucket() {
        let monthly = calculate_monthly_data(&[tx(0.0, "2024-06-30", &["Transfer"])]);
        let june = &monthly[&MonthKey::new(2024, 6)];
        assert_eq!(june.income, 0.0);
        assert_eq!(june.expenses, 0.0);
        assert!(june.breakdown.is_empty());
    }

    #[test]
    fn test_independent_of_input_order() {
        let forward = sample();
        let mut reversed = sample();
        reversed.reverse();
        assert_eq!(
            calculate_monthly_data(&forward),
            calculate_monthly_data(&reversed)
        );
    }

    #[test]
    fn test_idempotent() {
        let txs = sample();
        assert_eq!(calculate_monthly_data(&txs), calculate_monthly_data(&txs));
    }
}
