//! Next-month and six-month projections over aggregated months

use std::collections::BTreeMap;

use super::{
    round_currency, MonthlyData, NextMonthPrediction, SixMonthPrediction, Trend, TrendPolicy,
    Trends, BACKFILL_SHARE, MONTHLY_EXPENSE_GROWTH, MONTHLY_INCOME_GROWTH,
    NEXT_MONTH_EXPENSE_GROWTH, NEXT_MONTH_INCOME_GROWTH, PROJECTION_MONTHS, STANDARD_CATEGORIES,
};

/// Prediction returned when there is no history at all
fn baseline_next_month() -> NextMonthPrediction {
    let breakdown = [
        ("housing", 1200),
        ("food", 600),
        ("transportation", 300),
        ("entertainment", 250),
        ("utilities", 200),
        ("other", 150),
    ]
    .into_iter()
    .map(|(category, amount)| (category.to_string(), amount))
    .collect();

    NextMonthPrediction {
        income: 4500,
        expenses: 2700,
        savings: 1800,
        breakdown,
    }
}

/// Project next month from the average of every month in `monthly`
///
/// Category keys are lower-cased. Labels that differ only by case are merged
/// before averaging. Standard categories with no history are backfilled with
/// a tenth of the predicted expenses, so the breakdown is not required to sum
/// to `expenses`. A standard category that is present with a zero average
/// keeps its zero.
pub fn generate_next_month_prediction(monthly: &MonthlyData) -> NextMonthPrediction {
    if monthly.is_empty() {
        return baseline_next_month();
    }

    let months = monthly.len() as f64;
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut category_totals: BTreeMap<String, f64> = BTreeMap::new();

    for bucket in monthly.values() {
        total_income += bucket.income;
        total_expenses += bucket.expenses;
        for (category, amount) in &bucket.breakdown {
            *category_totals.entry(category.to_lowercase()).or_insert(0.0) += amount;
        }
    }

    let income = round_currency(total_income / months * NEXT_MONTH_INCOME_GROWTH);
    let expenses = round_currency(total_expenses / months * NEXT_MONTH_EXPENSE_GROWTH);

    let mut breakdown: BTreeMap<String, i64> = category_totals
        .into_iter()
        .map(|(category, total)| {
            (
                category,
                round_currency(total / months * NEXT_MONTH_EXPENSE_GROWTH),
            )
        })
        .collect();

    let backfill = round_currency(expenses as f64 * BACKFILL_SHARE);
    for category in STANDARD_CATEGORIES {
        breakdown.entry(category.to_string()).or_insert(backfill);
    }

    NextMonthPrediction {
        income,
        expenses,
        savings: income.saturating_sub(expenses),
        breakdown,
    }
}

/// Six-month projection with the constant trend labels
pub fn generate_six_month_prediction(monthly: &MonthlyData) -> SixMonthPrediction {
    generate_six_month_prediction_with(monthly, TrendPolicy::Constant)
}

/// Six-month projection compounding from the next-month estimate
///
/// Each month is accumulated before growth is applied, so the first projected
/// month equals the next-month estimate.
pub fn generate_six_month_prediction_with(
    monthly: &MonthlyData,
    policy: TrendPolicy,
) -> SixMonthPrediction {
    let seed = generate_next_month_prediction(monthly);

    let mut income = seed.income;
    let mut expenses = seed.expenses;
    let mut total_income: i64 = 0;
    let mut total_expenses: i64 = 0;

    for _ in 0..PROJECTION_MONTHS {
        // Totals saturate instead of overflowing on extreme amounts
        total_income = total_income.saturating_add(income);
        total_expenses = total_expenses.saturating_add(expenses);
        income = round_currency(income as f64 * MONTHLY_INCOME_GROWTH);
        expenses = round_currency(expenses as f64 * MONTHLY_EXPENSE_GROWTH);
    }

    let trends = match policy {
        TrendPolicy::Constant => constant_trends(),
        TrendPolicy::Realized => realized_trends(monthly),
    };

    SixMonthPrediction {
        average_monthly_income: round_currency(total_income as f64 / PROJECTION_MONTHS as f64),
        average_monthly_expenses: round_currency(
            total_expenses as f64 / PROJECTION_MONTHS as f64,
        ),
        total_savings: total_income.saturating_sub(total_expenses),
        trends,
    }
}

fn label(increasing: bool) -> Trend {
    if increasing {
        Trend::Increasing
    } else {
        Trend::Stable
    }
}

fn constant_trends() -> Trends {
    Trends {
        income: label(MONTHLY_INCOME_GROWTH > 1.003),
        expenses: label(MONTHLY_EXPENSE_GROWTH > 1.002),
        savings: label(MONTHLY_INCOME_GROWTH > MONTHLY_EXPENSE_GROWTH),
    }
}

/// Last observed month against the first; a single month is stable
fn realized_trends(monthly: &MonthlyData) -> Trends {
    let (first, last) = match (monthly.values().next(), monthly.values().next_back()) {
        (Some(first), Some(last)) if monthly.len() >= 2 => (first, last),
        _ => {
            return Trends {
                income: Trend::Stable,
                expenses: Trend::Stable,
                savings: Trend::Stable,
            }
        }
    };

    Trends {
        income: label(last.income > first.income),
        expenses: label(last.expenses > first.expenses),
        savings: label(last.income - last.expenses > first.income - first.expenses),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{calculate_monthly_data, MonthBucket, MonthKey};
    use super::*;
    use crate::models::Transaction;
    use chrono::NaiveDate;

    fn tx(amount: f64, date: &str, category: &[&str]) -> Transaction {
        Transaction {
            id: String::new(),
            account_id: None,
            amount,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            name: String::new(),
            merchant_name: None,
            category: category.iter().map(|c| c.to_string()).collect(),
            pending: false,
        }
    }

    fn single_month() -> MonthlyData {
        calculate_monthly_data(&[
            tx(1000.0, "2024-03-01", &["Income"]),
            tx(-400.0, "2024-03-15", &["Food"]),
        ])
    }

    #[test]
    fn test_empty_baseline() {
        let prediction = generate_next_month_prediction(&MonthlyData::new());
        assert_eq!(prediction.income, 4500);
        assert_eq!(prediction.expenses, 2700);
        assert_eq!(prediction.savings, 1800);
        assert_eq!(prediction.breakdown.len(), 6);
        assert_eq!(prediction.breakdown["housing"], 1200);
        assert_eq!(prediction.breakdown["food"], 600);
        assert_eq!(prediction.breakdown["transportation"], 300);
        assert_eq!(prediction.breakdown["entertainment"], 250);
        assert_eq!(prediction.breakdown["utilities"], 200);
        assert_eq!(prediction.breakdown["other"], 150);
    }

    #[test]
    fn test_single_month_example() {
        let prediction = generate_next_month_prediction(&single_month());
        assert_eq!(prediction.income, 1020);
        assert_eq!(prediction.expenses, 404);
        assert_eq!(prediction.savings, 616);
        assert_eq!(prediction.breakdown["food"], 404);
        for category in ["housing", "transportation", "entertainment", "utilities", "other"] {
            assert_eq!(prediction.breakdown[category], 40, "{}", category);
        }
        assert_eq!(prediction.breakdown.len(), 6);
    }

    #[test]
    fn test_averages_across_months() {
        let monthly = calculate_monthly_data(&[
            tx(2000.0, "2024-01-05", &[]),
            tx(-500.0, "2024-01-06", &["Travel"]),
            tx(4000.0, "2024-02-05", &[]),
            tx(-700.0, "2024-02-06", &["Rent"]),
        ]);
        let prediction = generate_next_month_prediction(&monthly);

        // avg income 3000 * 1.02, avg expenses 600 * 1.01
        assert_eq!(prediction.income, 3060);
        assert_eq!(prediction.expenses, 606);
        // Each category divided by the total month count, not its own
        assert_eq!(prediction.breakdown["travel"], 253);
        assert_eq!(prediction.breakdown["rent"], 354);
        assert_eq!(prediction.breakdown["housing"], 61);
    }

    #[test]
    fn test_lowercase_keys_merge_case_variants() {
        let monthly = calculate_monthly_data(&[
            tx(-100.0, "2024-01-05", &["Food"]),
            tx(-100.0, "2024-01-06", &["FOOD"]),
            tx(-100.0, "2024-01-07", &["food"]),
        ]);
        let prediction = generate_next_month_prediction(&monthly);
        assert_eq!(prediction.breakdown["food"], 303);
        assert!(prediction.breakdown.keys().all(|k| *k == k.to_lowercase()));
    }

    #[test]
    fn test_existing_category_not_backfilled() {
        let monthly = calculate_monthly_data(&[
            tx(-1000.0, "2024-01-05", &["Housing"]),
            tx(-0.2, "2024-01-06", &["Utilities"]),
        ]);
        let prediction = generate_next_month_prediction(&monthly);
        assert_eq!(prediction.breakdown["housing"], 1010);
        // Rounds to zero but is present, so it keeps its value
        assert_eq!(prediction.breakdown["utilities"], 0);
        assert_eq!(prediction.breakdown["food"], 101);
    }

    #[test]
    fn test_negative_savings_not_clamped() {
        let monthly = calculate_monthly_data(&[
            tx(100.0, "2024-01-01", &[]),
            tx(-900.0, "2024-01-02", &["Rent"]),
        ]);
        let prediction = generate_next_month_prediction(&monthly);
        assert_eq!(prediction.savings, 102 - 909);
        assert!(prediction.savings < 0);
    }

    #[test]
    fn test_expense_only_history() {
        let mut monthly = MonthlyData::new();
        monthly.insert(
            MonthKey::new(2024, 4),
            MonthBucket {
                income: 0.0,
                expenses: 50.0,
                breakdown: BTreeMap::from([("Other".to_string(), 50.0)]),
            },
        );
        let prediction = generate_next_month_prediction(&monthly);
        assert_eq!(prediction.income, 0);
        assert_eq!(prediction.expenses, 51);
        assert_eq!(prediction.breakdown["other"], 51);
    }

    #[test]
    fn test_six_month_single_month_example() {
        let six = generate_six_month_prediction(&single_month());
        // income 1020, 1025, 1030, 1035, 1040, 1045
        // expenses 404, 405, 406, 407, 408, 409
        assert_eq!(six.average_monthly_income, 1033);
        assert_eq!(six.average_monthly_expenses, 407);
        assert_eq!(six.total_savings, 6195 - 2439);
    }

    #[test]
    fn test_six_month_from_baseline() {
        let six = generate_six_month_prediction(&MonthlyData::new());
        assert!(six.average_monthly_income >= 4500);
        assert!(six.average_monthly_expenses >= 2700);
        assert!(six.total_savings > 6 * 1800);
    }

    #[test]
    fn test_constant_trends_always_increasing() {
        let increasing = Trends {
            income: Trend::Increasing,
            expenses: Trend::Increasing,
            savings: Trend::Increasing,
        };
        let falling = calculate_monthly_data(&[
            tx(5000.0, "2024-01-01", &[]),
            tx(100.0, "2024-02-01", &[]),
        ]);
        assert_eq!(generate_six_month_prediction(&MonthlyData::new()).trends, increasing);
        assert_eq!(generate_six_month_prediction(&single_month()).trends, increasing);
        assert_eq!(generate_six_month_prediction(&falling).trends, increasing);
    }

    #[test]
    fn test_realized_trends() {
        let monthly = calculate_monthly_data(&[
            tx(5000.0, "2024-01-01", &[]),
            tx(-1000.0, "2024-01-02", &[]),
            tx(4000.0, "2024-03-01", &[]),
            tx(-1500.0, "2024-03-02", &[]),
        ]);
        let six = generate_six_month_prediction_with(&monthly, TrendPolicy::Realized);
        assert_eq!(six.trends.income, Trend::Stable);
        assert_eq!(six.trends.expenses, Trend::Increasing);
        assert_eq!(six.trends.savings, Trend::Stable);

        // Figures do not depend on the policy
        let constant = generate_six_month_prediction(&monthly);
        assert_eq!(six.average_monthly_income, constant.average_monthly_income);
        assert_eq!(six.total_savings, constant.total_savings);
    }

    #[test]
    fn test_six_month_extreme_income_saturates() {
        let monthly = calculate_monthly_data(&[tx(2e18, "2024-03-01", &["Income"])]);
        let six = generate_six_month_prediction(&monthly);
        assert_eq!(six.average_monthly_expenses, 0);
        assert!(six.average_monthly_income > 0);
        assert_eq!(six.total_savings, i64::MAX);

        let monthly = calculate_monthly_data(&[tx(-2e18, "2024-03-01", &["Rent"])]);
        let six = generate_six_month_prediction(&monthly);
        assert_eq!(six.total_savings, -i64::MAX);
    }

    #[test]
    fn test_realized_trends_single_month_stable() {
        let six = generate_six_month_prediction_with(&single_month(), TrendPolicy::Realized);
        assert_eq!(six.trends.income, Trend::Stable);
        assert_eq!(six.trends.expenses, Trend::Stable);
        assert_eq!(six.trends.savings, Trend::Stable);
    }
}
