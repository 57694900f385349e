//! Prompt builders for the dashboard's AI features
//!
//! Each builder embeds the relevant transactions as JSON in the user prompt
//! and pairs it with a fixed system prompt.

use serde::Serialize;

use crate::ai::{GenerationRequest, PromptKind};
use crate::models::Transaction;

const PREDICTIONS_SYSTEM: &str = "You are a financial analyst specializing in predictive financial modeling. Provide data-driven predictions about future financial patterns based on historical spending data.";

const RECOMMENDATIONS_SYSTEM: &str = "You are a financial advisor specializing in personal finance optimization. Provide concise, practical advice for saving money and improving financial health based on spending patterns.";

const SAVINGS_TIPS_SYSTEM: &str = "You are a financial advisor specializing in personal finance optimization. Provide concise, practical advice for saving money based on spending patterns.";

const BUDGET_SYSTEM: &str = "You are a financial planner specializing in budget optimization. Provide practical budget allocations based on income and current spending patterns.";

const SPENDING_ANALYSIS_SYSTEM: &str = "You are a financial analyst specializing in personal spending patterns. Provide clear, data-driven insights about spending behaviors.";

/// The slice of a transaction that is shown to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub amount: f64,
    pub date: String,
    pub name: String,
    pub category: Vec<String>,
}

impl From<&Transaction> for TransactionSummary {
    fn from(tx: &Transaction) -> Self {
        let category = if tx.category.is_empty() {
            vec!["Uncategorized".to_string()]
        } else {
            tx.category.clone()
        };
        Self {
            amount: tx.amount,
            date: tx.date.format("%Y-%m-%d").to_string(),
            name: tx.name.clone(),
            category,
        }
    }
}

pub fn summarize(transactions: &[Transaction]) -> Vec<TransactionSummary> {
    transactions.iter().map(TransactionSummary::from).collect()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

pub fn predictions(transactions: &[TransactionSummary], lookback_days: u32) -> GenerationRequest {
    GenerationRequest::new(
        PromptKind::Predictions,
        PREDICTIONS_SYSTEM,
        format!(
            "Based on these transactions from the past {} days: {}, predict the user's financial situation for the next month and next six months. Include expected income, expenses by category, and savings potential.",
            lookback_days,
            to_json(transactions)
        ),
    )
}

pub fn recommendations(transactions: &[TransactionSummary]) -> GenerationRequest {
    GenerationRequest::new(
        PromptKind::Recommendations,
        RECOMMENDATIONS_SYSTEM,
        format!(
            "Based on these recent transactions: {}, provide 3 specific, actionable financial recommendations. Format each recommendation with a title and brief explanation.",
            to_json(transactions)
        ),
    )
}

pub fn savings_tips(transactions: &[TransactionSummary]) -> GenerationRequest {
    GenerationRequest::new(
        PromptKind::SavingsTips,
        SAVINGS_TIPS_SYSTEM,
        format!(
            "Based on these recent transactions: {}, provide 3 specific, actionable savings tips. Format each tip with a title and brief explanation.",
            to_json(transactions)
        ),
    )
}

/// `expenses` is passed through as given, usually a category map
pub fn budget(income: f64, expenses: &serde_json::Value) -> GenerationRequest {
    GenerationRequest::new(
        PromptKind::Budget,
        BUDGET_SYSTEM,
        format!(
            "Based on a monthly income of ${} and these expense categories: {}, recommend an optimal budget allocation following the 50/30/20 rule (50% needs, 30% wants, 20% savings). Provide specific dollar amounts for each category.",
            income,
            to_json(expenses)
        ),
    )
}

pub fn spending_analysis(transactions: &[TransactionSummary], timeframe: &str) -> GenerationRequest {
    GenerationRequest::new(
        PromptKind::SpendingAnalysis,
        SPENDING_ANALYSIS_SYSTEM,
        format!(
            "Analyze these transactions over the past {}: {}. Identify spending patterns, unusual expenses, and potential areas for saving. Provide a concise summary with 3-4 key insights.",
            timeframe,
            to_json(transactions)
        ),
    )
}
