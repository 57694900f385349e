//! Mock backend for testing
//!
//! Returns canned text per prompt kind, shaped like a real model reply so the
//! parsing path downstream is exercised. Useful for the demo store and for
//! development without a running LLM server.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::{GenerationRequest, PromptKind};
use super::TextGenerator;

const RECOMMENDATIONS: &str = "1. Review your streaming subscriptions
You are paying for several overlapping subscription services. Cancel the ones you have not used this month.

2. Plan grocery trips ahead
Frequent small grocery and food purchases add up. A weekly list cuts impulse spending.

3. Build an emergency fund
Set aside a fixed amount each payday toward saving three months of expenses.";

const SAVINGS_TIPS: &str = "1. Brew coffee at home
Coffee shop visits show up several times a week. Making it at home most days saves noticeably.

2. Batch your online orders
Many small online orders carry separate shipping costs. Combine them into one weekly order.

3. Automate a transfer to savings
Move a fixed amount to savings the day your salary arrives so it is never spent.";

const BUDGET: &str = "Needs (50%): housing, utilities, groceries and transportation.
Wants (30%): dining out, entertainment and shopping.
Savings (20%): emergency fund first, then longer-term goals.";

const SPENDING_ANALYSIS: &str = "1. Housing is your largest fixed cost.
2. Dining and coffee purchases are frequent but small.
3. Income arrives on a regular schedule, which makes automated saving easy.";

const PREDICTIONS: &str = "Income should stay close to recent months with a slight increase. \
Expenses should grow a little faster than inflation, leaving savings roughly steady.";

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create an unhealthy mock backend
    ///
    /// Generation fails as if the server were unreachable.
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl TextGenerator for MockBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        if !self.healthy {
            return Err(Error::Ai("Mock backend is unhealthy".into()));
        }

        let text = match request.kind {
            PromptKind::Recommendations => RECOMMENDATIONS,
            PromptKind::SavingsTips => SAVINGS_TIPS,
            PromptKind::Budget => BUDGET,
            PromptKind::SpendingAnalysis => SPENDING_ANALYSIS,
            PromptKind::Predictions => PREDICTIONS,
        };
        Ok(text.to_string())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unhealthy_fails() {
        let backend = MockBackend::unhealthy();
        assert!(!backend.health_check().await);
        let request = GenerationRequest::new(PromptKind::Budget, "", "");
        assert!(backend.generate(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_tips_have_three_blocks() {
        let request = GenerationRequest::new(PromptKind::SavingsTips, "", "");
        let text = MockBackend::new().generate(&request).await.unwrap();
        assert_eq!(text.split("\n\n").count(), 3);
    }
}
