//! Insight service: store-backed predictions and AI features

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::ai::TextGenerator;
use crate::config::ForecastConfig;
use crate::dates::lookback_start;
use crate::error::{Error, Result};
use crate::forecast::{self, Predictions};
use crate::models::Transaction;
use crate::store::TransactionStore;

use super::parsing::{parse_recommendations, parse_tips, Recommendation, Tip};
use super::prompts;

/// Lookback window for a spending-analysis timeframe label
///
/// Unknown labels fall back to a month.
pub fn timeframe_days(timeframe: &str) -> u32 {
    match timeframe.to_lowercase().as_str() {
        "week" => 7,
        "quarter" => 90,
        "year" => 365,
        _ => 30,
    }
}

/// Runs insight operations for one request
///
/// Borrows its collaborators; build one per request from shared state.
pub struct InsightService<'a> {
    store: &'a dyn TransactionStore,
    ai: Option<&'a dyn TextGenerator>,
    forecast: &'a ForecastConfig,
}

impl<'a> InsightService<'a> {
    pub fn new(
        store: &'a dyn TransactionStore,
        ai: Option<&'a dyn TextGenerator>,
        forecast: &'a ForecastConfig,
    ) -> Self {
        Self {
            store,
            ai,
            forecast,
        }
    }

    fn ai(&self) -> Result<&'a dyn TextGenerator> {
        self.ai.ok_or(Error::AiNotConfigured)
    }

    fn recent(&self, user_id: &str, today: NaiveDate, days: u32) -> Result<Vec<Transaction>> {
        let from = lookback_start(today, days);
        let transactions = self.store.list_transactions(user_id, Some(from), Some(today))?;
        debug!(user_id, days, count = transactions.len(), "Loaded recent transactions");
        Ok(transactions)
    }

    /// Next-month and six-month projections over the prediction lookback window
    ///
    /// Purely computed; no text backend is involved.
    pub fn predictions(&self, user_id: &str, today: NaiveDate) -> Result<Predictions> {
        let transactions = self.recent(user_id, today, self.forecast.prediction_lookback_days)?;
        let predictions = forecast::predict(&transactions, self.forecast.trend_policy);
        info!(
            user_id,
            transactions = transactions.len(),
            income = predictions.next_month.income,
            expenses = predictions.next_month.expenses,
            "Generated predictions"
        );
        Ok(predictions)
    }

    /// Free-text outlook for the same window the predictions use
    pub async fn prediction_outlook(&self, user_id: &str, today: NaiveDate) -> Result<String> {
        let ai = self.ai()?;
        let days = self.forecast.prediction_lookback_days;
        let transactions = self.recent(user_id, today, days)?;
        let request = prompts::predictions(&prompts::summarize(&transactions), days);
        ai.generate(&request).await
    }

    pub async fn recommendations(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<Recommendation>> {
        let ai = self.ai()?;
        let transactions =
            self.recent(user_id, today, self.forecast.recommendation_lookback_days)?;
        let request = prompts::recommendations(&prompts::summarize(&transactions));

        let text = ai.generate(&request).await?;
        let recommendations = parse_recommendations(&text)?;
        info!(user_id, count = recommendations.len(), "Generated recommendations");
        Ok(recommendations)
    }

    pub async fn savings_tips(&self, user_id: &str, today: NaiveDate) -> Result<Vec<Tip>> {
        let ai = self.ai()?;
        let transactions =
            self.recent(user_id, today, self.forecast.recommendation_lookback_days)?;
        let request = prompts::savings_tips(&prompts::summarize(&transactions));

        let text = ai.generate(&request).await?;
        let tips = parse_tips(&text, "tip")?;
        info!(user_id, count = tips.len(), "Generated savings tips");
        Ok(tips)
    }

    /// 50/30/20 allocation for an income and a set of expense categories
    pub async fn budget_recommendation(
        &self,
        income: f64,
        expenses: &serde_json::Value,
    ) -> Result<String> {
        if !income.is_finite() || income < 0.0 {
            return Err(Error::InvalidData(format!("Invalid income: {}", income)));
        }
        let ai = self.ai()?;
        ai.generate(&prompts::budget(income, expenses)).await
    }

    pub async fn spending_analysis(
        &self,
        user_id: &str,
        today: NaiveDate,
        timeframe: &str,
    ) -> Result<String> {
        let ai = self.ai()?;
        let transactions = self.recent(user_id, today, timeframe_days(timeframe))?;
        let request = prompts::spending_analysis(&prompts::summarize(&transactions), timeframe);
        ai.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::config::Config;
    use crate::forecast::TrendPolicy;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn demo() -> MemoryStore {
        MemoryStore::demo_for("u1", today())
    }

    #[test]
    fn test_predictions_without_ai() {
        let store = demo();
        let config = Config::default().forecast;
        let service = InsightService::new(&store, None, &config);

        let predictions = service.predictions("u1", today()).unwrap();
        assert_eq!(
            predictions.next_month.savings,
            predictions.next_month.income - predictions.next_month.expenses
        );
        // Demo data spans May and June
        assert_ne!(predictions.next_month.income, 4500);
    }

    #[test]
    fn test_predictions_unknown_user_is_baseline() {
        let store = demo();
        let config = Config::default().forecast;
        let service = InsightService::new(&store, None, &config);

        let predictions = service.predictions("nobody", today()).unwrap();
        assert_eq!(predictions.next_month.income, 4500);
        assert_eq!(predictions.next_month.expenses, 2700);
    }

    #[test]
    fn test_predictions_respect_lookback() {
        let store = demo();
        let mut config = Config::default().forecast;
        config.prediction_lookback_days = 0;
        config.trend_policy = TrendPolicy::Realized;
        let service = InsightService::new(&store, None, &config);

        // Only today's -4.85 coffee is in range
        let predictions = service.predictions("u1", today()).unwrap();
        assert_eq!(predictions.next_month.income, 0);
        assert_eq!(predictions.next_month.expenses, 5);
    }

    #[tokio::test]
    async fn test_ai_features_require_backend() {
        let store = demo();
        let config = Config::default().forecast;
        let service = InsightService::new(&store, None, &config);

        let err = service.recommendations("u1", today()).await.unwrap_err();
        assert!(matches!(err, Error::AiNotConfigured));
        assert!(service.savings_tips("u1", today()).await.is_err());
        assert!(service.prediction_outlook("u1", today()).await.is_err());
    }

    #[tokio::test]
    async fn test_recommendations_with_mock() {
        let store = demo();
        let mock = MockBackend::new();
        let config = Config::default().forecast;
        let service = InsightService::new(&store, Some(&mock), &config);

        let recs = service.recommendations("u1", today()).await.unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].category, "subscriptions");
        assert_eq!(recs[0].potential_savings, 25);
        assert_eq!(recs[1].potential_savings, 80);
        assert_eq!(recs[2].potential_savings, 0);
        assert_eq!(recs[2].color, "green");
    }

    #[tokio::test]
    async fn test_tips_budget_and_analysis_with_mock() {
        let store = demo();
        let mock = MockBackend::new();
        let config = Config::default().forecast;
        let service = InsightService::new(&store, Some(&mock), &config);

        let tips = service.savings_tips("u1", today()).await.unwrap();
        assert_eq!(tips.len(), 3);
        assert_eq!(tips[0].id, "tip-1");

        let budget = service
            .budget_recommendation(4500.0, &json!({"housing": 1200}))
            .await
            .unwrap();
        assert!(budget.contains("50%"));
        assert!(service
            .budget_recommendation(f64::NAN, &json!({}))
            .await
            .is_err());

        let analysis = service.spending_analysis("u1", today(), "week").await.unwrap();
        assert!(!analysis.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let store = demo();
        let mock = MockBackend::unhealthy();
        let config = Config::default().forecast;
        let service = InsightService::new(&store, Some(&mock), &config);

        let err = service.recommendations("u1", today()).await.unwrap_err();
        assert!(matches!(err, Error::Ai(_)));
    }

    #[test]
    fn test_timeframe_days() {
        assert_eq!(timeframe_days("week"), 7);
        assert_eq!(timeframe_days("Month"), 30);
        assert_eq!(timeframe_days("year"), 365);
        assert_eq!(timeframe_days("fortnight"), 30);
    }
}
