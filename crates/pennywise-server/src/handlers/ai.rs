//! AI feature handlers
//!
//! Every route here answers 503 when no AI backend is configured.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_json_body, today};
use crate::{get_user_id, AppError, AppState};
use pennywise_core::{InsightService, Recommendation, Tip};

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct TipsResponse {
    pub tips: Vec<Tip>,
}

/// Request body for a 50/30/20 budget
#[derive(Debug, Default, Deserialize)]
pub struct BudgetRequest {
    pub income: Option<f64>,
    /// Current expenses by category, passed to the prompt as-is
    #[serde(default)]
    pub expenses: Value,
}

#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    pub recommendation: String,
}

/// Request body for spending analysis
#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

impl Default for InsightsRequest {
    fn default() -> Self {
        Self {
            timeframe: default_timeframe(),
        }
    }
}

fn default_timeframe() -> String {
    "month".to_string()
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

/// POST /api/ai/recommendations - Three actionable recommendations from the last 30 days
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let user_id = get_user_id(&headers);
    let service = InsightService::new(&state.store, state.text_generator(), &state.config.forecast);

    let recommendations = service
        .recommendations(&user_id, today())
        .await
        .map_err(|e| AppError::failed("Failed to generate recommendations", e))?;

    Ok(Json(RecommendationsResponse { recommendations }))
}

/// POST /api/ai/savings-tips - Savings tips from recent spending
pub async fn savings_tips(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TipsResponse>, AppError> {
    let user_id = get_user_id(&headers);
    let service = InsightService::new(&state.store, state.text_generator(), &state.config.forecast);

    let tips = service
        .savings_tips(&user_id, today())
        .await
        .map_err(|e| AppError::failed("Failed to generate savings tips", e))?;

    Ok(Json(TipsResponse { tips }))
}

/// POST /api/ai/budget - 50/30/20 budget for an income
pub async fn budget(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<BudgetResponse>, AppError> {
    let req: BudgetRequest = parse_json_body(&body)?;
    let income = req
        .income
        .ok_or_else(|| AppError::bad_request("Missing required fields"))?;

    let service = InsightService::new(&state.store, state.text_generator(), &state.config.forecast);
    let recommendation = service
        .budget_recommendation(income, &req.expenses)
        .await
        .map_err(|e| AppError::failed("Failed to generate budget", e))?;

    Ok(Json(BudgetResponse { recommendation }))
}

/// POST /api/ai/insights - Spending-pattern analysis for a timeframe
///
/// Timeframe is one of week, month, quarter or year (default month).
pub async fn spending_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InsightsResponse>, AppError> {
    let user_id = get_user_id(&headers);
    let req: InsightsRequest = parse_json_body(&body)?;

    let service = InsightService::new(&state.store, state.text_generator(), &state.config.forecast);
    let insights = service
        .spending_analysis(&user_id, today(), &req.timeframe)
        .await
        .map_err(|e| AppError::failed("Failed to generate insights", e))?;

    Ok(Json(InsightsResponse { insights }))
}
