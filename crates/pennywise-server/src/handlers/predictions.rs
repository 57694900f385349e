//! Prediction handlers
//!
//! Projections are computed from transaction history; the optional outlook
//! is the only prediction route that talks to the AI backend.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{parse_json_body, today};
use crate::{get_user_id, AppError, AppState};
use pennywise_core::{
    dates::parse_transaction_date, forecast, import::manual_transaction, InsightService,
    Predictions, Transaction, TransactionStore,
};

#[derive(Debug, Serialize)]
pub struct PredictionsResponse {
    pub predictions: Predictions,
}

#[derive(Debug, Serialize)]
pub struct OutlookResponse {
    pub outlook: String,
}

/// Request body for computing predictions over caller-supplied transactions
#[derive(Debug, Default, Deserialize)]
pub struct ComputeRequest {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Request body for a manually entered transaction
///
/// `amount` may arrive as a number or a numeric string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTransactionRequest {
    pub description: Option<String>,
    pub amount: Option<Value>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub account_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTransactionResponse {
    pub success: bool,
    pub transaction_id: String,
}

/// POST /api/ai/predictions - Next-month and six-month projections
///
/// Uses the configured prediction lookback window (90 days by default).
pub async fn predictions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PredictionsResponse>, AppError> {
    let user_id = get_user_id(&headers);
    let service = InsightService::new(&state.store, state.text_generator(), &state.config.forecast);

    let predictions = service
        .predictions(&user_id, today())
        .map_err(|e| AppError::failed("Failed to generate predictions", e))?;

    Ok(Json(PredictionsResponse { predictions }))
}

/// POST /api/ai/outlook - Narrative outlook for the same window as the predictions
pub async fn outlook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OutlookResponse>, AppError> {
    let user_id = get_user_id(&headers);
    let service = InsightService::new(&state.store, state.text_generator(), &state.config.forecast);

    let outlook = service
        .prediction_outlook(&user_id, today())
        .await
        .map_err(|e| AppError::failed("Failed to generate predictions", e))?;

    Ok(Json(OutlookResponse { outlook }))
}

/// POST /api/predictions/compute - Projections over the posted transactions
///
/// Nothing is read from or written to the store.
pub async fn compute_predictions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictionsResponse>, AppError> {
    let req: ComputeRequest = parse_json_body(&body)?;
    let predictions = forecast::predict(&req.transactions, state.config.forecast.trend_policy);
    Ok(Json(PredictionsResponse { predictions }))
}

fn amount_value(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|a| a.is_finite())
}

/// POST /api/predictions/manual - Record a transaction typed in by hand
pub async fn add_manual_transaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ManualTransactionResponse>, AppError> {
    let user_id = get_user_id(&headers);
    let req: ManualTransactionRequest = parse_json_body(&body)?;

    let (Some(description), Some(amount), Some(date)) = (
        req.description.as_deref().map(str::trim).filter(|d| !d.is_empty()),
        req.amount.as_ref(),
        req.date.as_deref().filter(|d| !d.trim().is_empty()),
    ) else {
        return Err(AppError::bad_request("Missing required fields"));
    };

    let amount = amount_value(amount)
        .ok_or_else(|| AppError::bad_request(&format!("Invalid amount: {}", amount)))?;
    let date = parse_transaction_date(date).map_err(|e| AppError::bad_request(&e.to_string()))?;

    let tx = manual_transaction(
        &user_id,
        date,
        description,
        amount,
        req.category.as_deref(),
        req.account_id,
    );

    let transaction_id = state
        .store
        .insert_transaction(&user_id, &tx)
        .map_err(|e| AppError::failed("Failed to add transaction", e))?
        .ok_or_else(|| AppError::conflict("Transaction already recorded"))?;

    info!(user_id = %user_id, id = %transaction_id, "Added manual transaction");

    Ok(Json(ManualTransactionResponse {
        success: true,
        transaction_id,
    }))
}
