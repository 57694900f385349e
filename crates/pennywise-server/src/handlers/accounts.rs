//! Account handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{get_user_id, AppError, AppState};
use pennywise_core::{import::calculate_total_balance, Account, TransactionStore};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
    pub total_balance: f64,
}

/// GET /api/accounts - List accounts with their combined balance
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AccountsResponse>, AppError> {
    let user_id = get_user_id(&headers);

    let accounts = state
        .store
        .list_accounts(&user_id)
        .map_err(|e| AppError::failed("Failed to fetch accounts", e))?;
    let total_balance = calculate_total_balance(&accounts);

    Ok(Json(AccountsResponse {
        accounts,
        total_balance,
    }))
}
