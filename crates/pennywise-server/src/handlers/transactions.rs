//! Transaction query handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::today;
use crate::{get_user_id, AppError, AppState};
use pennywise_core::{
    dates::{lookback_start, parse_transaction_date},
    import::group_by_category,
    models::CategoryTotal,
    Transaction, TransactionStore,
};

/// Default window when no start date is given
const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Query parameters for transaction listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    /// Resolve to inclusive bounds, defaulting to the last 30 days
    fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
        let parse = |s: &str| {
            parse_transaction_date(s)
                .map_err(|_| AppError::bad_request(&format!("Invalid date: {}", s)))
        };

        let end = match self.end_date.as_deref() {
            Some(s) => parse(s)?,
            None => today,
        };
        let start = match self.start_date.as_deref() {
            Some(s) => parse(s)?,
            None => lookback_start(today, DEFAULT_WINDOW_DAYS),
        };

        if start > end {
            return Err(AppError::bad_request("startDate must not be after endDate"));
        }
        Ok((start, end))
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryTotal>,
}

fn load(
    state: &AppState,
    headers: &HeaderMap,
    params: &DateRangeQuery,
) -> Result<Vec<Transaction>, AppError> {
    let user_id = get_user_id(headers);
    let (start, end) = params.resolve(today())?;

    let transactions = state
        .store
        .list_transactions(&user_id, Some(start), Some(end))
        .map_err(|e| AppError::failed("Failed to fetch transactions", e))?;

    debug!(user_id = %user_id, %start, %end, count = transactions.len(), "Listed transactions");
    Ok(transactions)
}

/// GET /api/transactions - Transactions in a date range, newest first
///
/// `startDate` defaults to 30 days ago and `endDate` to today.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let transactions = load(&state, &headers, &params)?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// GET /api/transactions/by-category - Spending totals per category
pub async fn transactions_by_category(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let transactions = load(&state, &headers, &params)?;
    let categories = group_by_category(&transactions);
    Ok(Json(CategoriesResponse { categories }))
}
