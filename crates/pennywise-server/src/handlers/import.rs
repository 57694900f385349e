//! CSV import handler

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use tracing::info;

use crate::{get_user_id, AppError, AppState};
use pennywise_core::{import::parse_transactions_csv, ImportSummary, TransactionStore};

/// POST /api/import/csv - Import a transactions CSV sent as the request body
///
/// Re-importing the same file skips every row. Rows are stored in one batch,
/// so a failed import leaves nothing behind.
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ImportSummary>, AppError> {
    let user_id = get_user_id(&headers);

    if body.is_empty() {
        return Err(AppError::bad_request("Empty CSV body"));
    }

    let transactions = parse_transactions_csv(&body[..], &user_id)
        .map_err(|e| AppError::failed("Failed to import transactions", e))?;

    let summary = state
        .store
        .import_transactions(&user_id, &transactions)
        .map_err(|e| AppError::failed("Failed to import transactions", e))?;

    info!(
        user_id = %user_id,
        imported = summary.imported,
        skipped = summary.skipped,
        "Imported transactions CSV"
    );

    Ok(Json(summary))
}
