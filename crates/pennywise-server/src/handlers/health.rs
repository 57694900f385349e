//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use pennywise_core::{TextGenerator, TransactionStore};

#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub backend: &'static str,
    pub healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct AiStatus {
    pub host: String,
    pub model: String,
    pub healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: StoreStatus,
    /// Null when no AI backend is configured
    pub ai: Option<AiStatus>,
}

/// GET /api/health - Store and AI backend status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = StoreStatus {
        backend: state.store.backend_name(),
        healthy: state.store.health_check(),
    };

    let ai = match &state.ai {
        Some(client) => Some(AiStatus {
            host: client.host().to_string(),
            model: client.model().to_string(),
            healthy: client.health_check().await,
        }),
        None => None,
    };

    let status = if store.healthy { "ok" } else { "degraded" };

    Json(HealthResponse { status, store, ai })
}
