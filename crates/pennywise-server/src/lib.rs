//! Pennywise Web Server
//!
//! Axum-based REST API for the Pennywise forecasting dashboard.
//!
//! - Predictions computed from the stored transaction history
//! - AI-generated recommendations, tips, budgets and spending analysis
//! - Manual entry and CSV import of transactions
//! - Restrictive CORS policy and request tracing
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use pennywise_core::{AIClient, Config, StoreClient, TextGenerator, TransactionStore, DEFAULT_USER_ID};

mod handlers;

/// Maximum CSV upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared application state
pub struct AppState {
    pub store: StoreClient,
    pub ai: Option<AIClient>,
    pub config: Config,
}

impl AppState {
    /// Build the store and AI client once from resolved configuration
    pub fn from_config(config: Config) -> pennywise_core::Result<Self> {
        let store = StoreClient::from_config(&config.store)?;
        let ai = AIClient::from_config(&config.ai);
        Ok(Self { store, ai, config })
    }

    /// The AI client as a trait object, if one is configured
    pub fn text_generator(&self) -> Option<&dyn TextGenerator> {
        self.ai.as_ref().map(|ai| ai as &dyn TextGenerator)
    }
}

/// Extract the user id from request headers
///
/// There is no authentication; callers without the header act as the
/// local development user.
pub fn get_user_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_USER_ID)
        .to_string()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let allowed_origins = state.config.server.allowed_origins.clone();
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Predictions
        .route("/ai/predictions", post(handlers::predictions))
        .route("/ai/outlook", post(handlers::outlook))
        .route("/predictions/compute", post(handlers::compute_predictions))
        .route("/predictions/manual", post(handlers::add_manual_transaction))
        // AI features
        .route("/ai/recommendations", post(handlers::recommendations))
        .route("/ai/savings-tips", post(handlers::savings_tips))
        .route("/ai/budget", post(handlers::budget))
        .route("/ai/insights", post(handlers::spending_insights))
        // Transactions and accounts
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions/by-category", get(handlers::transactions_by_category))
        .route("/accounts", get(handlers::list_accounts))
        // Import
        .route(
            "/import/csv",
            post(handlers::import_csv).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
        );

    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::HeaderName::from_static(USER_ID_HEADER),
    ];

    let cors = if allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new().allow_methods(methods).allow_headers(headers)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server with the given configuration
///
/// Runs until ctrl-c.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config)?;

    check_ai_connection(state.ai.as_ref()).await;
    if !state.store.health_check() {
        warn!(backend = state.store.backend_name(), "⚠️  Transaction store failed its health check");
    }

    let app = create_router(state);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    match ai {
        Some(client) => {
            if client.health_check().await {
                info!("✅ AI backend connected: {} (model: {})", client.host(), client.model());
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  AI backend not configured (set OPENAI_COMPATIBLE_HOST to enable AI features)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a failed operation to a response with a route-specific 500 message
    ///
    /// Client mistakes and a missing AI backend keep their own status.
    pub fn failed(msg: &str, err: pennywise_core::Error) -> Self {
        match err {
            pennywise_core::Error::AiNotConfigured => {
                Self::service_unavailable("AI backend not configured")
            }
            pennywise_core::Error::InvalidData(m) | pennywise_core::Error::Import(m) => {
                Self::bad_request(&m)
            }
            pennywise_core::Error::NotFound(m) => Self::not_found(&m),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: msg.to_string(),
                internal: Some(other.into()),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        match err.downcast::<pennywise_core::Error>() {
            Ok(core) => Self::failed("An internal error occurred", core),
            Err(err) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(err),
            },
        }
    }
}
