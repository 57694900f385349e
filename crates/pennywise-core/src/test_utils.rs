//! Test utilities for pennywise-core
//!
//! Provides a mock OpenAI-compatible chat completions server for backend and
//! integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// A chat completion request as the mock server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct MockState {
    failing: bool,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock chat completions server for testing and development
pub struct MockChatServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Start a server that answers every completion with HTTP 500
    pub async fn start_failing() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(failing: bool) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            failing,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Completion requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Models endpoint (health check)
async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "gpt-4o", "object": "model"}]
    }))
}

/// Chat completions endpoint
async fn handle_chat(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let message = |role: &str| {
        body["messages"]
            .as_array()
            .and_then(|msgs| msgs.iter().find(|m| m["role"] == role))
            .and_then(|m| m["content"].as_str())
            .unwrap_or_default()
            .to_string()
    };

    let recorded = RecordedRequest {
        model: body["model"].as_str().unwrap_or_default().to_string(),
        system: message("system"),
        prompt: message("user"),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    let content = reply_for(&recorded.prompt);
    state.requests.lock().unwrap().push(recorded);

    if state.failing {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "mock failure"}})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })),
    )
}

/// Detect what kind of request this is from the user prompt
fn reply_for(prompt: &str) -> &'static str {
    if prompt.contains("50/30/20") {
        "Needs: $2250\nWants: $1350\nSavings: $900"
    } else if prompt.contains("savings tips") {
        "1. Cook at home\nEating out is your biggest variable cost.\n\n2. Cancel unused apps\nTwo app subscriptions have not been used."
    } else if prompt.contains("Identify spending patterns") {
        "Groceries rose this month while transport stayed flat."
    } else {
        "1. Review your subscriptions\nYou pay for two subscription services with overlapping catalogues.\n\n\
         2. Trim grocery runs\nPlanning food purchases weekly avoids impulse buys.\n\n\
         3. Start an emergency fund\nKeep saving a fixed share of each paycheck."
    }
}
