//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - OpenAI (https://api.openai.com)
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::types::GenerationRequest;
use super::TextGenerator;

/// OpenAI-compatible backend
///
/// Sends one `/v1/chat/completions` request per generation with a system and
/// a user message.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Send a bearer token with every request
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Bound each request by a timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        match Client::builder().timeout(Duration::from_secs(secs)).build() {
            Ok(client) => self.http_client = client,
            Err(e) => warn!(error = %e, "Failed to build HTTP client with timeout, using default"),
        }
        self
    }

    /// Make a chat completion request
    async fn chat_completion(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(0.7),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Ai(format!("OpenAI API error {}: {}", status, body)));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Ai("No response from OpenAI API".into()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl TextGenerator for OpenAICompatibleBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(kind = request.kind.as_str(), model = %self.model, "Requesting completion");
        self.chat_completion(&request.system, &request.prompt).await
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, "AI health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::PromptKind;
    use crate::test_utils::MockChatServer;

    #[tokio::test]
    async fn test_generate_against_mock_server() {
        let server = MockChatServer::start().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "gpt-4o").with_api_key("sk-test");

        assert!(backend.health_check().await);

        let request = GenerationRequest::new(
            PromptKind::Recommendations,
            "You are a financial advisor",
            "Based on these recent transactions: []",
        );
        let text = backend.generate(&request).await.unwrap();
        assert!(text.contains("subscription"));

        let seen = server.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gpt-4o");
        assert_eq!(seen[0].system, "You are a financial advisor");
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer sk-test"));
    }

    #[tokio::test]
    async fn test_error_status_is_single_attempt() {
        let server = MockChatServer::start_failing().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "gpt-4o");

        let request = GenerationRequest::new(PromptKind::Budget, "sys", "prompt");
        let err = backend.generate(&request).await.unwrap_err();
        assert!(matches!(err, Error::Ai(_)));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "gpt-4o").with_timeout(2);
        assert!(!backend.health_check().await);
        let request = GenerationRequest::new(PromptKind::Budget, "sys", "prompt");
        assert!(backend.generate(&request).await.is_err());
    }
}
