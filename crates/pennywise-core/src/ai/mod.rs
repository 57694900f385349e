//! Pluggable AI text-generation backends
//!
//! # Architecture
//!
//! - `TextGenerator` trait: one prompt in, free text out
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! Every call makes exactly one request. Failures are returned to the caller
//! without retry.
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_config(&config.ai);
//!
//! if let Some(ref client) = ai {
//!     let text = client.generate(&request).await?;
//! }
//! ```

mod mock;
mod openai_compatible;
pub mod types;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{AiBackendKind, AiConfig};
use crate::error::Result;

/// Trait defining the interface for all text backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a system + user prompt
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI-compatible backend (OpenAI, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for demos and tests
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from configuration
    ///
    /// Returns None when AI is disabled, or when the OpenAI-compatible
    /// backend has no host configured.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let client = match config.backend {
            AiBackendKind::None => return None,
            AiBackendKind::Mock => AIClient::Mock(MockBackend::new()),
            AiBackendKind::OpenAICompatible => {
                let Some(host) = config.host.as_deref() else {
                    warn!("No AI host configured, AI features disabled");
                    return None;
                };
                let mut backend = OpenAICompatibleBackend::new(host, &config.model)
                    .with_timeout(config.timeout_secs);
                if let Some(key) = config.api_key.as_deref() {
                    backend = backend.with_api_key(key);
                }
                AIClient::OpenAICompatible(backend)
            }
        };

        info!(host = client.host(), model = client.model(), "AI backend configured");
        Some(client)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement TextGenerator for AIClient by delegating to the inner backend
#[async_trait]
impl TextGenerator for AIClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.generate(request).await,
            AIClient::Mock(b) => b.generate(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_from_config_disabled() {
        let mut config = Config::default().ai;
        config.backend = AiBackendKind::None;
        config.host = Some("http://localhost:8080".into());
        assert!(AIClient::from_config(&config).is_none());
    }

    #[test]
    fn test_from_config_requires_host() {
        let config = Config::default().ai;
        assert!(config.host.is_none());
        assert!(AIClient::from_config(&config).is_none());
    }

    #[test]
    fn test_from_config_openai_compatible() {
        let mut config = Config::default().ai;
        config.host = Some("http://localhost:8080/".into());
        config.model = "llama3.2".into();

        let client = AIClient::from_config(&config).unwrap();
        assert!(matches!(client, AIClient::OpenAICompatible(_)));
        assert_eq!(client.host(), "http://localhost:8080");
        assert_eq!(client.model(), "llama3.2");
    }

    #[tokio::test]
    async fn test_mock_client_generates() {
        let client = AIClient::mock();
        assert!(client.health_check().await);
        let text = client
            .generate(&GenerationRequest::new(PromptKind::SavingsTips, "sys", "prompt"))
            .await
            .unwrap();
        assert!(!text.is_empty());
    }
}
