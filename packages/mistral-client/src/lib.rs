//! Pure Mistral REST API client
//!
//! A minimal client for the Mistral chat-completions endpoint with no
//! domain-specific logic. Supports plain completions and JSON-object mode.
//!
//! # Example
//!
//! ```rust,ignore
//! use mistral_client::{ChatRequest, Message, MistralClient};
//!
//! let client = MistralClient::from_env()?;
//!
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new("mistral-large-latest")
//!             .message(Message::system("Reply in JSON"))
//!             .message(Message::user("Name three colours"))
//!             .temperature(0.1)
//!             .json_object(),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{MistralError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

/// Default chat model.
pub const DEFAULT_MODEL: &str = "mistral-large-latest";

const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Pure Mistral API client.
#[derive(Clone)]
pub struct MistralClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl MistralClient {
    /// Create a new Mistral client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `MISTRAL_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MISTRAL_API_KEY")
            .map_err(|_| MistralError::Config("MISTRAL_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies, self-hosted gateways, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a per-request timeout.
    ///
    /// Fails if the HTTP client cannot be built with it.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MistralError::Config(format!("HTTP client: {e}")))?;
        Ok(self)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get a response.
    /// A 429 status, or an error body mentioning a rate limit, maps to
    /// [`MistralError::RateLimited`] so callers can back off.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Mistral request failed");
                MistralError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Mistral API error");
            if status == StatusCode::TOO_MANY_REQUESTS
                || error_text.to_lowercase().contains("rate limit")
            {
                return Err(MistralError::RateLimited(error_text));
            }
            return Err(MistralError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| MistralError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MistralError::Parse("No content in Mistral response".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Mistral chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = MistralClient::new("test-key").with_base_url("https://gateway.local/v1");

        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url(), "https://gateway.local/v1");
    }

    #[test]
    fn test_with_timeout_keeps_settings() {
        let client = MistralClient::new("k")
            .with_base_url("https://gateway.local/v1")
            .with_timeout(Duration::from_secs(30))
            .unwrap();
        assert_eq!(client.base_url(), "https://gateway.local/v1");
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(MistralClient::new("k").base_url(), "https://api.mistral.ai/v1");
    }
}
