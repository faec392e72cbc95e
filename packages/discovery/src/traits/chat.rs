//! Chat model trait for LLM calls.

use async_trait::async_trait;

use crate::error::Result;

/// A single system + user exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
    pub temperature: f32,
    /// Constrain the reply to one JSON object
    pub json: bool,
}

impl CompletionRequest {
    /// JSON-object request with a system prompt.
    pub fn json(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
            temperature,
            json: true,
        }
    }

    /// Free-text request with only a user prompt.
    pub fn text(user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: None,
            user: user.into(),
            temperature,
            json: false,
        }
    }
}

/// LLM backend making exactly one call per `complete`.
///
/// Rate-limit replies must surface as
/// [`TransientError::RateLimited`](crate::error::TransientError::RateLimited)
/// so callers can back off.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
