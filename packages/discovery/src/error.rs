//! Typed errors for the discovery pipeline.
//!
//! Transient and extraction failures are recovered inside the pipeline;
//! only `Config`, `EmptyResult` and `InvalidQuery` reach the caller of
//! [`Discovery::discover`](crate::Discovery::discover).

use thiserror::Error;

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Missing or unusable credentials
    #[error("config error: {0}")]
    Config(String),

    /// Rate limits, timeouts and network failures
    #[error("transient failure: {0}")]
    Transient(#[from] TransientError),

    /// LLM returned something that is not a usable record
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// No query produced a usable provider
    #[error("{0}")]
    EmptyResult(String),

    /// A record without a name reached deduplication
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Query failed validation
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Failures worth retrying with backoff.
#[derive(Debug, Error)]
pub enum TransientError {
    /// HTTP 429 or an equivalent "rate limit" reply
    #[error("rate limited")]
    RateLimited,

    /// Request did not complete in time
    #[error("timeout: {target}")]
    Timeout { target: String },

    /// Non-2xx response
    #[error("HTTP status {status} from {target}")]
    Status { status: u16, target: String },

    /// Connection, TLS or body read failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DiscoveryError {
    /// Human message used in the `[{ "error": ... }]` boundary shape.
    pub fn sentinel_message(&self) -> String {
        match self {
            DiscoveryError::Config(_) => "Missing API keys".to_string(),
            DiscoveryError::EmptyResult(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this failure came from a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DiscoveryError::Transient(TransientError::RateLimited))
    }

    pub(crate) fn http(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        DiscoveryError::Transient(TransientError::Http(Box::new(e)))
    }
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(e: reqwest::Error) -> Self {
        let target = e
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        if e.is_timeout() {
            return DiscoveryError::Transient(TransientError::Timeout { target });
        }
        match e.status() {
            Some(status) if status.as_u16() == 429 => {
                DiscoveryError::Transient(TransientError::RateLimited)
            }
            Some(status) => DiscoveryError::Transient(TransientError::Status {
                status: status.as_u16(),
                target,
            }),
            None => DiscoveryError::http(e),
        }
    }
}

impl From<mistral_client::MistralError> for DiscoveryError {
    fn from(e: mistral_client::MistralError) -> Self {
        use mistral_client::MistralError;

        if e.is_rate_limited() {
            return DiscoveryError::Transient(TransientError::RateLimited);
        }
        match e {
            MistralError::Config(message) => DiscoveryError::Config(message),
            MistralError::Parse(message) => DiscoveryError::Extraction(message),
            other => DiscoveryError::http(other),
        }
    }
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_messages() {
        assert_eq!(
            DiscoveryError::Config("SERPER_API_KEY not set".into()).sentinel_message(),
            "Missing API keys"
        );
        assert_eq!(
            DiscoveryError::EmptyResult("Could not extract venue information".into())
                .sentinel_message(),
            "Could not extract venue information"
        );
    }

    #[test]
    fn test_mistral_rate_limit_maps_to_transient() {
        let err: DiscoveryError = mistral_client::MistralError::RateLimited("429".into()).into();
        assert!(err.is_rate_limited());

        let err: DiscoveryError = mistral_client::MistralError::Parse("bad".into()).into();
        assert!(matches!(err, DiscoveryError::Extraction(_)));
    }
}
