//! Error types for the Mistral client.

use thiserror::Error;

/// Result type for Mistral client operations.
pub type Result<T> = std::result::Result<T, MistralError>;

/// Mistral client errors.
#[derive(Debug, Error)]
pub enum MistralError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 429 or a body that reports a rate limit
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// API error (non-2xx response, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl MistralError {
    /// Whether the caller should back off before retrying.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            MistralError::RateLimited(_) => true,
            MistralError::Api { message, .. } => message.to_lowercase().contains("rate limit"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(MistralError::RateLimited("slow down".into()).is_rate_limited());
        assert!(MistralError::Api {
            status: 400,
            message: "Rate limit exceeded for model".into()
        }
        .is_rate_limited());
        assert!(!MistralError::Network("connection reset".into()).is_rate_limited());
    }
}
