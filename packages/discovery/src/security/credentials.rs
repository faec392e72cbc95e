//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of sensitive values.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

use crate::error::{DiscoveryError, Result};

/// Environment variable holding the search API key.
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";

/// Environment variable holding the LLM API key.
pub const MISTRAL_API_KEY: &str = "MISTRAL_API_KEY";

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// API keys for the live search and LLM services.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub serper_api_key: SecretString,
    pub mistral_api_key: SecretString,
}

impl Credentials {
    pub fn new(serper_api_key: impl Into<String>, mistral_api_key: impl Into<String>) -> Self {
        Self {
            serper_api_key: SecretString::new(serper_api_key),
            mistral_api_key: SecretString::new(mistral_api_key),
        }
    }

    /// Read both keys from the process environment.
    ///
    /// A missing or blank key is a [`DiscoveryError::Config`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let missing: Vec<&str> = [SERPER_API_KEY, MISTRAL_API_KEY]
            .into_iter()
            .filter(|name| lookup(name).map_or(true, |v| v.trim().is_empty()))
            .collect();

        if !missing.is_empty() {
            return Err(DiscoveryError::Config(format!(
                "{} not set",
                missing.join(", ")
            )));
        }

        Ok(Self::new(
            lookup(SERPER_API_KEY).unwrap_or_default().trim(),
            lookup(MISTRAL_API_KEY).unwrap_or_default().trim(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_is_redacted() {
        let secret = SecretString::new("sk-very-secret");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-very-secret");
    }

    #[test]
    fn test_missing_keys_are_config_errors() {
        let err = Credentials::from_lookup(|name| {
            (name == SERPER_API_KEY).then(|| "serper".to_string())
        })
        .unwrap_err();

        match err {
            DiscoveryError::Config(message) => assert!(message.contains(MISTRAL_API_KEY)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let result = Credentials::from_lookup(|_| Some("  ".to_string()));
        assert!(matches!(result, Err(DiscoveryError::Config(_))));
    }

    #[test]
    fn test_both_keys_present() {
        let creds = Credentials::from_lookup(|name| Some(format!("{name}-value"))).unwrap();
        assert_eq!(creds.serper_api_key.expose(), "SERPER_API_KEY-value");
        assert_eq!(creds.mistral_api_key.expose(), "MISTRAL_API_KEY-value");
    }
}
