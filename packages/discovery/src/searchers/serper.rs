//! Serper (Google Search) backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DiscoveryError, Result, TransientError};
use crate::security::SecretString;
use crate::traits::searcher::WebSearcher;
use crate::types::hit::SearchHit;

const SERPER_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Serper-backed searcher: one POST per call, no retries.
pub struct SerperSearcher {
    api_key: SecretString,
    client: reqwest::Client,
    endpoint: String,
}

impl SerperSearcher {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DiscoveryError::http)?;

        Ok(Self {
            api_key,
            client,
            endpoint: SERPER_URL.to_string(),
        })
    }

    /// Point at a different endpoint (proxies, recorded fixtures).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl WebSearcher for SerperSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        debug!(query, limit, "Serper search");

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", self.api_key.expose())
            .header("Content-Type", "application/json")
            .json(&SerperRequest { q: query, num: limit })
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!(query, "Serper rate limited");
            return Err(TransientError::RateLimited.into());
        }
        if !status.is_success() {
            return Err(DiscoveryError::Transient(TransientError::Status {
                status: status.as_u16(),
                target: self.endpoint.clone(),
            }));
        }

        let body: SerperResponse = response.json().await?;

        Ok(body
            .organic
            .into_iter()
            .filter(|r| !r.link.is_empty())
            .take(limit)
            .enumerate()
            .map(|(i, r)| {
                SearchHit::new(r.link, i + 1)
                    .with_title(r.title)
                    .with_snippet(r.snippet)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_timeout() {
        let searcher = SerperSearcher::new(SecretString::new("key"), Duration::from_secs(20)).unwrap();
        assert_eq!(searcher.endpoint, SERPER_URL);
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(SerperRequest { q: "cake Pune", num: 10 }).unwrap();
        assert_eq!(body, serde_json::json!({ "q": "cake Pune", "num": 10 }));
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let body: SerperResponse = serde_json::from_str(
            r#"{"organic":[{"link":"https://a.in","title":"A"},{"title":"no link"}]}"#,
        )
        .unwrap();
        assert_eq!(body.organic.len(), 2);
        assert_eq!(body.organic[0].snippet, "");

        let empty: SerperResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.organic.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_search() {
        let key = std::env::var("SERPER_API_KEY").expect("SERPER_API_KEY required");
        let searcher = SerperSearcher::new(SecretString::new(key), Duration::from_secs(20)).unwrap();
        let hits = searcher.search("banquet hall Mumbai", 5).await.unwrap();
        assert!(!hits.is_empty());
    }
}
