//! HTTP page fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use tracing::debug;

use crate::error::{DiscoveryError, Result, TransientError};
use crate::traits::fetcher::PageFetcher;

/// Browser-like User-Agent; many listing sites refuse obvious bots.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain reqwest fetcher with a desktop User-Agent.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-IN,en;q=0.8"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DESKTOP_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(DiscoveryError::http)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Transient(TransientError::Status {
                status: status.as_u16(),
                target: url.to_string(),
            }));
        }

        Ok(response.text().await?)
    }
}
