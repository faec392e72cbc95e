//! Page fetcher trait.

use async_trait::async_trait;

use crate::error::Result;

/// Downloads raw HTML for one URL.
///
/// Text extraction and the minimum-length rule are applied by
/// [`ContentFetcher`](crate::pipeline::fetch::ContentFetcher).
///
/// # Implementations
///
/// - `HttpPageFetcher` - reqwest with a desktop User-Agent
/// - `MockPageFetcher` - For testing
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String>;
}
