//! Web searcher trait.
//!
//! Implementations make exactly one request per call. Retries, rate
//! governance and `site:` filtering live in
//! [`SearchClient`](crate::pipeline::search::SearchClient) so that every
//! backend, including test doubles, gets the same policy.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::hit::SearchHit;

/// One-shot keyword search against an external search API.
///
/// # Implementations
///
/// - `SerperSearcher` - Serper (Google) API
/// - `MockWebSearcher` - For testing
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search and return up to `limit` organic hits, ranked from 1.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}
