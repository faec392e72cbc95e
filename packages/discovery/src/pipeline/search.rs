//! Search client: governed, retried, site-filtered web search.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::governor::{ApiClass, RateGovernor};
use crate::traits::searcher::WebSearcher;
use crate::types::config::RetryPolicy;
use crate::types::hit::SearchHit;

lazy_static! {
    static ref SITE_OPERATOR: Regex = Regex::new(r"site:(\S+)").unwrap();
}

/// Domain named by a `site:` operator in `query`, lowercased.
pub fn required_site(query: &str) -> Option<String> {
    SITE_OPERATOR
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_start_matches("www.").to_lowercase())
}

/// Whether `url` lives on a host containing `domain`.
pub fn on_site(url: &str, domain: &str) -> bool {
    crate::types::hit::host_of(url).is_some_and(|host| host.contains(domain))
}

/// Wraps a raw [`WebSearcher`] with the governor, retries and `site:` filtering.
///
/// Never fails: exhausted retries yield an empty list.
#[derive(Clone)]
pub struct SearchClient {
    searcher: Arc<dyn WebSearcher>,
    governor: Arc<RateGovernor>,
    retry: RetryPolicy,
}

impl SearchClient {
    pub fn new(
        searcher: Arc<dyn WebSearcher>,
        governor: Arc<RateGovernor>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            searcher,
            governor,
            retry,
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let attempts = self.retry.max_attempts.max(1);

        for attempt in 0..attempts {
            self.governor.acquire(ApiClass::Search).await;

            match self.searcher.search(query, limit).await {
                Ok(hits) => {
                    let hits = filter_to_site(query, hits, limit);
                    debug!(query = %query, count = hits.len(), "search complete");
                    return hits;
                }
                Err(e) if e.is_rate_limited() => {
                    let wait = self.retry.rate_limit_backoff(attempt);
                    warn!(query = %query, attempt, wait_ms = wait.as_millis() as u64, "search rate limited");
                    if attempt + 1 < attempts {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => {
                    warn!(query = %query, attempt, error = %e, "search failed");
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.retry.error_delay).await;
                    }
                }
            }
        }

        warn!(query = %query, "search gave up after {} attempts", attempts);
        Vec::new()
    }
}

/// Keep only hits on the `site:` domain (if any), re-rank from 1, cap at `limit`.
fn filter_to_site(query: &str, hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    let site = required_site(query);

    hits.into_iter()
        .filter(|hit| match &site {
            Some(domain) => on_site(&hit.url, domain),
            None => true,
        })
        .take(limit)
        .enumerate()
        .map(|(i, mut hit)| {
            hit.rank = i + 1;
            hit
        })
        .collect()
}
