//! Configuration for the discovery pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry schedule for one kind of outbound call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Rate-limit backoff is `rate_limit_base * 2^attempt` plus jitter.
    pub rate_limit_base: Duration,

    /// Upper bound of the uniform jitter added to rate-limit backoff.
    pub rate_limit_jitter: Duration,

    /// Fixed pause after any other failure.
    pub error_delay: Duration,
}

impl RetryPolicy {
    /// Search API schedule: `2^n s + [0, 2 s]` on 429, 1 s otherwise.
    pub fn search() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_base: Duration::from_secs(1),
            rate_limit_jitter: Duration::from_secs(2),
            error_delay: Duration::from_secs(1),
        }
    }

    /// LLM schedule: `2^n s + [0, 0.5 s]` on rate limits.
    pub fn llm() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_base: Duration::from_secs(1),
            rate_limit_jitter: Duration::from_millis(500),
            error_delay: Duration::ZERO,
        }
    }

    /// Same attempt count, no waiting.
    pub fn immediate() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_base: Duration::ZERO,
            rate_limit_jitter: Duration::ZERO,
            error_delay: Duration::ZERO,
        }
    }

    /// Backoff before the retry that follows `attempt` (0-based).
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        self.rate_limit_base * 2u32.saturating_pow(attempt) + jitter(self.rate_limit_jitter)
    }
}

/// Uniform random duration in `[0, max]`.
pub(crate) fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    max.mul_f64(fastrand::f64())
}

/// Configuration for one discovery engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Minimum gap between search API calls. Default: 1.0 s.
    pub search_interval: Duration,

    /// Minimum gap between page fetches. Default: 0.5 s.
    pub web_interval: Duration,

    /// Minimum gap between LLM calls. Default: 1.5 s.
    pub llm_interval: Duration,

    /// Upper bound of the jitter added when a caller has to wait. Default: 0.5 s.
    pub rate_jitter: Duration,

    pub search_retry: RetryPolicy,

    pub llm_retry: RetryPolicy,

    /// Search API request timeout. Default: 20 s.
    pub search_timeout: Duration,

    /// Page fetch timeout. Default: 15 s.
    pub fetch_timeout: Duration,

    /// LLM request timeout. Default: 60 s.
    pub llm_timeout: Duration,

    /// Pause between planner queries. Default: 1.0 s.
    pub query_pause: Duration,

    /// Hits processed per query. Default: 10.
    pub hits_per_query: usize,

    /// Hits requested in the venue "more results" pass. Default: 20.
    pub more_results_limit: usize,

    /// Concurrent per-URL workers. Default: 4.
    pub search_workers: usize,

    /// Concurrent enrichment workers. Default: 3.
    pub enrichment_workers: usize,

    /// Snippets joined for contact and price enrichment. Default: 3.
    pub enrichment_snippets: usize,

    /// Chat model. Default: `mistral-large-latest`.
    pub model: String,

    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,

    /// Characters of page text sent for venues. Default: 3000.
    pub venue_excerpt_chars: usize,

    /// Characters of page text sent for vendors. Default: 5000.
    pub vendor_excerpt_chars: usize,

    /// Shortest page text worth extracting. Default: 200.
    pub min_content_chars: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_interval: Duration::from_millis(1000),
            web_interval: Duration::from_millis(500),
            llm_interval: Duration::from_millis(1500),
            rate_jitter: Duration::from_millis(500),
            search_retry: RetryPolicy::search(),
            llm_retry: RetryPolicy::llm(),
            search_timeout: Duration::from_secs(20),
            fetch_timeout: Duration::from_secs(15),
            llm_timeout: Duration::from_secs(60),
            query_pause: Duration::from_secs(1),
            hits_per_query: 10,
            more_results_limit: 20,
            search_workers: 4,
            enrichment_workers: 3,
            enrichment_snippets: 3,
            model: mistral_client::DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            venue_excerpt_chars: 3000,
            vendor_excerpt_chars: 5000,
            min_content_chars: 200,
        }
    }
}

impl DiscoveryConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// All delays zeroed; counts, caps and limits unchanged.
    pub fn unthrottled() -> Self {
        Self {
            search_interval: Duration::ZERO,
            web_interval: Duration::ZERO,
            llm_interval: Duration::ZERO,
            rate_jitter: Duration::ZERO,
            search_retry: RetryPolicy::immediate(),
            llm_retry: RetryPolicy::immediate(),
            query_pause: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Set per-class minimum intervals.
    pub fn with_intervals(mut self, search: Duration, web: Duration, llm: Duration) -> Self {
        self.search_interval = search;
        self.web_interval = web;
        self.llm_interval = llm;
        self
    }

    /// Set rate jitter.
    pub fn with_rate_jitter(mut self, jitter: Duration) -> Self {
        self.rate_jitter = jitter;
        self
    }

    /// Set the search retry schedule.
    pub fn with_search_retry(mut self, policy: RetryPolicy) -> Self {
        self.search_retry = policy;
        self
    }

    /// Set the LLM retry schedule.
    pub fn with_llm_retry(mut self, policy: RetryPolicy) -> Self {
        self.llm_retry = policy;
        self
    }

    /// Set the pause between planner queries.
    pub fn with_query_pause(mut self, pause: Duration) -> Self {
        self.query_pause = pause;
        self
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set worker pool widths.
    pub fn with_workers(mut self, search: usize, enrichment: usize) -> Self {
        self.search_workers = search.max(1);
        self.enrichment_workers = enrichment.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_limits() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.search_interval, Duration::from_secs(1));
        assert_eq!(config.web_interval, Duration::from_millis(500));
        assert_eq!(config.llm_interval, Duration::from_millis(1500));
        assert_eq!(config.search_workers, 4);
        assert_eq!(config.enrichment_workers, 3);
        assert_eq!(config.model, "mistral-large-latest");
    }

    #[test]
    fn test_unthrottled_keeps_limits() {
        let config = DiscoveryConfig::unthrottled();
        assert!(config.query_pause.is_zero());
        assert!(config.llm_interval.is_zero());
        assert_eq!(config.hits_per_query, 10);
        assert_eq!(config.min_content_chars, 200);
    }

    #[test]
    fn test_rate_limit_backoff_grows() {
        let policy = RetryPolicy::llm();
        let first = policy.rate_limit_backoff(0);
        assert!(first >= Duration::from_secs(1));
        assert!(first <= Duration::from_millis(1500));

        let third = policy.rate_limit_backoff(2);
        assert!(third >= Duration::from_secs(4));
    }
}
