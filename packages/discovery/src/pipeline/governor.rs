//! Per-class rate governor.
//!
//! Each API class gets its own GCRA limiter with a burst of one, so two
//! grants of the same class are always at least one class interval apart.
//! A caller that arrives early sleeps the remaining deficit plus uniform
//! jitter before checking again.

use std::fmt;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Jitter, Quota};
use tracing::trace;

use crate::types::config::DiscoveryConfig;

/// Outbound call classes, each with its own minimum interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiClass {
    Search,
    Web,
    Llm,
}

impl fmt::Display for ApiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApiClass::Search => "search",
            ApiClass::Web => "web",
            ApiClass::Llm => "llm",
        })
    }
}

/// Shared gate in front of every outbound call of one pipeline invocation.
pub struct RateGovernor {
    search: Option<DefaultDirectRateLimiter>,
    web: Option<DefaultDirectRateLimiter>,
    llm: Option<DefaultDirectRateLimiter>,
    jitter: Duration,
}

impl RateGovernor {
    /// A zero interval disables gating for that class.
    pub fn new(search: Duration, web: Duration, llm: Duration, jitter: Duration) -> Self {
        Self {
            search: limiter(search),
            web: limiter(web),
            llm: limiter(llm),
            jitter,
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(
            config.search_interval,
            config.web_interval,
            config.llm_interval,
            config.rate_jitter,
        )
    }

    /// No gating at all.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Wait until a call of `class` may go out.
    pub async fn acquire(&self, class: ApiClass) {
        let limiter = match class {
            ApiClass::Search => &self.search,
            ApiClass::Web => &self.web,
            ApiClass::Llm => &self.llm,
        };
        if let Some(limiter) = limiter {
            limiter
                .until_ready_with_jitter(Jitter::up_to(self.jitter))
                .await;
            trace!(class = %class, "rate permit granted");
        }
    }
}

fn limiter(interval: Duration) -> Option<DefaultDirectRateLimiter> {
    Quota::with_period(interval).map(|quota| DefaultDirectRateLimiter::direct(quota))
}
