//! Orchestrator: runs planner queries until enough providers are found.
//!
//! Queries run one after another in plan order. The hits of one query are
//! worked in parallel, each URL going
//! `fetch -> extract -> publish` and ending as a [`UrlOutcome`].

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::dedup::dedup;
use super::extract::StructuredExtractor;
use super::fetch::{is_skipped, ContentFetcher};
use super::search::{on_site, required_site, SearchClient};
use super::session::{DropReason, PipelineSession, UrlOutcome};
use crate::error::{DiscoveryError, Result};
use crate::planner::{venue, Specialisation};
use crate::types::config::DiscoveryConfig;
use crate::types::hit::SearchHit;
use crate::types::provider::{Candidate, Provider};
use crate::types::query::Query;

pub const NO_VENUES: &str = "Could not extract venue information from search results";
pub const NO_VENDORS: &str = "Could not extract vendor information from search results";

/// One sweep over a list of queries.
struct Pass<'a> {
    queries: &'a [String],
    /// Offset added to query positions so passes never share an index
    first_index: usize,
    search_limit: usize,
    /// Stop issuing queries at this many distinct names
    target: usize,
    /// Stop publishing at this many distinct names
    cap: usize,
}

#[derive(Clone)]
pub struct Orchestrator {
    search: SearchClient,
    fetcher: ContentFetcher,
    extractor: StructuredExtractor,
    config: DiscoveryConfig,
}

impl Orchestrator {
    pub fn new(
        search: SearchClient,
        fetcher: ContentFetcher,
        extractor: StructuredExtractor,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            search,
            fetcher,
            extractor,
            config,
        }
    }

    /// Gather, deduplicate and cap providers for `query`.
    ///
    /// Returns [`DiscoveryError::EmptyResult`] when nothing usable was found.
    pub async fn run(
        &self,
        session: &PipelineSession,
        specialisation: &Specialisation,
        query: &Query,
    ) -> Result<Vec<Provider>> {
        let plan = specialisation.plan(query);
        let category = specialisation.category;

        if specialisation.is_venue() {
            self.run_pass(
                session,
                specialisation,
                query,
                Pass {
                    queries: &plan.primary,
                    first_index: 0,
                    search_limit: self.config.hits_per_query,
                    target: venue::FIRST_PASS_TARGET,
                    cap: venue::CAP,
                },
            )
            .await;

            if session.distinct_names() < venue::FIRST_PASS_TARGET {
                debug!(
                    found = session.distinct_names(),
                    "venue first pass short, running more-results pass"
                );
                self.run_pass(
                    session,
                    specialisation,
                    query,
                    Pass {
                        queries: &plan.fallback,
                        first_index: plan.primary.len(),
                        search_limit: self.config.more_results_limit,
                        target: venue::CAP,
                        cap: venue::CAP,
                    },
                )
                .await;
            }
        } else {
            self.run_pass(
                session,
                specialisation,
                query,
                Pass {
                    queries: &plan.primary,
                    first_index: 0,
                    search_limit: self.config.hits_per_query,
                    target: category.target(),
                    cap: category.cap(),
                },
            )
            .await;
        }

        let published = session.take_results();
        let total = published.len();
        let named: Vec<_> = published.into_iter().filter(|c| c.has_name()).collect();
        if named.len() < total {
            debug!(
                dropped = total - named.len(),
                "excluding nameless venue records from dedup"
            );
        }

        let providers = finish(named, specialisation)?;
        info!(
            category = %category,
            candidates = total,
            providers = providers.len(),
            "orchestration complete"
        );
        Ok(providers)
    }

    async fn run_pass(
        &self,
        session: &PipelineSession,
        specialisation: &Specialisation,
        query: &Query,
        pass: Pass<'_>,
    ) {
        let token = session.pass_token();

        for (offset, search_query) in pass.queries.iter().enumerate() {
            if token.is_cancelled() || session.distinct_names() >= pass.target {
                debug!(found = session.distinct_names(), "target reached, no more queries");
                break;
            }
            if offset > 0 && !self.config.query_pause.is_zero() {
                tokio::time::sleep(self.config.query_pause).await;
            }

            let hits = self.search.search(search_query, pass.search_limit).await;
            if hits.is_empty() {
                debug!(query = %search_query, "no hits");
                continue;
            }

            let query_index = pass.first_index + offset;
            let site = required_site(search_query);
            let mut work = Vec::new();
            let mut dropped = 0usize;

            for hit in hits.into_iter().take(self.config.hits_per_query) {
                match admit(session, &hit, site.as_deref()) {
                    Ok(()) => work.push(hit),
                    Err(reason) => {
                        debug!(url = %hit.url, reason = %reason, "hit dropped");
                        dropped += 1;
                    }
                }
            }

            let outcomes: Vec<UrlOutcome> = stream::iter(work)
                .map(|hit| {
                    self.process_url(session, specialisation, query, hit, query_index, pass.cap, &token)
                })
                .buffer_unordered(self.config.search_workers.max(1))
                .collect()
                .await;

            let published = outcomes
                .iter()
                .filter(|o| matches!(o, UrlOutcome::Published))
                .count();
            info!(
                query = %search_query,
                published,
                dropped = dropped + outcomes.len() - published,
                found = session.distinct_names(),
                "query processed"
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_url(
        &self,
        session: &PipelineSession,
        specialisation: &Specialisation,
        query: &Query,
        hit: SearchHit,
        query_index: usize,
        cap: usize,
        token: &CancellationToken,
    ) -> UrlOutcome {
        let outcome = self
            .fetch_extract_publish(session, specialisation, query, &hit, query_index, cap, token)
            .await;
        if let UrlOutcome::Dropped(reason) = outcome {
            debug!(url = %hit.url, reason = %reason, "url dropped");
        }
        outcome
    }

    #[allow(clippy::too_many_arguments)]
    async fn fetch_extract_publish(
        &self,
        session: &PipelineSession,
        specialisation: &Specialisation,
        query: &Query,
        hit: &SearchHit,
        query_index: usize,
        cap: usize,
        token: &CancellationToken,
    ) -> UrlOutcome {
        if token.is_cancelled() {
            return UrlOutcome::Dropped(DropReason::TargetReached);
        }

        let selectors = specialisation.category.content_selectors();
        let content = match self.fetcher.try_fetch(&hit.url, selectors).await {
            Ok(content) => content,
            Err(reason) => return UrlOutcome::Dropped(reason),
        };

        let Some(candidate) = self.extractor.extract(&content, specialisation, query).await else {
            return UrlOutcome::Dropped(DropReason::ExtractionFailed);
        };

        // Nameless venue records are still published; vendors drop them here.
        if !candidate.has_name() && !specialisation.is_venue() {
            return UrlOutcome::Dropped(DropReason::MissingName);
        }

        session.publish(candidate.observed_at(query_index, hit.rank), cap, token)
    }
}

/// Deduplicate and cap, reporting nothing usable as
/// [`DiscoveryError::EmptyResult`].
///
/// A nameless record reaching dedup is logged and treated as an empty run,
/// so [`DiscoveryError::Invariant`] never reaches the caller.
fn finish(candidates: Vec<Candidate>, specialisation: &Specialisation) -> Result<Vec<Provider>> {
    let empty = || {
        let message = if specialisation.is_venue() {
            NO_VENUES
        } else {
            NO_VENDORS
        };
        DiscoveryError::EmptyResult(message.to_string())
    };

    if candidates.is_empty() {
        return Err(empty());
    }

    match dedup(candidates, specialisation.category.cap()) {
        Ok(providers) => Ok(providers),
        Err(DiscoveryError::Invariant(message)) => {
            error!(%message, "dedup invariant violated");
            Err(empty())
        }
        Err(e) => Err(e),
    }
}

/// Pre-flight checks run before a hit is handed to a worker.
fn admit(
    session: &PipelineSession,
    hit: &SearchHit,
    site: Option<&str>,
) -> std::result::Result<(), DropReason> {
    if is_skipped(&hit.url) {
        return Err(DropReason::Skipped);
    }
    if let Some(domain) = site {
        if !on_site(&hit.url, domain) {
            return Err(DropReason::OffSite);
        }
    }
    if !session.claim_url(&hit.url) {
        return Err(DropReason::AlreadyProcessed);
    }
    Ok(())
}
