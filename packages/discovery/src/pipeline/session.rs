//! Per-invocation shared state.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::governor::RateGovernor;
use crate::types::provider::Candidate;

/// Why a URL ended without publishing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    AlreadyProcessed,
    Skipped,
    OffSite,
    FetchFailed,
    ShortContent,
    ExtractionFailed,
    MissingName,
    Duplicate,
    TargetReached,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DropReason::AlreadyProcessed => "already processed",
            DropReason::Skipped => "skip-listed",
            DropReason::OffSite => "off required site",
            DropReason::FetchFailed => "fetch failed",
            DropReason::ShortContent => "content too short",
            DropReason::ExtractionFailed => "extraction failed",
            DropReason::MissingName => "no name",
            DropReason::Duplicate => "duplicate name",
            DropReason::TargetReached => "target reached",
        })
    }
}

/// Terminal state of one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlOutcome {
    Published,
    Dropped(DropReason),
}

#[derive(Debug, Default)]
struct SessionState {
    results: Vec<Candidate>,
    seen_names: HashSet<String>,
    processed_urls: HashSet<String>,
}

/// State shared by every worker of one discovery call.
///
/// Nothing here outlives the call.
pub struct PipelineSession {
    pub id: Uuid,
    pub governor: Arc<RateGovernor>,
    state: Mutex<SessionState>,
    root: CancellationToken,
}

impl PipelineSession {
    pub fn new(governor: Arc<RateGovernor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            governor,
            state: Mutex::new(SessionState::default()),
            root: CancellationToken::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Token for one pass; cancelling the session cancels every pass.
    pub fn pass_token(&self) -> CancellationToken {
        self.root.child_token()
    }

    pub fn cancel(&self) {
        self.root.cancel();
    }

    /// Mark `url` processed. False if it already was.
    pub fn claim_url(&self, url: &str) -> bool {
        self.state().processed_urls.insert(url.to_string())
    }

    /// Distinct names published so far.
    pub fn distinct_names(&self) -> usize {
        self.state().seen_names.len()
    }

    /// Publish a candidate toward `target` distinct names.
    ///
    /// Named duplicates are kept so dedup can pick the most complete one,
    /// but only new names count toward the target. Reaching it cancels
    /// `token`.
    pub fn publish(
        &self,
        candidate: Candidate,
        target: usize,
        token: &CancellationToken,
    ) -> UrlOutcome {
        let mut state = self.state();

        if token.is_cancelled() || state.seen_names.len() >= target {
            return UrlOutcome::Dropped(DropReason::TargetReached);
        }

        let duplicate = match candidate.dedup_key() {
            Some(key) => !state.seen_names.insert(key),
            None => false,
        };
        state.results.push(candidate);

        if state.seen_names.len() >= target {
            token.cancel();
        }

        if duplicate {
            UrlOutcome::Dropped(DropReason::Duplicate)
        } else {
            UrlOutcome::Published
        }
    }

    /// Everything published, in publication order.
    pub fn take_results(&self) -> Vec<Candidate> {
        std::mem::take(&mut self.state().results)
    }
}
