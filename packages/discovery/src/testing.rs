//! Testing utilities including mock implementations.
//!
//! These let applications and tests drive the full pipeline without making
//! real search, HTTP or LLM calls. Every mock records its calls with a
//! timestamp so tests can assert on ordering and rate governance.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::error::{DiscoveryError, Result, TransientError};
use crate::traits::{
    chat::{ChatModel, CompletionRequest},
    fetcher::PageFetcher,
    searcher::WebSearcher,
};
use crate::types::hit::SearchHit;

/// A scripted failure a mock can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Surfaces as `TransientError::RateLimited`
    RateLimited,
    /// Surfaces as a generic HTTP error
    Network,
    /// Surfaces as `DiscoveryError::Extraction`, like a reply with no content
    EmptyReply,
}

impl MockFailure {
    fn into_error(self) -> DiscoveryError {
        match self {
            MockFailure::RateLimited => TransientError::RateLimited.into(),
            MockFailure::Network => DiscoveryError::http(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "mock network failure",
            )),
            MockFailure::EmptyReply => {
                DiscoveryError::Extraction("No content in mock response".to_string())
            }
        }
    }
}

/// Record of a call made to a mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Query, URL or user prompt
    pub input: String,
    pub at: Instant,
}

fn record(calls: &RwLock<Vec<MockCall>>, input: &str) {
    calls.write().unwrap().push(MockCall {
        input: input.to_string(),
        at: Instant::now(),
    });
}

// =============================================================================
// Search
// =============================================================================

/// Mock web searcher.
///
/// Lookup order: exact query, then the first registered substring rule,
/// then the default hit list.
#[derive(Default, Clone)]
pub struct MockWebSearcher {
    exact: Arc<RwLock<HashMap<String, Vec<SearchHit>>>>,
    containing: Arc<RwLock<Vec<(String, Vec<SearchHit>)>>>,
    default_hits: Arc<RwLock<Vec<SearchHit>>>,
    failures: Arc<RwLock<VecDeque<MockFailure>>>,
    always_fail: Arc<RwLock<Option<MockFailure>>>,
    calls: Arc<RwLock<Vec<MockCall>>>,
}

impl MockWebSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits for one exact query string.
    pub fn with_hits(self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.exact.write().unwrap().insert(query.to_string(), hits);
        self
    }

    /// Hits for any query containing `needle`.
    pub fn with_hits_containing(self, needle: &str, hits: Vec<SearchHit>) -> Self {
        self.containing
            .write()
            .unwrap()
            .push((needle.to_string(), hits));
        self
    }

    /// Hits for any query without a more specific rule.
    pub fn with_default_hits(self, hits: Vec<SearchHit>) -> Self {
        *self.default_hits.write().unwrap() = hits;
        self
    }

    /// Fail the next calls, in order, before answering normally.
    pub fn with_failures(self, failures: impl IntoIterator<Item = MockFailure>) -> Self {
        self.failures.write().unwrap().extend(failures);
        self
    }

    /// Fail every call.
    pub fn always_failing(self, failure: MockFailure) -> Self {
        *self.always_fail.write().unwrap() = Some(failure);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// Queries in call order.
    pub fn queries(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.input).collect()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        record(&self.calls, query);

        if let Some(failure) = *self.always_fail.read().unwrap() {
            return Err(failure.into_error());
        }
        if let Some(failure) = self.failures.write().unwrap().pop_front() {
            return Err(failure.into_error());
        }

        let mut hits = if let Some(hits) = self.exact.read().unwrap().get(query) {
            hits.clone()
        } else if let Some((_, hits)) = self
            .containing
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
        {
            hits.clone()
        } else {
            self.default_hits.read().unwrap().clone()
        };

        hits.truncate(limit);
        Ok(hits)
    }
}

// =============================================================================
// Fetch
// =============================================================================

/// Mock page fetcher serving canned HTML by URL.
#[derive(Default, Clone)]
pub struct MockPageFetcher {
    pages: Arc<RwLock<HashMap<String, String>>>,
    default_page: Arc<RwLock<Option<String>>>,
    always_fail: Arc<RwLock<Option<MockFailure>>>,
    calls: Arc<RwLock<Vec<MockCall>>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.to_string(), html.into());
        self
    }

    /// HTML served for URLs without a page of their own.
    pub fn with_default_page(self, html: impl Into<String>) -> Self {
        *self.default_page.write().unwrap() = Some(html.into());
        self
    }

    pub fn always_failing(self, failure: MockFailure) -> Self {
        *self.always_fail.write().unwrap() = Some(failure);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// URLs in call order.
    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.input).collect()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        record(&self.calls, url);

        if let Some(failure) = *self.always_fail.read().unwrap() {
            return Err(failure.into_error());
        }

        let page = self.pages.read().unwrap().get(url).cloned();
        page.or_else(|| self.default_page.read().unwrap().clone())
            .ok_or_else(|| {
                DiscoveryError::Transient(TransientError::Status {
                    status: 404,
                    target: url.to_string(),
                })
            })
    }
}

// =============================================================================
// Chat
// =============================================================================

/// One scripted chat reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Fail(MockFailure),
}

impl MockReply {
    pub fn text(body: impl Into<String>) -> Self {
        MockReply::Text(body.into())
    }

    pub fn json(value: serde_json::Value) -> Self {
        MockReply::Text(value.to_string())
    }
}

/// Mock chat model answering by substring of the user prompt.
///
/// A rule holds a queue of replies; each call pops one, and the last reply
/// repeats once the queue is down to one.
#[derive(Default, Clone)]
pub struct MockChatModel {
    rules: Arc<RwLock<Vec<(String, VecDeque<MockReply>)>>>,
    default_reply: Arc<RwLock<Option<MockReply>>>,
    calls: Arc<RwLock<Vec<MockCall>>>,
    requests: Arc<RwLock<Vec<CompletionRequest>>>,
}

impl MockChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to prompts containing `needle`.
    pub fn with_reply_containing(self, needle: &str, reply: MockReply) -> Self {
        self.with_replies_containing(needle, vec![reply])
    }

    /// Replies, in order, to prompts containing `needle`.
    pub fn with_replies_containing(self, needle: &str, replies: Vec<MockReply>) -> Self {
        self.rules
            .write()
            .unwrap()
            .push((needle.to_string(), replies.into()));
        self
    }

    /// Reply to prompts no rule matches. Without one, such calls fail.
    pub fn with_default_reply(self, reply: MockReply) -> Self {
        *self.default_reply.write().unwrap() = Some(reply);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.read().unwrap().clone()
    }

    fn next_reply(&self, prompt: &str) -> Option<MockReply> {
        let mut rules = self.rules.write().unwrap();
        if let Some((_, replies)) = rules
            .iter_mut()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
        {
            return if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            };
        }
        self.default_reply.read().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        record(&self.calls, &request.user);
        self.requests.write().unwrap().push(request.clone());

        match self.next_reply(&request.user) {
            Some(MockReply::Text(body)) => Ok(body),
            Some(MockReply::Fail(failure)) => Err(failure.into_error()),
            None => Err(MockFailure::Network.into_error()),
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// An HTML page whose body is one paragraph of `chars` characters.
pub fn html_page(title: &str, chars: usize) -> String {
    let sentence = "Spacious banquet hall with lawn, catering and decor for weddings. ";
    let body: String = sentence.chars().cycle().take(chars).collect();
    format!(
        "<html><head><title>{title}</title></head><body><p>{}</p></body></html>",
        body.trim_end()
    )
}
