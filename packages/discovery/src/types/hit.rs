//! Search hits and fetched page content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One organic search result, ordered by the search API's relevance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// 1-based position in the result list
    pub rank: usize,
}

impl SearchHit {
    pub fn new(url: impl Into<String>, rank: usize) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            snippet: String::new(),
            rank,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Lower-cased host of the hit URL, if it parses.
    pub fn host(&self) -> Option<String> {
        host_of(&self.url)
    }
}

/// Readable text extracted from a page.
///
/// Only constructed when the text reaches the minimum length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContent {
    pub source_url: String,
    /// Text prefixed with `Source URL: <url>`
    pub text: String,
    /// Character count of the extracted text, excluding the prefix
    pub length: usize,
    pub fetched_at: DateTime<Utc>,
}

impl RawContent {
    pub fn new(source_url: impl Into<String>, body: &str) -> Self {
        let source_url = source_url.into();
        Self {
            text: format!("Source URL: {}\n\n{}", source_url, body),
            length: body.chars().count(),
            source_url,
            fetched_at: Utc::now(),
        }
    }
}

/// Lower-cased host of a URL, without a leading `www.`.
pub fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://www.VenueLook.com/mumbai/banquet"),
            Some("venuelook.com".to_string())
        );
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn test_raw_content_prefix() {
        let content = RawContent::new("https://a.in/x", "hello world");
        assert!(content.text.starts_with("Source URL: https://a.in/x\n\n"));
        assert_eq!(content.length, 11);
    }
}
