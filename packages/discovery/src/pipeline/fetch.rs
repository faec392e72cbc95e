//! Content fetcher: governed page download plus readable-text extraction.
//!
//! Extraction falls through three stages until one yields enough text:
//!
//! 1. Readability: the `<body>` with boilerplate removed, converted by `htmd`
//! 2. Containers: category selectors, then generic `main`/`article`/...
//! 3. Every `<p>` on the page, joined

use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::debug;

use super::governor::{ApiClass, RateGovernor};
use super::session::DropReason;
use crate::traits::fetcher::PageFetcher;
use crate::types::hit::RawContent;

/// Hosts and extensions never worth fetching.
pub const SKIP_PATTERNS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "twitter.com",
    "pinterest.",
    ".pdf",
];

const GENERIC_SELECTORS: &[&str] = &["main", "article", ".content", "#content"];

const BOILERPLATE: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    "form",
    ".nav",
    ".navbar",
    ".header",
    ".footer",
    ".sidebar",
    ".menu",
    ".advertisement",
    ".ads",
    ".cookie-banner",
    "#nav",
    "#header",
    "#footer",
    "#sidebar",
    "script",
    "style",
    "noscript",
    "iframe",
    "svg",
];

/// Whether `url` matches the social/PDF skip-list.
pub fn is_skipped(url: &str) -> bool {
    let lower = url.to_lowercase();
    SKIP_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

#[derive(Clone)]
pub struct ContentFetcher {
    fetcher: Arc<dyn PageFetcher>,
    governor: Arc<RateGovernor>,
    min_chars: usize,
}

impl ContentFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, governor: Arc<RateGovernor>, min_chars: usize) -> Self {
        Self {
            fetcher,
            governor,
            min_chars,
        }
    }

    /// Download `url` and extract at least `min_chars` of readable text.
    ///
    /// `selectors` are the category containers tried before the generic
    /// ones. Any failure yields `None`.
    pub async fn fetch(&self, url: &str, selectors: &[&str]) -> Option<RawContent> {
        self.try_fetch(url, selectors).await.ok()
    }

    /// Like [`fetch`](Self::fetch), but says why nothing came back.
    pub async fn try_fetch(
        &self,
        url: &str,
        selectors: &[&str],
    ) -> std::result::Result<RawContent, DropReason> {
        if is_skipped(url) {
            debug!(url = %url, "skip-listed");
            return Err(DropReason::Skipped);
        }

        self.governor.acquire(ApiClass::Web).await;

        let html = self.fetcher.fetch_html(url).await.map_err(|e| {
            debug!(url = %url, error = %e, "fetch failed");
            DropReason::FetchFailed
        })?;

        match extract_text(&html, selectors, self.min_chars) {
            Some(text) => Ok(RawContent::new(url, &text)),
            None => {
                debug!(url = %url, "page text below {} chars", self.min_chars);
                Err(DropReason::ShortContent)
            }
        }
    }
}

/// Readable text of `html`, or `None` if no stage reaches `min_chars`.
pub fn extract_text(html: &str, selectors: &[&str], min_chars: usize) -> Option<String> {
    let long_enough = |text: &String| text.chars().count() >= min_chars;

    let document = Html::parse_document(html);

    let readable = readable_text(&document);
    if long_enough(&readable) {
        return Some(readable);
    }

    for selector in selectors.iter().chain(GENERIC_SELECTORS) {
        if let Some(text) = container_text(&document, selector).filter(long_enough) {
            return Some(text);
        }
    }

    Some(paragraph_text(&document)).filter(long_enough)
}

fn readable_text(document: &Html) -> String {
    let Some(body) = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
    else {
        return String::new();
    };

    let html = remove_boilerplate(&body.html());
    let text = htmd::convert(&html).unwrap_or_else(|_| {
        Html::parse_fragment(&html)
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
    });
    normalize_whitespace(&text)
}

fn remove_boilerplate(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut result = html.to_string();
    for selector in BOILERPLATE {
        if let Ok(selector) = Selector::parse(selector) {
            for element in fragment.select(&selector) {
                result = result.replace(&element.html(), "");
            }
        }
    }
    result
}

fn container_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    Some(normalize_whitespace(
        &element.text().collect::<Vec<_>>().join(" "),
    ))
}

fn paragraph_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };
    let paragraphs: Vec<String> = document
        .select(&selector)
        .map(|p| normalize_whitespace(&p.text().collect::<Vec<_>>().join(" ")))
        .filter(|p| !p.is_empty())
        .collect();
    paragraphs.join("\n")
}

/// Collapse runs of whitespace within lines and drop blank lines.
fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{html_page, MockFailure, MockPageFetcher};

    fn fetcher(mock: MockPageFetcher) -> ContentFetcher {
        ContentFetcher::new(Arc::new(mock), Arc::new(RateGovernor::unlimited()), 200)
    }

    #[test]
    fn test_skip_list() {
        assert!(is_skipped("https://www.facebook.com/royalpalms"));
        assert!(is_skipped("https://in.pinterest.com/pin/1"));
        assert!(is_skipped("https://venue.in/brochure.PDF"));
        assert!(!is_skipped("https://www.venuelook.com/mumbai/royal-palms"));
    }

    #[test]
    fn test_readability_strips_boilerplate() {
        let body = "Royal Palms banquet seats 400 guests. ".repeat(10);
        let html = format!(
            "<html><body><nav>Home | Venues | Login</nav><div>{body}</div><footer>Copyright</footer></body></html>"
        );

        let text = extract_text(&html, &[], 200).unwrap();

        assert!(text.contains("Royal Palms banquet"));
        assert!(!text.contains("Login"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_short_page_is_rejected() {
        assert!(extract_text(&html_page("Short", 100), &[".venue-info"], 200).is_none());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a   b \n\n\t c  "), "a b\nc");
    }

    #[tokio::test]
    async fn test_fetch_prefixes_source_url() {
        let url = "https://www.venuelook.com/mumbai/royal-palms";
        let mock = MockPageFetcher::new().with_page(url, html_page("Royal Palms", 400));

        let content = fetcher(mock).fetch(url, &[]).await.unwrap();

        assert!(content.text.starts_with(&format!("Source URL: {url}\n\n")));
        assert!(content.length >= 200);
    }

    #[tokio::test]
    async fn test_fetch_failures_are_none() {
        let mock = MockPageFetcher::new().always_failing(MockFailure::Network);
        assert!(fetcher(mock).fetch("https://a.in/x", &[]).await.is_none());
    }

    #[tokio::test]
    async fn test_try_fetch_reports_reason() {
        let mock = MockPageFetcher::new()
            .with_page("https://a.in/short", html_page("Short", 100))
            .with_page("https://a.in/long", html_page("Long", 400));
        let fetcher = fetcher(mock);

        assert_eq!(
            fetcher.try_fetch("https://a.in/short", &[]).await.unwrap_err(),
            DropReason::ShortContent
        );
        assert_eq!(
            fetcher.try_fetch("https://a.in/missing", &[]).await.unwrap_err(),
            DropReason::FetchFailed
        );
        assert!(fetcher.try_fetch("https://a.in/long", &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_skipped_urls_are_never_requested() {
        let mock = MockPageFetcher::new().with_default_page(html_page("x", 400));
        let content = fetcher(mock.clone())
            .fetch("https://www.instagram.com/p/abc", &[])
            .await;

        assert!(content.is_none());
        assert!(mock.calls().is_empty());
    }
}
