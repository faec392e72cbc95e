//! Enricher: fills map links, contacts and prices after deduplication.
//!
//! Never fails. A contact that cannot be found stays `None`; a price that
//! cannot be found becomes the category estimate.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::governor::{ApiClass, RateGovernor};
use super::prompts;
use super::search::SearchClient;
use crate::planner::Specialisation;
use crate::traits::chat::{ChatModel, CompletionRequest};
use crate::types::config::DiscoveryConfig;
use crate::types::provider::Provider;
use crate::types::query::Query;

const MAPS_SEARCH: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Fewest digits a phone number may have.
const MIN_PHONE_DIGITS: usize = 8;

lazy_static! {
    // Tried in order; the first match with enough digits wins.
    static ref PHONE_PATTERNS: Vec<Regex> = vec![
        // International: +91 98200 12345, +91-22-2345-6789
        Regex::new(r"\+\d{1,3}[\s-]?\d{2,5}[\s-]?\d{3,5}[\s-]?\d{0,5}").unwrap(),
        // Indian mobile
        Regex::new(r"\b[6-9]\d{9}\b").unwrap(),
        // 98200 12345
        Regex::new(r"\b\d{5}[\s-]\d{5}\b").unwrap(),
        // Phone: 022 2345 6789
        Regex::new(r"(?i)(?:phone|ph|tel|mobile|call|contact)\s*(?:no\.?|number)?\s*[:.\-]?\s*(\+?\d[\d\s-]{6,}\d)").unwrap(),
        // Landline with STD code
        Regex::new(r"\b0\d{2,4}[\s-]?\d{6,8}\b").unwrap(),
    ];
    // A digit or a currency marker: ₹, Rs, INR
    static ref PRICE_MARKER: Regex = Regex::new(r"(?i)\d|₹|\brs\b\.?|\binr\b").unwrap();
}

/// Google Maps search link for a venue.
pub fn map_link(name: &str, address: Option<&str>) -> String {
    let query = match address.map(str::trim).filter(|a| !a.is_empty()) {
        Some(address) => format!("{}, {}", name.trim(), address),
        None => name.trim().to_string(),
    };
    format!("{MAPS_SEARCH}{}", urlencoding::encode(&query))
}

/// Last two comma-separated parts of an address.
pub fn address_tail(address: &str) -> String {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    parts[parts.len().saturating_sub(2)..].join(", ")
}

/// First phone number in `text` with at least eight digits, as `+` and digits.
pub fn find_phone(text: &str) -> Option<String> {
    PHONE_PATTERNS.iter().find_map(|pattern| {
        pattern.captures_iter(text).find_map(|caps| {
            let matched = caps.get(1).or_else(|| caps.get(0))?.as_str();
            let phone = normalize_phone(matched);
            let digits = phone.chars().filter(char::is_ascii_digit).count();
            (digits >= MIN_PHONE_DIGITS).then_some(phone)
        })
    })
}

fn normalize_phone(raw: &str) -> String {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if raw.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}

/// Whether an LLM price reply states an amount rather than a refusal.
pub fn looks_like_price(reply: &str) -> bool {
    PRICE_MARKER.is_match(reply)
}

fn usable_reply(reply: &str) -> Option<String> {
    let reply = reply.trim().trim_matches('"').trim();
    let lower = reply.to_lowercase();
    if reply.is_empty() || lower.contains("not available") {
        None
    } else {
        Some(reply.to_string())
    }
}

#[derive(Clone)]
pub struct Enricher {
    search: SearchClient,
    chat: Arc<dyn ChatModel>,
    governor: Arc<RateGovernor>,
    temperature: f32,
    workers: usize,
    snippets: usize,
}

impl Enricher {
    pub fn new(
        search: SearchClient,
        chat: Arc<dyn ChatModel>,
        governor: Arc<RateGovernor>,
        config: &DiscoveryConfig,
    ) -> Self {
        Self {
            search,
            chat,
            governor,
            temperature: config.temperature,
            workers: config.enrichment_workers.max(1),
            snippets: config.enrichment_snippets.max(1),
        }
    }

    /// Enrich every provider, keeping input order.
    pub async fn enrich(
        &self,
        providers: Vec<Provider>,
        specialisation: &Specialisation,
        query: &Query,
    ) -> Vec<Provider> {
        stream::iter(providers)
            .map(|provider| self.enrich_one(provider, specialisation, query))
            .buffered(self.workers)
            .collect()
            .await
    }

    async fn enrich_one(
        &self,
        mut provider: Provider,
        specialisation: &Specialisation,
        query: &Query,
    ) -> Provider {
        if specialisation.is_venue() && provider.details.map_url.is_none() {
            provider.details.map_url = Some(map_link(
                &provider.name,
                provider.details.address.as_deref(),
            ));
        }

        if provider.details.contact.is_none() {
            provider.details.contact = self.find_contact(&provider, query).await;
        }

        if provider.details.price.is_none() {
            let price = self.find_price(&provider, specialisation, query).await;
            provider.details.price = Some(price.unwrap_or_else(|| {
                format!("Estimated {}", specialisation.category.price_estimate())
            }));
        }

        provider
    }

    async fn snippets_for(&self, search: &str) -> String {
        self.search
            .search(search, self.snippets)
            .await
            .into_iter()
            .map(|hit| hit.snippet)
            .filter(|s| !s.trim().is_empty())
            .take(self.snippets)
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn find_contact(&self, provider: &Provider, query: &Query) -> Option<String> {
        let tail = provider
            .details
            .address
            .as_deref()
            .map(address_tail)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| query.location.trim().to_string());

        let snippets = self
            .snippets_for(&format!("{} {} contact phone number", provider.name, tail))
            .await;
        if snippets.is_empty() {
            return None;
        }

        if let Some(phone) = find_phone(&snippets) {
            debug!(provider = %provider.name, "contact found in snippets");
            return Some(phone);
        }

        self.ask(prompts::phone_lookup(&provider.name, &snippets))
            .await
            .filter(|reply| reply.chars().count() >= MIN_PHONE_DIGITS)
    }

    async fn find_price(
        &self,
        provider: &Provider,
        specialisation: &Specialisation,
        query: &Query,
    ) -> Option<String> {
        let snippets = self
            .snippets_for(&format!("{} {} price", provider.name, query.location.trim()))
            .await;
        if snippets.is_empty() {
            return None;
        }

        self.ask(prompts::price_lookup(
            &provider.name,
            specialisation.service(),
            &snippets,
        ))
        .await
        .filter(|reply| looks_like_price(reply))
    }

    /// One plain-text LLM call; any failure is `None`.
    async fn ask(&self, prompt: String) -> Option<String> {
        self.governor.acquire(ApiClass::Llm).await;
        let request = CompletionRequest::text(prompt, self.temperature);
        match self.chat.complete(&request).await {
            Ok(reply) => usable_reply(&reply),
            Err(e) => {
                debug!(error = %e, "enrichment lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockChatModel, MockFailure, MockReply, MockWebSearcher};
    use crate::types::config::RetryPolicy;
    use crate::types::hit::SearchHit;

    fn enricher(searcher: MockWebSearcher, chat: MockChatModel) -> Enricher {
        let governor = Arc::new(RateGovernor::unlimited());
        let search = SearchClient::new(Arc::new(searcher), governor.clone(), RetryPolicy::immediate());
        Enricher::new(search, Arc::new(chat), governor, &DiscoveryConfig::unthrottled())
    }

    #[test]
    fn test_map_link_encodes_name_and_address() {
        assert_eq!(
            map_link("Royal Palms", Some("Goregaon East, Mumbai")),
            "https://www.google.com/maps/search/?api=1&query=Royal%20Palms%2C%20Goregaon%20East%2C%20Mumbai"
        );
        assert_eq!(
            map_link("Royal Palms", None),
            "https://www.google.com/maps/search/?api=1&query=Royal%20Palms"
        );
    }

    #[test]
    fn test_address_tail() {
        assert_eq!(address_tail("12 MG Road, Andheri West, Mumbai"), "Andheri West, Mumbai");
        assert_eq!(address_tail("Mumbai"), "Mumbai");
        assert_eq!(address_tail(""), "");
    }

    #[test]
    fn test_phone_patterns() {
        assert_eq!(find_phone("Call +91 98200 12345 today").as_deref(), Some("+919820012345"));
        assert_eq!(find_phone("Mobile 9820012345").as_deref(), Some("9820012345"));
        assert_eq!(find_phone("Reach us at 98200 12345").as_deref(), Some("9820012345"));
        assert_eq!(find_phone("Phone: 022 2345 6789").as_deref(), Some("02223456789"));
        assert_eq!(find_phone("Office 080-23456789").as_deref(), Some("08023456789"));
        assert_eq!(find_phone("Open 10 to 7, rated 4.5"), None);
    }

    #[tokio::test]
    async fn test_contact_from_snippet_regex() {
        let searcher = MockWebSearcher::new().with_hits_containing(
            "contact phone number",
            vec![SearchHit::new("https://justdial.com/x", 1).with_snippet("Tel +91 98200 12345")],
        );
        let chat = MockChatModel::new();
        let query = Query::new("catering", "Pune", "wedding", 100_000);

        let providers = enricher(searcher, chat.clone())
            .enrich(
                vec![Provider::new("Annapurna Caterers", "https://weddingwire.in/a")],
                &Specialisation::for_query(&query),
                &query,
            )
            .await;

        assert_eq!(providers[0].details.contact.as_deref(), Some("+919820012345"));
        assert!(chat.calls().is_empty());
    }

    #[tokio::test]
    async fn test_contact_llm_fallback_rules() {
        let searcher = MockWebSearcher::new().with_default_hits(vec![
            SearchHit::new("https://justdial.com/x", 1).with_snippet("Call the front desk")
        ]);
        let chat = MockChatModel::new()
            .with_reply_containing("phone number", MockReply::text("not available"))
            .with_reply_containing("price", MockReply::text("₹900 per plate"));
        let query = Query::new("catering", "Pune", "wedding", 100_000);

        let providers = enricher(searcher, chat)
            .enrich(
                vec![Provider::new("Annapurna", "https://weddingwire.in/a")],
                &Specialisation::for_query(&query),
                &query,
            )
            .await;

        assert_eq!(providers[0].details.contact, None);
        assert_eq!(providers[0].details.price.as_deref(), Some("₹900 per plate"));
    }

    #[test]
    fn test_price_marker() {
        assert!(looks_like_price("₹900 per plate"));
        assert!(looks_like_price("Rs. 1,200 onwards"));
        assert!(looks_like_price("INR 25k per day"));
        assert!(!looks_like_price("No price is mentioned in these results."));
        assert!(!looks_like_price("Prices vary by season"));
    }

    #[tokio::test]
    async fn test_price_refusal_falls_back_to_estimate() {
        let searcher = MockWebSearcher::new().with_hits_containing(
            "price",
            vec![SearchHit::new("https://justdial.com/x", 1).with_snippet("Best caterers in Pune")],
        );
        let chat = MockChatModel::new().with_reply_containing(
            "price",
            MockReply::text("No price is mentioned in these results."),
        );
        let query = Query::new("catering", "Pune", "wedding", 100_000);

        let providers = enricher(searcher, chat.clone())
            .enrich(
                vec![Provider::new("Annapurna", "https://weddingwire.in/a")],
                &Specialisation::for_query(&query),
                &query,
            )
            .await;

        assert_eq!(
            providers[0].details.price.as_deref(),
            Some("Estimated ₹800-1500 per plate")
        );
        assert!(!chat.calls().is_empty());
    }

    #[tokio::test]
    async fn test_price_estimate_when_nothing_found() {
        let searcher = MockWebSearcher::new();
        let query = Query::new("photographer", "Goa", "wedding", 100_000);

        let providers = enricher(searcher, MockChatModel::new())
            .enrich(
                vec![Provider::new("Lens Art", "https://wedmegood.com/l")],
                &Specialisation::for_query(&query),
                &query,
            )
            .await;

        assert_eq!(
            providers[0].details.price.as_deref(),
            Some("Estimated ₹15,000-30,000 per day")
        );
    }

    #[tokio::test]
    async fn test_outage_never_fails_and_keeps_order() {
        let searcher = MockWebSearcher::new().always_failing(MockFailure::Network);
        let chat = MockChatModel::new().with_default_reply(MockReply::Fail(MockFailure::Network));
        let query = Query::venue("Mumbai", "wedding", 500_000);
        let input: Vec<Provider> = (0..5)
            .map(|i| Provider::new(format!("Hall {i}"), format!("https://venuelook.com/{i}")))
            .collect();

        let providers = enricher(searcher, chat)
            .enrich(input, &Specialisation::venue(), &query)
            .await;

        let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Hall 0", "Hall 1", "Hall 2", "Hall 3", "Hall 4"]);
        assert!(providers.iter().all(|p| p.details.map_url.is_some()));
        assert!(providers
            .iter()
            .all(|p| p.details.price.as_deref() == Some("Estimated ₹1,000-2,500 per plate")));
    }

    #[tokio::test]
    async fn test_existing_fields_are_untouched() {
        let searcher = MockWebSearcher::new();
        let mut provider = Provider::new("Sweet Tooth", "https://justdial.com/s");
        provider.details.contact = Some("+919999999999".into());
        provider.details.price = Some("₹1,200 per kg".into());
        let query = Query::new("cake", "Pune", "birthday", 5_000);

        let providers = enricher(searcher.clone(), MockChatModel::new())
            .enrich(vec![provider.clone()], &Specialisation::for_query(&query), &query)
            .await;

        assert_eq!(providers[0], provider);
        assert!(searcher.calls().is_empty());
    }
}
