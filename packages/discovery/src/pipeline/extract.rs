//! Structured extractor: page text in, candidate record out.

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use super::governor::{ApiClass, RateGovernor};
use super::prompts;
use crate::error::{DiscoveryError, Result};
use crate::planner::Specialisation;
use crate::traits::chat::{ChatModel, CompletionRequest};
use crate::types::config::{DiscoveryConfig, RetryPolicy};
use crate::types::hit::{host_of, RawContent};
use crate::types::provider::{Candidate, ProviderDetails};
use crate::types::query::Query;

/// Placeholder strings models use for "unknown".
const PLACEHOLDERS: &[&str] = &[
    "null",
    "none",
    "n/a",
    "na",
    "not available",
    "not mentioned",
    "not specified",
];

/// The record as the model returns it, read leniently.
#[derive(Debug, Default, Deserialize)]
struct ExtractedRecord {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    address: Option<String>,
    #[serde(default, alias = "phone", deserialize_with = "lenient")]
    contact: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    price: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    rating: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    capacity: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    website: Option<String>,
}

fn lenient<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

/// Numbers become strings; empty values and placeholders become `None`.
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Bool(_) | Value::Object(_) => return None,
    };
    let lower = text.to_lowercase();
    if text.is_empty() || PLACEHOLDERS.contains(&lower.as_str()) {
        None
    } else {
        Some(text)
    }
}

/// Parse one reply into a record. Non-JSON, empty and non-object replies are errors.
fn parse_record(reply: &str) -> Result<ExtractedRecord> {
    let body = mistral_client::strip_code_blocks(reply);
    if body.is_empty() {
        return Err(DiscoveryError::Extraction("empty reply".to_string()));
    }

    let value: Value = serde_json::from_str(body)?;
    let object = match value {
        Value::Object(_) => value,
        Value::Array(mut items) if items.first().is_some_and(Value::is_object) => items.swap_remove(0),
        other => {
            return Err(DiscoveryError::Extraction(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };
    Ok(serde_json::from_value(object)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// LLM-backed extractor with JSON-mode requests and rate-limit backoff.
#[derive(Clone)]
pub struct StructuredExtractor {
    chat: Arc<dyn ChatModel>,
    governor: Arc<RateGovernor>,
    retry: RetryPolicy,
    temperature: f32,
    venue_chars: usize,
    vendor_chars: usize,
}

impl StructuredExtractor {
    pub fn new(chat: Arc<dyn ChatModel>, governor: Arc<RateGovernor>, config: &DiscoveryConfig) -> Self {
        Self {
            chat,
            governor,
            retry: config.llm_retry.clone(),
            temperature: config.temperature,
            venue_chars: config.venue_excerpt_chars,
            vendor_chars: config.vendor_excerpt_chars,
        }
    }

    /// Extract one candidate from `content`.
    ///
    /// Parse failures and rate limits are retried; any other error gives
    /// up at once. The candidate may lack a name; callers decide what to
    /// do with it.
    pub async fn extract(
        &self,
        content: &RawContent,
        specialisation: &Specialisation,
        query: &Query,
    ) -> Option<Candidate> {
        let url = content.source_url.as_str();
        let max_chars = if specialisation.is_venue() {
            self.venue_chars
        } else {
            self.vendor_chars
        };
        let request = CompletionRequest::json(
            prompts::extraction_system(specialisation, query),
            prompts::extraction_user(specialisation, &content.text, max_chars),
            self.temperature,
        );

        let attempts = self.retry.max_attempts.max(1);
        for attempt in 0..attempts {
            self.governor.acquire(ApiClass::Llm).await;

            match self.chat.complete(&request).await {
                Ok(reply) => match parse_record(&reply) {
                    Ok(record) => return Some(into_candidate(record, url, specialisation)),
                    Err(e) => {
                        debug!(url = %url, attempt, error = %e, "unusable extraction reply");
                    }
                },
                Err(DiscoveryError::Extraction(message)) => {
                    debug!(url = %url, attempt, error = %message, "empty extraction reply");
                }
                Err(e) if e.is_rate_limited() => {
                    let wait = self.retry.rate_limit_backoff(attempt);
                    warn!(url = %url, attempt, wait_ms = wait.as_millis() as u64, "LLM rate limited");
                    if attempt + 1 < attempts {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "extraction failed");
                    return None;
                }
            }
        }

        debug!(url = %url, "extraction gave up after {} attempts", attempts);
        None
    }
}

fn into_candidate(record: ExtractedRecord, url: &str, specialisation: &Specialisation) -> Candidate {
    let details = ProviderDetails {
        address: record.address,
        contact: record.contact,
        price: record.price,
        rating: record.rating,
        capacity: if specialisation.is_venue() {
            record.capacity
        } else {
            None
        },
        description: record.description,
        website: record.website,
        map_url: None,
        service_type: Some(specialisation.service_type()),
        source_site: host_of(url),
        url: Some(url.to_string()),
    };

    Candidate {
        name: record.name,
        source: url.to_string(),
        details,
        query_index: 0,
        rank: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockChatModel, MockFailure, MockReply};
    use serde_json::json;

    const URL: &str = "https://www.venuelook.com/mumbai/royal-palms";

    fn extractor(chat: MockChatModel) -> StructuredExtractor {
        StructuredExtractor::new(
            Arc::new(chat),
            Arc::new(RateGovernor::unlimited()),
            &DiscoveryConfig::unthrottled(),
        )
    }

    fn content() -> RawContent {
        RawContent::new(URL, &"Royal Palms banquet hall in Goregaon. ".repeat(10))
    }

    #[test]
    fn test_lenient_values() {
        let record = parse_record(
            r#"{"name":" Royal Palms ","price":1500,"rating":4.5,"contact":"N/A","address":"","website":null}"#,
        )
        .unwrap();

        assert_eq!(record.name.as_deref(), Some("Royal Palms"));
        assert_eq!(record.price.as_deref(), Some("1500"));
        assert_eq!(record.rating.as_deref(), Some("4.5"));
        assert_eq!(record.contact, None);
        assert_eq!(record.address, None);
        assert_eq!(record.website, None);
    }

    #[test]
    fn test_code_fenced_and_phone_alias() {
        let record = parse_record("```json\n{\"name\":\"A\",\"phone\":\"+91 98200 12345\"}\n```").unwrap();
        assert_eq!(record.contact.as_deref(), Some("+91 98200 12345"));
    }

    #[test]
    fn test_non_object_is_an_error() {
        assert!(parse_record("not json").is_err());
        assert!(parse_record("   ").is_err());
        assert!(parse_record("[1,2]").is_err());
    }

    #[tokio::test]
    async fn test_injects_source_fields() {
        let chat = MockChatModel::new().with_default_reply(MockReply::json(json!({
            "name": "Royal Palms",
            "capacity": "500",
        })));
        let query = Query::venue("Mumbai", "wedding", 500_000);

        let candidate = extractor(chat)
            .extract(&content(), &Specialisation::venue(), &query)
            .await
            .unwrap();

        assert_eq!(candidate.source, URL);
        assert_eq!(candidate.details.url.as_deref(), Some(URL));
        assert_eq!(candidate.details.source_site.as_deref(), Some("venuelook.com"));
        assert_eq!(candidate.details.service_type.as_deref(), Some("venue"));
        assert_eq!(candidate.details.capacity.as_deref(), Some("500"));
    }

    #[tokio::test]
    async fn test_request_is_json_mode_with_system_prompt() {
        let chat = MockChatModel::new().with_default_reply(MockReply::text("{}"));
        let query = Query::new("catering", "Pune", "wedding", 100_000);

        extractor(chat.clone())
            .extract(&content(), &Specialisation::for_query(&query), &query)
            .await;

        let request = &chat.requests()[0];
        assert!(request.json);
        assert!(request.system.is_some());
        assert!((request.temperature - 0.1).abs() < f32::EPSILON);
        assert!(request.user.contains(URL));
    }

    #[tokio::test]
    async fn test_parse_failures_are_retried() {
        let chat = MockChatModel::new().with_replies_containing(
            URL,
            vec![
                MockReply::text("Sorry, here is the data:"),
                MockReply::json(json!({"name": "Royal Palms"})),
            ],
        );
        let query = Query::venue("Mumbai", "wedding", 1);

        let candidate = extractor(chat.clone())
            .extract(&content(), &Specialisation::venue(), &query)
            .await;

        assert!(candidate.is_some());
        assert_eq!(chat.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_replies_are_retried() {
        let chat = MockChatModel::new().with_replies_containing(
            URL,
            vec![
                MockReply::Fail(MockFailure::EmptyReply),
                MockReply::json(json!({"name": "Royal Palms"})),
            ],
        );
        let query = Query::venue("Mumbai", "wedding", 1);

        let candidate = extractor(chat.clone())
            .extract(&content(), &Specialisation::venue(), &query)
            .await
            .unwrap();

        assert_eq!(candidate.name.as_deref(), Some("Royal Palms"));
        assert_eq!(chat.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_three_bad_replies() {
        let chat = MockChatModel::new().with_default_reply(MockReply::text("nope"));
        let query = Query::venue("Mumbai", "wedding", 1);

        let candidate = extractor(chat.clone())
            .extract(&content(), &Specialisation::venue(), &query)
            .await;

        assert!(candidate.is_none());
        assert_eq!(chat.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_other_errors_stop_immediately() {
        let chat = MockChatModel::new().with_default_reply(MockReply::Fail(MockFailure::Network));
        let query = Query::venue("Mumbai", "wedding", 1);

        let candidate = extractor(chat.clone())
            .extract(&content(), &Specialisation::venue(), &query)
            .await;

        assert!(candidate.is_none());
        assert_eq!(chat.calls().len(), 1);
    }
}
