//! Provider records: the pipeline's output.

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

/// Optional attributes shared by candidates and final providers.
///
/// Absent values serialise as `null`; they are never guessed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDetails {
    pub address: Option<String>,
    pub contact: Option<String>,
    pub price: Option<String>,
    pub rating: Option<String>,
    /// Venues only
    pub capacity: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub map_url: Option<String>,
    pub service_type: Option<String>,
    pub source_site: Option<String>,
    /// Page the record was extracted from
    pub url: Option<String>,
}

impl ProviderDetails {
    /// Number of present, non-empty fields.
    pub fn filled(&self) -> usize {
        [
            &self.address,
            &self.contact,
            &self.price,
            &self.rating,
            &self.capacity,
            &self.description,
            &self.website,
            &self.map_url,
            &self.service_type,
            &self.source_site,
            &self.url,
        ]
        .into_iter()
        .filter(|field| is_present(field))
        .count()
    }
}

/// A venue or vendor returned by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    /// URL the record came from
    pub source: String,
    #[serde(flatten)]
    pub details: ProviderDetails,
}

impl Provider {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            details: ProviderDetails::default(),
        }
    }

    /// Count of non-null, non-empty fields.
    pub fn completeness(&self) -> usize {
        usize::from(!self.name.trim().is_empty())
            + usize::from(!self.source.trim().is_empty())
            + self.details.filled()
    }

    /// Case-folded deduplication key.
    pub fn dedup_key(&self) -> String {
        casefold(&self.name)
    }
}

/// An intermediate record whose name may still be missing.
///
/// Candidates remember where they were observed so that ordering, and
/// therefore deduplication, is independent of worker scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: Option<String>,
    pub source: String,
    pub details: ProviderDetails,
    /// Index of the planner query that produced the hit
    pub query_index: usize,
    /// Rank of the hit within that query's results
    pub rank: usize,
}

impl Candidate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            name: None,
            source: source.into(),
            details: ProviderDetails::default(),
            query_index: 0,
            rank: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn observed_at(mut self, query_index: usize, rank: usize) -> Self {
        self.query_index = query_index;
        self.rank = rank;
        self
    }

    pub fn has_name(&self) -> bool {
        is_present(&self.name)
    }

    pub fn dedup_key(&self) -> Option<String> {
        self.name.as_deref().filter(|n| !n.trim().is_empty()).map(casefold)
    }

    pub fn completeness(&self) -> usize {
        usize::from(self.has_name())
            + usize::from(!self.source.trim().is_empty())
            + self.details.filled()
    }

    /// Promote to a provider; a missing name is a programming error here.
    pub fn into_provider(self) -> Result<Provider> {
        match self.name {
            Some(name) if !name.trim().is_empty() => Ok(Provider {
                name: name.trim().to_string(),
                source: self.source,
                details: self.details,
            }),
            _ => Err(DiscoveryError::Invariant(format!(
                "record from {} has no name",
                self.source
            ))),
        }
    }
}

/// A section header in the decoration listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeader {
    pub name: String,
    pub service_type: String,
    #[serde(rename = "isHeader")]
    pub is_header: bool,
}

impl SectionHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service_type: "Header".to_string(),
            is_header: true,
        }
    }
}

/// One entry of a flat result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing {
    Header(SectionHeader),
    Provider(Provider),
}

impl Listing {
    pub fn as_provider(&self) -> Option<&Provider> {
        match self {
            Listing::Provider(p) => Some(p),
            Listing::Header(_) => None,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Listing::Header(_))
    }
}

impl From<Provider> for Listing {
    fn from(provider: Provider) -> Self {
        Listing::Provider(provider)
    }
}

pub(crate) fn casefold(name: &str) -> String {
    name.trim().to_lowercase()
}

fn is_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness_counts_non_empty_fields() {
        let mut provider = Provider::new("Royal Palms", "https://venuelook.com/royal-palms");
        assert_eq!(provider.completeness(), 2);

        provider.details.address = Some("Andheri, Mumbai".into());
        provider.details.contact = Some("   ".into());
        assert_eq!(provider.completeness(), 3);
    }

    #[test]
    fn test_candidate_without_name_is_an_invariant_error() {
        let candidate = Candidate::new("https://example.com");
        assert!(matches!(
            candidate.into_provider(),
            Err(DiscoveryError::Invariant(_))
        ));

        let provider = Candidate::new("https://example.com")
            .with_name("  Grand Caterers ")
            .into_provider()
            .unwrap();
        assert_eq!(provider.name, "Grand Caterers");
    }

    #[test]
    fn test_provider_serialises_nulls_flat() {
        let provider = Provider::new("A", "https://a.in");
        let json = serde_json::to_value(&provider).unwrap();
        assert_eq!(json["name"], "A");
        assert!(json["contact"].is_null());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_header_shape() {
        let json = serde_json::to_value(Listing::Header(SectionHeader::new("Online"))).unwrap();
        assert_eq!(json["service_type"], "Header");
        assert_eq!(json["isHeader"], true);

        let back: Listing = serde_json::from_value(json).unwrap();
        assert!(back.is_header());

        let provider: Listing =
            serde_json::from_value(serde_json::to_value(Provider::new("A", "https://a.in")).unwrap())
                .unwrap();
        assert!(provider.as_provider().is_some());
    }
}
