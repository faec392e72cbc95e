//! Category registry: maps a service word to its specialisation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{decoration, vendor, venue, QueryPlan};
use crate::pipeline::fetch::SKIP_PATTERNS;
use crate::types::query::Query;

/// Service categories the pipeline knows how to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Venue,
    Catering,
    Decoration,
    Photography,
    Cake,
    Entertainment,
    Generic,
}

const KEYWORDS: &[(ServiceCategory, &[&str])] = &[
    (ServiceCategory::Catering, &["cater", "food"]),
    (ServiceCategory::Decoration, &["decor"]),
    (ServiceCategory::Photography, &["photo", "video"]),
    (ServiceCategory::Cake, &["cake", "bakery", "pastry"]),
    (
        ServiceCategory::Entertainment,
        &["dj", "music", "band", "entertainment", "performer"],
    ),
];

impl ServiceCategory {
    /// Substring match on the service word; anything unmatched is `Generic`.
    ///
    /// Never returns `Venue`: venues are only reached through an explicit
    /// venue query.
    pub fn for_service(service_type: &str) -> Self {
        let service = service_type.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| service.contains(w)))
            .map(|(category, _)| *category)
            .unwrap_or(ServiceCategory::Generic)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::Venue => "venue",
            ServiceCategory::Catering => "catering",
            ServiceCategory::Decoration => "decoration",
            ServiceCategory::Photography => "photography",
            ServiceCategory::Cake => "cake",
            ServiceCategory::Entertainment => "entertainment",
            ServiceCategory::Generic => "generic",
        }
    }

    /// Ordered source domains, most trusted first.
    pub fn preferred_sites(&self) -> &'static [&'static str] {
        match self {
            ServiceCategory::Venue => &["venuelook.com"],
            ServiceCategory::Catering => &["venuelook.com", "weddingwire.in"],
            ServiceCategory::Decoration => &["weddingwire.in", "wedmegood.com", "venuelook.com"],
            ServiceCategory::Photography => &["weddingwire.in", "wedmegood.com", "shaadisaga.com"],
            ServiceCategory::Cake => &["justdial.com", "weddingwire.in"],
            ServiceCategory::Entertainment => &["weddingwire.in", "wedmegood.com"],
            ServiceCategory::Generic => &["justdial.com", "sulekha.com", "weddingwire.in"],
        }
    }

    /// Page containers tried when readability extraction comes up short.
    pub fn content_selectors(&self) -> &'static [&'static str] {
        match self {
            ServiceCategory::Venue => &[".venue-info", ".venue-details", ".venue-description"],
            _ => &[
                ".vendor-details",
                ".service-details",
                ".listing-details",
                ".profile-details",
            ],
        }
    }

    /// Price range used when no price can be found.
    pub fn price_estimate(&self) -> &'static str {
        match self {
            ServiceCategory::Venue => "₹1,000-2,500 per plate",
            ServiceCategory::Catering => "₹800-1500 per plate",
            ServiceCategory::Decoration => "₹15,000-50,000",
            ServiceCategory::Photography => "₹15,000-30,000 per day",
            ServiceCategory::Cake => "₹1,500-5,000 per kg",
            ServiceCategory::Entertainment => "₹20,000-75,000 per event",
            ServiceCategory::Generic => "₹10,000-50,000",
        }
    }

    /// Candidates gathered before the orchestrator stops issuing queries.
    pub fn target(&self) -> usize {
        match self {
            ServiceCategory::Venue => venue::FIRST_PASS_TARGET,
            ServiceCategory::Decoration => decoration::OFFLINE_CAP,
            _ => vendor::TARGET,
        }
    }

    /// Hard cap on returned providers.
    pub fn cap(&self) -> usize {
        match self {
            ServiceCategory::Venue => venue::CAP,
            ServiceCategory::Decoration => decoration::OFFLINE_CAP,
            _ => vendor::TARGET,
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A category plus the caller's own service wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specialisation {
    pub category: ServiceCategory,
    service: String,
}

impl Specialisation {
    /// Venue path for `venue` queries, keyword registry otherwise.
    pub fn for_query(query: &Query) -> Self {
        if query.is_venue() {
            Self::venue()
        } else {
            Self::for_service(&query.category)
        }
    }

    pub fn venue() -> Self {
        Self {
            category: ServiceCategory::Venue,
            service: "venue".to_string(),
        }
    }

    pub fn for_service(service_type: &str) -> Self {
        Self {
            category: ServiceCategory::for_service(service_type),
            service: service_type.trim().to_string(),
        }
    }

    /// Service word as the caller wrote it.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Value injected into each record's `service_type`.
    pub fn service_type(&self) -> String {
        match self.category {
            ServiceCategory::Venue => "venue".to_string(),
            _ => self.service.to_lowercase(),
        }
    }

    pub fn preferred_sites(&self) -> &'static [&'static str] {
        self.category.preferred_sites()
    }

    /// URL fragments the fetcher refuses for every category.
    pub fn skip_patterns(&self) -> &'static [&'static str] {
        SKIP_PATTERNS
    }

    pub fn plan(&self, query: &Query) -> QueryPlan {
        match self.category {
            ServiceCategory::Venue => venue::plan(query),
            _ => vendor::plan(self, query),
        }
    }

    pub fn is_venue(&self) -> bool {
        self.category == ServiceCategory::Venue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_patterns_cover_social_sites() {
        let spec = Specialisation::for_service("catering");
        assert!(spec.skip_patterns().contains(&"instagram.com"));
        assert!(spec.skip_patterns().contains(&".pdf"));
    }

    #[test]
    fn test_for_service_substrings() {
        let cases = [
            ("Catering", ServiceCategory::Catering),
            ("food stall", ServiceCategory::Catering),
            ("caterer", ServiceCategory::Catering),
            ("Decoration", ServiceCategory::Decoration),
            ("decorator", ServiceCategory::Decoration),
            ("Photography", ServiceCategory::Photography),
            ("videographer", ServiceCategory::Photography),
            ("Cake", ServiceCategory::Cake),
            ("bakery", ServiceCategory::Cake),
            ("pastry chef", ServiceCategory::Cake),
            ("DJ", ServiceCategory::Entertainment),
            ("live music", ServiceCategory::Entertainment),
            ("performer", ServiceCategory::Entertainment),
            ("mehendi artist", ServiceCategory::Generic),
        ];
        for (word, expected) in cases {
            assert_eq!(ServiceCategory::for_service(word), expected, "{word}");
        }
    }

    #[test]
    fn test_venue_never_from_keywords() {
        assert_eq!(ServiceCategory::for_service("venue"), ServiceCategory::Generic);
        let query = Query::venue("Mumbai", "wedding", 500_000);
        assert!(Specialisation::for_query(&query).is_venue());
    }

    #[test]
    fn test_caps_and_targets() {
        assert_eq!(ServiceCategory::Venue.target(), 3);
        assert_eq!(ServiceCategory::Venue.cap(), 6);
        assert_eq!(ServiceCategory::Catering.cap(), 5);
        assert_eq!(ServiceCategory::Decoration.cap(), 6);
    }

    #[test]
    fn test_service_type_keeps_caller_wording() {
        assert_eq!(Specialisation::for_service("Mehendi Artist").service_type(), "mehendi artist");
        assert_eq!(Specialisation::venue().service_type(), "venue");
    }
}
