//! The discovery request.

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

/// One discovery request, alive for a single pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Service type, e.g. "venue", "catering", "dj"
    pub category: String,

    /// City or area, e.g. "Mumbai"
    pub location: String,

    /// Event type, e.g. "wedding"
    pub event_type: String,

    /// Budget in rupees
    pub budget_inr: u64,

    #[serde(default)]
    pub guest_count: Option<u32>,

    /// Venue kind, e.g. "banquet hall" (venues only)
    #[serde(default)]
    pub venue_type: Option<String>,
}

impl Query {
    pub fn new(
        category: impl Into<String>,
        location: impl Into<String>,
        event_type: impl Into<String>,
        budget_inr: u64,
    ) -> Self {
        Self {
            category: category.into(),
            location: location.into(),
            event_type: event_type.into(),
            budget_inr,
            guest_count: None,
            venue_type: None,
        }
    }

    /// Shorthand for a venue request.
    pub fn venue(location: impl Into<String>, event_type: impl Into<String>, budget_inr: u64) -> Self {
        Self::new("venue", location, event_type, budget_inr)
    }

    pub fn with_guest_count(mut self, guests: u32) -> Self {
        self.guest_count = Some(guests);
        self
    }

    pub fn with_venue_type(mut self, venue_type: impl Into<String>) -> Self {
        self.venue_type = Some(venue_type.into());
        self
    }

    /// Whether the category names the venue path exactly.
    pub fn is_venue(&self) -> bool {
        self.category.trim().eq_ignore_ascii_case("venue")
    }

    /// Venue type with a sensible default.
    pub fn venue_type_or_default(&self) -> &str {
        self.venue_type
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("venue")
    }

    /// Reject empty strings.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("category", &self.category),
            ("location", &self.location),
            ("event_type", &self.event_type),
        ] {
            if value.trim().is_empty() {
                return Err(DiscoveryError::InvalidQuery {
                    reason: format!("{field} must not be empty"),
                });
            }
        }
        if matches!(self.venue_type.as_deref(), Some(v) if v.trim().is_empty()) {
            return Err(DiscoveryError::InvalidQuery {
                reason: "venue_type must not be empty when given".to_string(),
            });
        }
        Ok(())
    }
}

/// Render a rupee amount with Indian digit grouping, e.g. `5,00,000`.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
