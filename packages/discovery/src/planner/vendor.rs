//! Vendor query plans (every category except venue).

use super::{category::Specialisation, ServiceCategory, QueryPlan};
use crate::types::query::{format_inr, Query};

/// Vendors wanted before the orchestrator stops issuing queries.
pub const TARGET: usize = 5;

/// Entertainment service words and what to search for instead.
const ENTERTAINMENT_EXPANSIONS: &[(&str, &str)] = &[
    ("dj", "DJ"),
    ("music", "live music band"),
    ("band", "live band"),
    ("performer", "live performer"),
];

/// Searchable wording for the requested service.
pub fn service_phrase(specialisation: &Specialisation) -> String {
    let service = specialisation.service();
    match specialisation.category {
        ServiceCategory::Catering => "catering services".to_string(),
        ServiceCategory::Decoration => "event decorators".to_string(),
        ServiceCategory::Photography => "photographers".to_string(),
        ServiceCategory::Cake => "cake shops".to_string(),
        ServiceCategory::Entertainment => expand_entertainment(service),
        ServiceCategory::Venue | ServiceCategory::Generic => service.to_string(),
    }
}

fn expand_entertainment(service: &str) -> String {
    let lower = service.to_lowercase();
    ENTERTAINMENT_EXPANSIONS
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map(|(_, expansion)| expansion.to_string())
        .unwrap_or_else(|| service.to_string())
}

/// For each preferred site: a full-attribute query, then a relaxed one.
/// Unrestricted queries close the list.
pub fn plan(specialisation: &Specialisation, query: &Query) -> QueryPlan {
    let phrase = service_phrase(specialisation);
    let location = query.location.trim();
    let event = query.event_type.trim();
    let budget = format_inr(query.budget_inr);

    let mut primary = Vec::new();
    for site in specialisation.preferred_sites() {
        primary.push(format!(
            "{phrase} for {event} in {location} budget ₹{budget} site:{site}"
        ));
        primary.push(format!("{phrase} in {location} site:{site}"));
    }
    primary.push(format!("best {phrase} for {event} in {location}"));
    primary.push(format!("{phrase} in {location} contact price"));

    QueryPlan {
        primary,
        fallback: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::search::required_site;

    #[test]
    fn test_catering_sites_in_declared_order() {
        let query = Query::new("catering", "Bangalore", "wedding", 300_000);
        let plan = plan(&Specialisation::for_query(&query), &query);

        let sites: Vec<Option<String>> = plan.primary.iter().map(|q| required_site(q)).collect();
        assert_eq!(sites[0].as_deref(), Some("venuelook.com"));
        assert_eq!(sites[1].as_deref(), Some("venuelook.com"));
        assert_eq!(sites[2].as_deref(), Some("weddingwire.in"));
        assert_eq!(sites[3].as_deref(), Some("weddingwire.in"));
        assert_eq!(sites[4], None);
        assert_eq!(sites[5], None);
        assert!(plan.fallback.is_empty());
    }

    #[test]
    fn test_entertainment_expansion() {
        let expand = |word: &str| service_phrase(&Specialisation::for_service(word));
        assert_eq!(expand("dj"), "DJ");
        assert_eq!(expand("Music"), "live music band");
        assert_eq!(expand("band"), "live band");
        assert_eq!(expand("performer"), "live performer");
        assert_eq!(expand("entertainment"), "entertainment");
    }

    #[test]
    fn test_generic_uses_caller_wording() {
        let query = Query::new("mehendi artist", "Jaipur", "wedding", 20_000);
        let plan = plan(&Specialisation::for_query(&query), &query);
        assert_eq!(
            plan.primary[0],
            "mehendi artist for wedding in Jaipur budget ₹20,000 site:justdial.com"
        );
        assert_eq!(plan.primary.len(), 8);
    }
}
