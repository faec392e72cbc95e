//! Venue query plan. Venues come from venuelook.com only.

use super::QueryPlan;
use crate::types::query::{format_inr, Query};

/// Venues wanted before the "more results" pass is skipped.
pub const FIRST_PASS_TARGET: usize = 3;

/// Hard cap on returned venues.
pub const CAP: usize = 6;

pub const SITE: &str = "venuelook.com";

pub fn plan(query: &Query) -> QueryPlan {
    let venue_type = query.venue_type_or_default();
    let location = query.location.trim();
    let event = query.event_type.trim();

    let mut full = format!("{venue_type} for {event} in {location}");
    if let Some(guests) = query.guest_count {
        full.push_str(&format!(" for {guests} guests"));
    }
    full.push_str(&format!(
        " budget ₹{} site:{SITE}",
        format_inr(query.budget_inr)
    ));

    QueryPlan {
        primary: vec![full],
        fallback: vec![
            format!("{venue_type} for {event} in {location} site:{SITE}"),
            format!("venue {location} event site:{SITE}"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_query_carries_every_attribute() {
        let query = Query::venue("Mumbai", "wedding", 500_000)
            .with_venue_type("banquet hall")
            .with_guest_count(200);

        let plan = plan(&query);

        assert_eq!(
            plan.primary,
            vec!["banquet hall for wedding in Mumbai for 200 guests budget ₹5,00,000 site:venuelook.com"]
        );
    }

    #[test]
    fn test_fallback_drops_budget_and_guests() {
        let query = Query::venue("Pune", "birthday", 80_000).with_guest_count(50);

        let plan = plan(&query);

        assert_eq!(plan.fallback.len(), 2);
        assert!(!plan.fallback[0].contains("guests"));
        assert!(!plan.fallback[0].contains('₹'));
        assert_eq!(plan.fallback[1], "venue Pune event site:venuelook.com");
        assert!(plan.all().all(|q| q.contains("site:venuelook.com")));
    }

    #[test]
    fn test_guestless_query_omits_guests() {
        let plan = plan(&Query::venue("Delhi", "party", 1_000));
        assert_eq!(plan.primary[0], "venue for party in Delhi budget ₹1,000 site:venuelook.com");
    }
}
