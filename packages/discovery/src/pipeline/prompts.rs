//! LLM prompts for extraction and enrichment.

use crate::planner::Specialisation;
use crate::types::query::{format_inr, Query};

const VENUE_FIELDS: &str =
    "name, address, contact, price, rating, capacity, description, website";
const VENDOR_FIELDS: &str = "name, address, contact, price, rating, description, website";

/// System prompt for turning one page into one provider record.
pub fn extraction_system(specialisation: &Specialisation, query: &Query) -> String {
    let (subject, fields) = if specialisation.is_venue() {
        ("event venue", VENUE_FIELDS)
    } else {
        ("event service vendor", VENDOR_FIELDS)
    };

    let mut hints = format!(
        "The client is planning a {} in {} with a budget of ₹{}",
        query.event_type.trim(),
        query.location.trim(),
        format_inr(query.budget_inr)
    );
    if let Some(guests) = query.guest_count {
        hints.push_str(&format!(" for {guests} guests"));
    }
    if !specialisation.is_venue() {
        hints.push_str(&format!(
            " and needs {}",
            specialisation.service().to_lowercase()
        ));
    }

    format!(
        "You extract details of one {subject} from web page text.\n\
         Return a single JSON object with exactly these keys: {fields}.\n\
         {hints}. Prefer price details per plate, per day or per event when the page gives them.\n\
         Use null for any value the page does not state. Never guess or invent values.\n\
         Respond with JSON only."
    )
}

/// User prompt carrying the first `max_chars` characters of the page.
pub fn extraction_user(specialisation: &Specialisation, text: &str, max_chars: usize) -> String {
    let excerpt: String = text.chars().take(max_chars).collect();
    let subject = if specialisation.is_venue() {
        "venue"
    } else {
        "vendor"
    };
    format!("Extract the {subject} described on this page:\n\n{excerpt}")
}

pub fn phone_lookup(name: &str, snippets: &str) -> String {
    format!(
        "Extract the phone number for {name} from these search results. \
         Reply with the number only, or \"not available\".\n\n{snippets}"
    )
}

pub fn price_lookup(name: &str, service: &str, snippets: &str) -> String {
    format!(
        "From these search results, state the typical price of {name} ({service}) in rupees \
         in one short line. Reply \"not available\" if no price is mentioned.\n\n{snippets}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_prompt_lists_capacity_and_hints() {
        let query = Query::venue("Mumbai", "wedding", 500_000).with_guest_count(200);
        let prompt = extraction_system(&Specialisation::venue(), &query);

        assert!(prompt.contains("capacity"));
        assert!(prompt.contains("200 guests"));
        assert!(prompt.contains("₹5,00,000"));
        assert!(prompt.contains("JSON only"));
    }

    #[test]
    fn test_vendor_prompt_has_no_capacity() {
        let query = Query::new("Catering", "Pune", "birthday", 50_000);
        let prompt = extraction_system(&Specialisation::for_query(&query), &query);
        assert!(!prompt.contains("capacity"));
        assert!(prompt.contains("needs catering"));
    }

    #[test]
    fn test_user_prompt_truncates_by_chars() {
        let text = "₹".repeat(4000);
        let prompt = extraction_user(&Specialisation::venue(), &text, 3000);
        assert_eq!(prompt.chars().filter(|c| *c == '₹').count(), 3000);
    }
}
