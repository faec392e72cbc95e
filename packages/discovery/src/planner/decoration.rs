//! Decoration listing: ordinary offline results plus a curated online section.

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::pipeline::search::{on_site, SearchClient};
use crate::types::provider::{Listing, Provider, SectionHeader};

/// Most offline decorators shown.
pub const OFFLINE_CAP: usize = 6;

pub const OFFLINE_HEADER: &str = "Offline Decoration Vendors";
pub const ONLINE_HEADER: &str = "Online Decoration Vendors";

const ONLINE_VENDORS_JSON: &str = include_str!("../../data/online_decoration_vendors.json");

/// A curated online decoration vendor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OnlineVendor {
    pub name: String,
    pub domain: String,
    /// Search string with a `{location}` placeholder
    pub search: String,
    /// Used when no search hit lands on `domain`
    pub fallback_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl OnlineVendor {
    pub fn search_query(&self, location: &str) -> String {
        self.search.replace("{location}", location.trim())
    }

    fn into_provider(self, website: String) -> Provider {
        let mut provider = Provider::new(self.name, website.clone());
        provider.details.website = Some(website);
        provider.details.description = self.description;
        provider.details.service_type = Some("online decoration".to_string());
        provider.details.source_site = Some(self.domain);
        provider
    }
}

/// The curated list, in declared order.
pub fn online_vendors() -> Result<Vec<OnlineVendor>> {
    Ok(serde_json::from_str(ONLINE_VENDORS_JSON)?)
}

/// Resolve a link for every curated vendor, preserving declared order.
pub async fn online_section(search: &SearchClient, location: &str) -> Result<Vec<Provider>> {
    let mut providers = Vec::new();

    for vendor in online_vendors()? {
        let hits = search.search(&vendor.search_query(location), 10).await;
        let website = match hits.into_iter().find(|hit| on_site(&hit.url, &vendor.domain)) {
            Some(hit) => hit.url,
            None => {
                debug!(vendor = %vendor.name, "no on-site hit, using fallback URL");
                vendor.fallback_url.clone()
            }
        };
        providers.push(vendor.into_provider(website));
    }

    Ok(providers)
}

/// `[offline header, offline..., online header, online...]`
pub fn assemble(offline: Vec<Provider>, online: Vec<Provider>) -> Vec<Listing> {
    let mut listing = Vec::with_capacity(offline.len() + online.len() + 2);
    listing.push(Listing::Header(SectionHeader::new(OFFLINE_HEADER)));
    listing.extend(offline.into_iter().take(OFFLINE_CAP).map(Listing::from));
    listing.push(Listing::Header(SectionHeader::new(ONLINE_HEADER)));
    listing.extend(online.into_iter().map(Listing::from));
    listing
}
