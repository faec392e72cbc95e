//! Venue and Vendor Discovery
//!
//! Turns a structured event-service query into a deduplicated, enriched list
//! of candidate providers: targeted web search, page scraping, LLM
//! extraction and a secondary enrichment pass, all under per-API rate
//! limits and partial failure.
//!
//! # Usage
//!
//! ```rust,ignore
//! use discovery::{Discovery, DiscoveryConfig, Query};
//!
//! let discovery = Discovery::from_env(DiscoveryConfig::default())?;
//! let caterers = discovery
//!     .discover(&Query::new("catering", "Pune", "wedding", 300_000))
//!     .await?;
//! ```
//!
//! For offline runs wire the mocks from [`testing`] into [`Discovery::new`]
//! together with [`DiscoveryConfig::unthrottled`].
//!
//! # Modules
//!
//! - [`traits`] - Seams to the search API, web pages and the LLM
//! - [`types`] - Queries, hits, providers, configuration
//! - [`pipeline`] - Governor, search, fetch, extract, orchestrate, enrich
//! - [`planner`] - Category registry and per-category query plans
//! - [`searchers`], [`fetchers`], [`ai`] - Live backends
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod discovery;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod planner;
pub mod searchers;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

pub use discovery::{discover_json, error_sentinel, Discovery};
pub use error::{DiscoveryError, Result, TransientError};
pub use planner::{QueryPlan, ServiceCategory, Specialisation};
pub use security::Credentials;
pub use traits::{
    chat::{ChatModel, CompletionRequest},
    fetcher::PageFetcher,
    searcher::WebSearcher,
};
pub use types::{
    config::{DiscoveryConfig, RetryPolicy},
    hit::{RawContent, SearchHit},
    provider::{Candidate, Listing, Provider, ProviderDetails, SectionHeader},
    query::{format_inr, Query},
};
