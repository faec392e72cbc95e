//! Pipeline stages, leaves first.

pub mod dedup;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod governor;
pub mod orchestrate;
pub mod prompts;
pub mod search;
pub mod session;

pub use dedup::dedup;
pub use enrich::Enricher;
pub use extract::StructuredExtractor;
pub use fetch::ContentFetcher;
pub use governor::{ApiClass, RateGovernor};
pub use orchestrate::Orchestrator;
pub use search::SearchClient;
pub use session::{DropReason, PipelineSession, UrlOutcome};
