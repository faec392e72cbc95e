//! Public entry point: one query in, a ranked provider list out.

use std::sync::Arc;

use mistral_client::MistralClient;
use serde_json::{json, Value};
use tracing::{info, info_span, Instrument};

use crate::ai::MistralChat;
use crate::error::{DiscoveryError, Result};
use crate::fetchers::HttpPageFetcher;
use crate::pipeline::{
    ContentFetcher, Enricher, Orchestrator, PipelineSession, RateGovernor, SearchClient,
    StructuredExtractor,
};
use crate::planner::{decoration, ServiceCategory, Specialisation};
use crate::searchers::SerperSearcher;
use crate::security::Credentials;
use crate::traits::{chat::ChatModel, fetcher::PageFetcher, searcher::WebSearcher};
use crate::types::config::DiscoveryConfig;
use crate::types::provider::{Listing, Provider};
use crate::types::query::Query;

/// The discovery engine.
///
/// Holds only the backends and configuration. Every call builds its own
/// governor and session, so concurrent calls share nothing mutable.
///
/// # Example
///
/// ```rust,ignore
/// use discovery::{Discovery, DiscoveryConfig, Query};
///
/// let discovery = Discovery::from_env(DiscoveryConfig::default())?;
/// let query = Query::venue("Mumbai", "wedding", 500_000)
///     .with_venue_type("banquet hall")
///     .with_guest_count(200);
///
/// for listing in discovery.discover(&query).await? {
///     println!("{:?}", listing);
/// }
/// ```
#[derive(Clone)]
pub struct Discovery {
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn PageFetcher>,
    chat: Arc<dyn ChatModel>,
    config: DiscoveryConfig,
}

/// Stages wired to one invocation's governor.
struct Stages {
    session: PipelineSession,
    search: SearchClient,
    orchestrator: Orchestrator,
    enricher: Enricher,
}

impl Discovery {
    pub fn new(
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn PageFetcher>,
        chat: Arc<dyn ChatModel>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            searcher,
            fetcher,
            chat,
            config,
        }
    }

    /// Live backends with keys from `SERPER_API_KEY` and `MISTRAL_API_KEY`.
    pub fn from_env(config: DiscoveryConfig) -> Result<Self> {
        Self::from_credentials(&Credentials::from_env()?, config)
    }

    pub fn from_credentials(credentials: &Credentials, config: DiscoveryConfig) -> Result<Self> {
        let searcher =
            SerperSearcher::new(credentials.serper_api_key.clone(), config.search_timeout)?;
        let fetcher = HttpPageFetcher::new(config.fetch_timeout)?;
        let client = MistralClient::new(credentials.mistral_api_key.expose())
            .with_timeout(config.llm_timeout)
            .map_err(DiscoveryError::http)?;
        let chat = MistralChat::new(client, config.model.clone());

        Ok(Self::new(
            Arc::new(searcher),
            Arc::new(fetcher),
            Arc::new(chat),
            config,
        ))
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    fn stages(&self) -> Stages {
        let governor = Arc::new(RateGovernor::from_config(&self.config));
        let search = SearchClient::new(
            self.searcher.clone(),
            governor.clone(),
            self.config.search_retry.clone(),
        );
        let fetcher = ContentFetcher::new(
            self.fetcher.clone(),
            governor.clone(),
            self.config.min_content_chars,
        );
        let extractor = StructuredExtractor::new(self.chat.clone(), governor.clone(), &self.config);

        Stages {
            orchestrator: Orchestrator::new(
                search.clone(),
                fetcher,
                extractor,
                self.config.clone(),
            ),
            enricher: Enricher::new(search.clone(), self.chat.clone(), governor.clone(), &self.config),
            session: PipelineSession::new(governor),
            search,
        }
    }

    /// Route by category: `venue` takes the venue path, everything else the
    /// vendor registry.
    pub async fn discover(&self, query: &Query) -> Result<Vec<Listing>> {
        query.validate()?;

        let span = info_span!(
            "discover",
            category = %query.category,
            location = %query.location
        );
        async move {
            if query.is_venue() {
                let venues = self.venues(query).await?;
                Ok(venues.into_iter().map(Listing::from).collect())
            } else {
                self.vendors(query).await
            }
        }
        .instrument(span)
        .await
    }

    /// Venue path, whatever `query.category` says.
    pub async fn discover_venues(&self, query: &Query) -> Result<Vec<Provider>> {
        query.validate()?;
        self.venues(query)
            .instrument(info_span!("discover_venues", location = %query.location))
            .await
    }

    /// Vendor path for `query.category`. Decoration comes back in two
    /// sections with header records.
    pub async fn discover_vendors(&self, query: &Query) -> Result<Vec<Listing>> {
        query.validate()?;
        self.vendors(query)
            .instrument(info_span!(
                "discover_vendors",
                service = %query.category,
                location = %query.location
            ))
            .await
    }

    async fn venues(&self, query: &Query) -> Result<Vec<Provider>> {
        let specialisation = Specialisation::venue();
        self.run(&specialisation, query).await
    }

    async fn vendors(&self, query: &Query) -> Result<Vec<Listing>> {
        let specialisation = Specialisation::for_service(&query.category);
        if specialisation.category != ServiceCategory::Decoration {
            let providers = self.run(&specialisation, query).await?;
            return Ok(providers.into_iter().map(Listing::from).collect());
        }

        // An empty offline section fails the whole call.
        let stages = self.stages();
        let offline = self.run_with(&stages, &specialisation, query).await?;
        let online = decoration::online_section(&stages.search, &query.location).await?;

        Ok(decoration::assemble(offline, online))
    }

    async fn run(&self, specialisation: &Specialisation, query: &Query) -> Result<Vec<Provider>> {
        let stages = self.stages();
        self.run_with(&stages, specialisation, query).await
    }

    async fn run_with(
        &self,
        stages: &Stages,
        specialisation: &Specialisation,
        query: &Query,
    ) -> Result<Vec<Provider>> {
        info!(
            session = %stages.session.id,
            category = %specialisation.category,
            "discovery started"
        );

        let providers = stages
            .orchestrator
            .run(&stages.session, specialisation, query)
            .await?;
        let providers = stages
            .enricher
            .enrich(providers, specialisation, query)
            .await;

        info!(session = %stages.session.id, count = providers.len(), "discovery finished");
        Ok(providers)
    }

    /// [`discover`](Self::discover) rendered as JSON: the listing array, or
    /// `[{ "error": "<message>" }]`.
    pub async fn discover_json(&self, query: &Query) -> Value {
        match self.discover(query).await {
            Ok(listings) => match serde_json::to_value(listings) {
                Ok(value) => value,
                Err(e) => error_sentinel(&e.into()),
            },
            Err(e) => error_sentinel(&e),
        }
    }
}

/// One-shot JSON call with live backends, for callers that expect the
/// list-or-sentinel shape. Missing credentials give
/// `[{ "error": "Missing API keys" }]`.
pub async fn discover_json(query: &Query, config: DiscoveryConfig) -> Value {
    match Discovery::from_env(config) {
        Ok(discovery) => discovery.discover_json(query).await,
        Err(e) => error_sentinel(&e),
    }
}

/// `[{ "error": "<message>" }]`
pub fn error_sentinel(error: &DiscoveryError) -> Value {
    json!([{ "error": error.sentinel_message() }])
}
