//! AppContext: everything built once at startup
//!
//! The schema is loaded and materialized before any orchestrator exists;
//! a missing or unparsable schema stops startup here.

use std::sync::Arc;
use tracing::info;

use crate::cache::{MemoryResultCache, NoopCache, ResultCache};
use crate::config::ServiceConfig;
use crate::endpoint::{GraphQueryEndpoint, SparqlHttpEndpoint};
use crate::errors::Result;
use crate::ontology::OntologyModel;
use crate::query::QueryOrchestrator;

pub struct AppContext {
    pub config: ServiceConfig,
    pub ontology: Arc<OntologyModel>,
    pub endpoint: Arc<dyn GraphQueryEndpoint>,
    pub cache: Arc<dyn ResultCache>,
}

impl AppContext {
    /// Load the schema, connect the configured SPARQL endpoint and set up
    /// an in-memory result cache
    pub fn bootstrap(config: ServiceConfig) -> Result<Self> {
        let ontology = OntologyModel::load(&config.ontology_path, &config)?;
        let endpoint = SparqlHttpEndpoint::from_config(&config)?;
        let cache = MemoryResultCache::from_config(&config);

        info!(
            endpoint = %endpoint.url(),
            cache_ttl_secs = config.cache_ttl_secs,
            "service context ready"
        );
        Ok(Self::with_components(
            config,
            Arc::new(ontology),
            Arc::new(endpoint),
            Arc::new(cache),
        ))
    }

    pub fn with_components(
        config: ServiceConfig,
        ontology: Arc<OntologyModel>,
        endpoint: Arc<dyn GraphQueryEndpoint>,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        Self {
            config,
            ontology,
            endpoint,
            cache,
        }
    }

    /// Swap the endpoint (e.g. for a local data file)
    pub fn with_endpoint(mut self, endpoint: Arc<dyn GraphQueryEndpoint>) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = Arc::new(NoopCache);
        self
    }

    pub fn orchestrator(&self) -> QueryOrchestrator {
        QueryOrchestrator::from_config(
            &self.config,
            Arc::clone(&self.ontology),
            Arc::clone(&self.endpoint),
            Arc::clone(&self.cache),
        )
    }
}
