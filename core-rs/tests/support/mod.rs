//! Shared fixtures for integration and contract tests
//!
//! Each test binary pulls this in with `#[path = "../support/mod.rs"] mod support;`
//! and uses whatever subset it needs.
#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use grontopi_core::cache::{NoopCache, ResultCache};
use grontopi_core::endpoint::{GraphQueryEndpoint, LocalStoreEndpoint, QueryResponse, Transport};
use grontopi_core::query::{QueryContext, QueryOrchestrator, QuerySettings};
use grontopi_core::{GrontopiError, OntologyModel, Result, ServiceConfig};

pub const ONTO: &str = "http://example.org/onto/";
pub const DATA: &str = "http://example.org/data/";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("core-rs/tests/fixtures")
        .join(name)
}

pub fn onto(local: &str) -> String {
    format!("{}{}", ONTO, local)
}

pub fn data(local: &str) -> String {
    format!("{}{}", DATA, local)
}

pub fn config() -> ServiceConfig {
    ServiceConfig {
        ontology_namespace: ONTO.to_string(),
        ontology_path: fixture("ontology.ttl"),
        ..ServiceConfig::default()
    }
}

pub fn model() -> Arc<OntologyModel> {
    let config = config();
    Arc::new(OntologyModel::load(&config.ontology_path, &config).unwrap())
}

pub fn local_store() -> LocalStoreEndpoint {
    LocalStoreEndpoint::load_file(fixture("data.ttl")).unwrap()
}

pub fn orchestrator(endpoint: Arc<dyn GraphQueryEndpoint>, cache: Arc<dyn ResultCache>) -> QueryOrchestrator {
    let config = config();
    QueryOrchestrator::new(
        model(),
        endpoint,
        cache,
        QueryContext::from_config(&config),
        QuerySettings {
            post_threshold: config.post_threshold,
        },
    )
}

/// Orchestrator over the data fixture with no cache
pub fn local_orchestrator() -> QueryOrchestrator {
    orchestrator(Arc::new(local_store()), Arc::new(NoopCache))
}

/// Wraps another endpoint and records every query it forwards
pub struct CountingEndpoint<E> {
    inner: E,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, Transport)>>,
}

impl<E: GraphQueryEndpoint> CountingEndpoint<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn transports(&self) -> Vec<Transport> {
        self.seen.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn queries(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
    }
}

#[async_trait]
impl<E: GraphQueryEndpoint> GraphQueryEndpoint for CountingEndpoint<E> {
    async fn query(&self, query: &str, transport: Transport) -> Result<QueryResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((query.to_string(), transport));
        self.inner.query(query, transport).await
    }

    fn describe(&self) -> String {
        format!("counting({})", self.inner.describe())
    }
}

/// Answers every query with the same rows
pub struct CannedEndpoint(pub QueryResponse);

#[async_trait]
impl GraphQueryEndpoint for CannedEndpoint {
    async fn query(&self, _query: &str, _transport: Transport) -> Result<QueryResponse> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "canned".to_string()
    }
}

/// Always unreachable
pub struct FailingEndpoint;

#[async_trait]
impl GraphQueryEndpoint for FailingEndpoint {
    async fn query(&self, _query: &str, _transport: Transport) -> Result<QueryResponse> {
        Err(GrontopiError::Upstream("503 Service Unavailable".to_string()))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}
