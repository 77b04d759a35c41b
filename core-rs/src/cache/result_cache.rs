//! Query result cache keyed by normalized query text
//!
//! Concurrent requests computing the same key may both miss and both write;
//! the second write overwrites the first with an equal value.

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::endpoint::QueryResponse;

/// Key-value store for raw query results
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<QueryResponse>;
    async fn set(&self, key: &str, value: QueryResponse);
}

/// In-process cache with time-based expiry and a bounded entry count
#[derive(Clone)]
pub struct MemoryResultCache {
    inner: Cache<String, QueryResponse>,
}

impl MemoryResultCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        )
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[async_trait]
impl ResultCache for MemoryResultCache {
    async fn get(&self, key: &str) -> Option<QueryResponse> {
        let hit = self.inner.get(key).await;
        debug!(hit = hit.is_some(), "result cache lookup");
        hit
    }

    async fn set(&self, key: &str, value: QueryResponse) {
        self.inner.insert(key.to_string(), value).await;
    }
}

/// Cache that stores nothing (`--no-cache`)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl ResultCache for NoopCache {
    async fn get(&self, _key: &str) -> Option<QueryResponse> {
        None
    }

    async fn set(&self, _key: &str, _value: QueryResponse) {}
}
