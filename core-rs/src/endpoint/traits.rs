//! Graph query endpoint trait
//!
//! The single seam between the orchestrator and whatever answers SPARQL:
//! - SparqlHttpEndpoint (remote SPARQL 1.1 protocol service)
//! - LocalStoreEndpoint (in-memory Oxigraph store, offline and tests)

use async_trait::async_trait;
use std::fmt;

use crate::endpoint::results::QueryResponse;
use crate::errors::Result;

/// HTTP verb convention for sending a query
///
/// Short queries go as GET (cacheable by public endpoints), long ones as a
/// form-encoded POST body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Get,
    Post,
}

impl Transport {
    /// Pick the transport for a query of `len` bytes
    pub fn for_length(len: usize, post_threshold: usize) -> Self {
        if len > post_threshold {
            Transport::Post
        } else {
            Transport::Get
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Get => write!(f, "GET"),
            Transport::Post => write!(f, "POST"),
        }
    }
}

/// Something that evaluates SELECT query text and returns row bindings
///
/// Failures (unreachable service, error status, undecodable body) are
/// reported as `GrontopiError::Upstream`.
#[async_trait]
pub trait GraphQueryEndpoint: Send + Sync {
    async fn query(&self, query: &str, transport: Transport) -> Result<QueryResponse>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}
