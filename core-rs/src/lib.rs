//! # GrOntoPI Core - ontology-aware lookups over a SPARQL endpoint
//!
//! Two parts do the work:
//!
//! - **OntologyModel** loads a small OWL/RDFS/SKOS schema once and
//!   materializes what requests need: inherited domain/range facts, the
//!   superclass index, 0/1/2 hierarchy levels, grouping names ("shoulders")
//!   and catalog trees.
//! - **QueryOrchestrator** turns "describe these entities", "list this
//!   class", "which of these exist" and "what is around this entity" into
//!   batched SPARQL, fronted by a cache keyed on normalized query text.
//!
//! ## Architecture
//!
//! ```text
//!   ServiceConfig ──► AppContext ──► QueryOrchestrator
//!                        │               │        │
//!                 OntologyModel    ResultCache  GraphQueryEndpoint
//!                  (read-only)     (moka TTL)   (HTTP / local store)
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod errors;
pub mod ontology;
pub mod query;

pub use cache::{MemoryResultCache, NoopCache, ResultCache};
pub use config::ServiceConfig;
pub use context::AppContext;
pub use endpoint::{GraphQueryEndpoint, LocalStoreEndpoint, QueryResponse, SparqlHttpEndpoint, Transport};
pub use errors::{GrontopiError, Result};
pub use ontology::{OntologyModel, SchemaDump};
pub use query::{EntityDescription, EntityListWithLabels, NeighbourhoodSummary, QueryOrchestrator};

/// Crate version, also used in the default user agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
