//! Graph query endpoints
//!
//! - traits: `GraphQueryEndpoint` and the GET/POST `Transport` hint
//! - results: SPARQL JSON result rows
//! - sparql: remote SPARQL endpoint over HTTP
//! - local: in-memory Oxigraph store

pub mod local;
pub mod results;
pub mod sparql;
pub mod traits;

pub use local::LocalStoreEndpoint;
pub use results::{Binding, BoundTerm, QueryResponse, TermKind};
pub use sparql::SparqlHttpEndpoint;
pub use traits::{GraphQueryEndpoint, Transport};
