//! Query orchestration
//!
//! - builder: SPARQL text for labels, classes, links and class listings
//! - records: EntityDescription, NeighbourhoodSummary and friends
//! - orchestrator: the four lookups, executed through the result cache

pub mod builder;
pub mod orchestrator;
pub mod records;

pub use builder::{entity_iri, language_tag, normalize, QueryContext, SparqlQuery};
pub use orchestrator::{QueryOrchestrator, QuerySettings};
pub use records::{
    CentralRole, EntityDescription, EntityListWithLabels, EntityWithLabel, LabelWithLang,
    NeighbourDescriptor, NeighbourhoodSummary, PredicateLiteralTuple, PredicateObjectTuple,
};
