//! Cache module for query results
//!
//! Fronts every endpoint call. Keys are normalized query text, values the
//! raw row bindings.

pub mod result_cache;

pub use result_cache::{MemoryResultCache, NoopCache, ResultCache};
