//! Contract Tests - Materialization and Query Invariant Protection
//!
//! This file aggregates all contract test modules.
//! Contract tests verify invariants that MUST NEVER BREAK.

#[path = "../support/mod.rs"]
mod support;

// Contract test modules
mod contracts {
    // Schema materialization contracts
    mod materialization {
        include!("materialization_contracts.rs");
    }

    // Orchestrator, cache and pagination contracts
    mod query {
        include!("query_contracts.rs");
    }
}
