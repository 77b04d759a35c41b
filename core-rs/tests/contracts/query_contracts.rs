// Query Contract Tests
//
// These tests verify INVARIANTS of the query orchestrator that MUST NEVER BREAK.
// They run real SPARQL against the in-memory store loaded from the data fixture.

use crate::support::{data, local_orchestrator, local_store, orchestrator, CountingEndpoint};
use grontopi_core::cache::MemoryResultCache;
use grontopi_core::query::SparqlQuery;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn ids(locals: &[&str]) -> Vec<String> {
    locals.iter().map(|l| data(l)).collect()
}

/// WHY: Batch lookups skip link expansion
/// REASON: One link query per entity would multiply upstream load for list views
/// BREAKS: Endpoint rate limits on every search result page
#[tokio::test]
async fn batch_lookup_leaves_property_lists_empty() {
    let orch = local_orchestrator();

    let batch = orch
        .fetch_entities_by_ids(&ids(&["cervantes", "quijote"]), "en", false)
        .await
        .unwrap();
    assert_eq!(batch.len(), 2);
    for description in &batch {
        assert!(description.data_properties.is_empty());
        assert!(description.object_properties.is_empty());
        assert!(description.inverse_properties.is_empty());
    }
}

/// WHY: A single id is always expanded, forced or not
/// REASON: Entity detail pages request exactly one id
/// BREAKS: Detail pages render without properties
#[tokio::test]
async fn single_lookup_populates_properties() {
    let orch = local_orchestrator();

    let single = orch
        .fetch_entities_by_ids(&ids(&["cervantes"]), "en", false)
        .await
        .unwrap();
    assert_eq!(single.len(), 1);
    assert!(!single[0].data_properties.is_empty());
    assert!(!single[0].object_properties.is_empty());
}

/// WHY: "Not found" is decided by the caller from empty property lists
/// REASON: The endpoint cannot tell an unlinked entity from a missing one
/// BREAKS: Boundary layer turns unknown ids into server errors
#[tokio::test]
async fn unlinked_entity_yields_empty_lists_not_error() {
    let orch = local_orchestrator();

    let lonely = orch
        .fetch_entities_by_ids(&ids(&["lonely"]), "en", true)
        .await
        .unwrap();
    assert_eq!(lonely.len(), 1);
    assert!(lonely[0].data_properties.is_empty());
    assert!(lonely[0].object_properties.is_empty());
    assert!(lonely[0].inverse_properties.is_empty());
    assert!(!lonely[0].has_properties());
}

/// WHY: The cache key is the normalized query text
/// REASON: Ids given as <iri> or iri, or queries differing only in
///         indentation, are the same logical query
/// BREAKS: Repeated requests hit the endpoint every time
#[tokio::test]
async fn identical_logical_query_reaches_upstream_once() {
    let endpoint = Arc::new(CountingEndpoint::new(local_store()));
    let cache = Arc::new(MemoryResultCache::new(100, Duration::from_secs(60)));
    let orch = orchestrator(endpoint.clone(), cache);

    let first = orch
        .check_existence(&[data("cervantes"), data("ghost")])
        .await
        .unwrap();
    let second = orch
        .check_existence(&[format!("<{}>", data("cervantes")), format!("<{}>", data("ghost"))])
        .await
        .unwrap();

    assert_eq!(endpoint.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(first, vec![data("ghost")]);

    let a = SparqlQuery::new("SELECT ?s\n    WHERE { ?s ?p ?o }\n");
    let b = SparqlQuery::new("  SELECT ?s\nWHERE { ?s ?p ?o }   \n");
    assert_eq!(a.normalized(), b.normalized());
}

/// WHY: Adjacent pages never overlap
/// REASON: Clients page through class listings with start/count, and
///         entities routinely carry several labels
/// BREAKS: Duplicate or missing rows in paged lists
#[tokio::test]
async fn adjacent_pages_are_disjoint_and_cover_the_whole() {
    let orch = local_orchestrator();
    // Person instances: cervantes (two labels, one per language), lonely
    // (none), ana (labels under two predicates), bob (two English labels)
    let class = "http://example.org/onto/Person";

    let entities = |page: grontopi_core::EntityListWithLabels| -> Vec<String> {
        page.entities_with_labels
            .into_iter()
            .map(|e| e.entity)
            .collect()
    };

    let mut paged = Vec::new();
    for start in 0..4 {
        let page = entities(orch.fetch_entities_of_class(class, start, 1, "en", "").await.unwrap());
        assert_eq!(page.len(), 1, "page {} should hold exactly one entity", start);
        paged.extend(page);
    }
    let past_end = entities(orch.fetch_entities_of_class(class, 4, 1, "en", "").await.unwrap());
    assert!(past_end.is_empty());

    let distinct: HashSet<String> = paged.iter().cloned().collect();
    assert_eq!(distinct.len(), paged.len(), "an entity appeared on two pages");

    let first_two = entities(orch.fetch_entities_of_class(class, 0, 2, "en", "").await.unwrap());
    let next_two = entities(orch.fetch_entities_of_class(class, 2, 2, "en", "").await.unwrap());
    let whole = entities(orch.fetch_entities_of_class(class, 0, 4, "en", "").await.unwrap());
    assert_eq!(whole.len(), 4);

    let union: HashSet<String> = first_two.into_iter().chain(next_two).collect();
    let whole: HashSet<String> = whole.into_iter().collect();
    assert_eq!(union, whole);
    assert_eq!(distinct, whole);
    assert!(whole.contains(&data("bob")));
    assert!(whole.contains(&data("ana")));
}

/// WHY: Upstream failure must never look like an empty answer
/// REASON: "No such entity" and "endpoint down" need different responses
/// BREAKS: Outages reported to users as missing data
#[tokio::test]
async fn upstream_failure_is_not_an_empty_result() {
    use crate::support::FailingEndpoint;
    use grontopi_core::cache::NoopCache;

    let orch = orchestrator(Arc::new(FailingEndpoint), Arc::new(NoopCache));

    let result = orch.check_existence(&[data("cervantes")]).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().is_upstream());
}
