//! Integration tests for the query orchestrator
//!
//! Real SPARQL evaluated by the in-memory store over tests/fixtures/data.ttl,
//! with the schema from tests/fixtures/ontology.ttl.

#[path = "../support/mod.rs"]
mod support;

use grontopi_core::cache::{MemoryResultCache, NoopCache};
use grontopi_core::endpoint::Transport;
use grontopi_core::query::{CentralRole, EntityDescription};
use grontopi_core::{AppContext, GrontopiError};
use std::sync::Arc;
use std::time::Duration;
use support::{
    config, data, local_orchestrator, local_store, model, onto, orchestrator, CountingEndpoint,
    FailingEndpoint,
};

fn ids(locals: &[&str]) -> Vec<String> {
    locals.iter().map(|l| data(l)).collect()
}

fn find<'a>(descriptions: &'a [EntityDescription], local: &str) -> &'a EntityDescription {
    let uri = data(local);
    descriptions
        .iter()
        .find(|d| d.uri == uri)
        .unwrap_or_else(|| panic!("no description for {}", uri))
}

#[tokio::test]
async fn test_single_entity_is_fully_described() {
    let orch = local_orchestrator();

    let result = orch
        .fetch_entities_by_ids(&ids(&["cervantes"]), "en", false)
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    let cervantes = &result[0];

    assert_eq!(cervantes.class_id, onto("Writer"));
    assert_eq!(cervantes.labels.len(), 1);
    assert_eq!(cervantes.labels[0].label_value, "Miguel de Cervantes");
    assert_eq!(cervantes.labels[0].label_lang.as_deref(), Some("en"));
    assert!(cervantes.longname.starts_with("miguel de cervantes"));

    let data_preds: Vec<&str> = cervantes
        .data_properties
        .iter()
        .map(|t| t.predicate.as_str())
        .collect();
    assert_eq!(data_preds.len(), 2);
    assert!(data_preds.contains(&onto("birthDate").as_str()));
    assert!(data_preds.contains(&onto("name").as_str()));

    let birth = cervantes
        .data_properties
        .iter()
        .find(|t| t.predicate == onto("birthDate"))
        .unwrap();
    assert_eq!(
        birth.datatype.as_deref(),
        Some("http://www.w3.org/2001/XMLSchema#dateTime")
    );

    let mut outgoing: Vec<(&str, &str)> = cervantes
        .object_properties
        .iter()
        .map(|t| (t.predicate.as_str(), t.object.as_str()))
        .collect();
    outgoing.sort();
    let born_in = onto("bornIn");
    let wrote = onto("wrote");
    let alcala = data("alcala");
    let quijote = data("quijote");
    assert_eq!(
        outgoing,
        vec![(born_in.as_str(), alcala.as_str()), (wrote.as_str(), quijote.as_str())]
    );
    assert!(cervantes.inverse_properties.is_empty());
}

#[tokio::test]
async fn test_neighbour_labels_are_patched_in() {
    let orch = local_orchestrator();

    let result = orch
        .fetch_entities_by_ids(&ids(&["cervantes"]), "en", false)
        .await
        .unwrap();
    let born = result[0]
        .object_properties
        .iter()
        .find(|t| t.object == data("alcala"))
        .unwrap();

    assert_eq!(born.object_labels.len(), 1);
    assert_eq!(born.object_labels[0].label_value, "Alcalá de Henares");
    assert_eq!(born.object_labels[0].label_lang, None);
}

#[tokio::test]
async fn test_incoming_links_become_inverse_properties() {
    let orch = local_orchestrator();

    let result = orch
        .fetch_entities_by_ids(&ids(&["quijote"]), "en", false)
        .await
        .unwrap();
    let quijote = &result[0];

    assert_eq!(quijote.class_id, onto("Work"));
    assert_eq!(quijote.inverse_properties.len(), 1);
    let inverse = &quijote.inverse_properties[0];
    assert_eq!(inverse.predicate, onto("wrote"));
    assert_eq!(inverse.object, data("cervantes"));
    assert_eq!(inverse.object_labels[0].label_value, "Miguel de Cervantes");
}

#[tokio::test]
async fn test_language_selects_labels() {
    let orch = local_orchestrator();

    let result = orch
        .fetch_entities_by_ids(&ids(&["cervantes"]), "es", false)
        .await
        .unwrap();
    assert_eq!(result[0].labels.len(), 1);
    assert_eq!(result[0].labels[0].label_value, "Miguel de Cervantes Saavedra");
}

#[tokio::test]
async fn test_other_language_label_does_not_hide_matching_one() {
    let orch = local_orchestrator();

    // ana has rdfs:label "Ana"@en and skos:prefLabel "Anne"@fr
    let result = orch
        .fetch_entities_by_ids(&ids(&["ana", "cervantes"]), "en", false)
        .await
        .unwrap();
    let ana = find(&result, "ana");
    assert_eq!(ana.labels.len(), 1);
    assert_eq!(ana.labels[0].label_value, "Ana");
    assert_eq!(ana.labels[0].label_predicate, "http://www.w3.org/2000/01/rdf-schema#label");

    let result = orch
        .fetch_entities_by_ids(&ids(&["ana", "cervantes"]), "fr", false)
        .await
        .unwrap();
    let ana = find(&result, "ana");
    assert_eq!(ana.labels.len(), 1);
    assert_eq!(ana.labels[0].label_value, "Anne");
    assert_eq!(ana.labels[0].label_lang.as_deref(), Some("fr"));
}

#[tokio::test]
async fn test_class_listing_keeps_entity_with_mixed_language_labels() {
    let orch = local_orchestrator();

    let page = orch
        .fetch_entities_of_class(&onto("Person"), 0, 10, "en", "")
        .await
        .unwrap();
    let ana = page
        .entities_with_labels
        .iter()
        .find(|e| e.entity == data("ana"))
        .expect("ana missing from the Person listing");
    assert_eq!(ana.labels.len(), 1);
    assert_eq!(ana.labels[0].label_value, "Ana");

    let bob = page
        .entities_with_labels
        .iter()
        .find(|e| e.entity == data("bob"))
        .unwrap();
    assert_eq!(bob.labels.len(), 2);
    assert_eq!(page.entities_with_labels.len(), 4);
}

#[tokio::test]
async fn test_prefix_filter_matches_label_in_requested_language() {
    let orch = local_orchestrator();

    let english = orch
        .fetch_entities_of_class(&onto("Person"), 0, 10, "en", "ana")
        .await
        .unwrap();
    assert_eq!(english.entities_with_labels.len(), 1);
    assert_eq!(english.entities_with_labels[0].entity, data("ana"));

    // "Anne" is a prefLabel in French; the prefix runs on rdfs:label only
    let french = orch
        .fetch_entities_of_class(&onto("Person"), 0, 10, "fr", "ann")
        .await
        .unwrap();
    assert!(french.entities_with_labels.is_empty());
}

#[tokio::test]
async fn test_batch_without_force_has_no_properties() {
    let orch = local_orchestrator();

    let result = orch
        .fetch_entities_by_ids(&ids(&["cervantes", "lope"]), "en", false)
        .await
        .unwrap();
    assert_eq!(result.len(), 2);
    for description in &result {
        assert!(!description.has_properties(), "{} was expanded", description.uri);
        assert!(!description.labels.is_empty());
    }
    assert_eq!(find(&result, "lope").class_id, onto("Writer"));
}

#[tokio::test]
async fn test_batch_with_force_is_expanded() {
    let orch = local_orchestrator();

    let result = orch
        .fetch_entities_by_ids(&ids(&["cervantes", "lope"]), "en", true)
        .await
        .unwrap();
    let lope = find(&result, "lope");
    assert_eq!(lope.object_properties.len(), 1);
    assert_eq!(lope.object_properties[0].object, data("madrid"));
    assert_eq!(lope.object_properties[0].object_labels[0].label_value, "Madrid");
}

#[tokio::test]
async fn test_unknown_entity_gets_root_class_and_empty_lists() {
    let orch = local_orchestrator();

    let result = orch
        .fetch_entities_by_ids(&ids(&["nobody"]), "en", false)
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].class_id, onto("ThingsDomain"));
    assert!(result[0].labels.is_empty());
    assert!(!result[0].has_properties());
}

#[tokio::test]
async fn test_empty_id_list_sends_nothing() {
    let endpoint = Arc::new(CountingEndpoint::new(local_store()));
    let orch = orchestrator(endpoint.clone(), Arc::new(NoopCache));

    let result = orch.fetch_entities_by_ids(&[], "en", false).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_querying() {
    let endpoint = Arc::new(CountingEndpoint::new(local_store()));
    let orch = orchestrator(endpoint.clone(), Arc::new(NoopCache));

    let bad_id = orch
        .fetch_entities_by_ids(&["http://example.org/a> } DROP ALL {".to_string()], "en", false)
        .await;
    assert!(matches!(bad_id, Err(GrontopiError::InvalidIri(_))));

    let bad_lang = orch
        .fetch_entities_of_class(&onto("City"), 0, 10, "en'); DROP", "")
        .await;
    assert!(matches!(bad_lang, Err(GrontopiError::InvalidLanguage(_))));

    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn test_entities_of_class_page() {
    let orch = local_orchestrator();

    let page = orch
        .fetch_entities_of_class(&onto("City"), 0, 10, "en", "")
        .await
        .unwrap();
    let mut entities: Vec<&str> = page
        .entities_with_labels
        .iter()
        .map(|e| e.entity.as_str())
        .collect();
    entities.sort();
    let alcala = data("alcala");
    let madrid = data("madrid");
    assert_eq!(entities, vec![alcala.as_str(), madrid.as_str()]);

    let alcala_entry = page
        .entities_with_labels
        .iter()
        .find(|e| e.entity == alcala)
        .unwrap();
    assert_eq!(alcala_entry.class_id, onto("City"));
    assert_eq!(alcala_entry.longname, "alcalá de henares alcala de henares ");
}

#[tokio::test]
async fn test_entities_of_class_prefix_filter() {
    let orch = local_orchestrator();

    let filtered = orch
        .fetch_entities_of_class(&onto("Writer"), 0, 10, "en", "MIG")
        .await
        .unwrap();
    assert_eq!(filtered.entities_with_labels.len(), 1);
    assert_eq!(filtered.entities_with_labels[0].entity, data("cervantes"));

    // Two characters is below the threshold: no filtering at all
    let unfiltered = orch
        .fetch_entities_of_class(&onto("Writer"), 0, 10, "en", "mi")
        .await
        .unwrap();
    assert_eq!(unfiltered.entities_with_labels.len(), 2);
}

#[tokio::test]
async fn test_check_existence() {
    let orch = local_orchestrator();

    let missing = orch
        .check_existence(&ids(&["nobody", "cervantes", "lonely", "ghost"]))
        .await
        .unwrap();
    assert_eq!(missing, ids(&["nobody", "ghost"]));
}

#[tokio::test]
async fn test_neighbourhood_of_writer() {
    let orch = local_orchestrator();

    let summary = orch.fetch_neighbourhood(&data("cervantes"), "en").await.unwrap();

    assert_eq!(summary.linked_entities.len(), 2);
    assert!(summary
        .linked_entities
        .iter()
        .all(|n| n.central_entity_role == CentralRole::Subject));
    assert_eq!(summary.link_count[&onto("City")][&onto("bornIn")], 1);
    assert_eq!(summary.link_count[&onto("Work")][&onto("wrote")], 1);

    let quijote = summary
        .linked_entities
        .iter()
        .find(|n| n.entity == data("quijote"))
        .unwrap();
    assert_eq!(quijote.labels[0].label_value, "Don Quixote");
}

#[tokio::test]
async fn test_neighbourhood_of_place_sees_incoming_links() {
    let orch = local_orchestrator();

    let summary = orch.fetch_neighbourhood(&data("alcala"), "en").await.unwrap();

    assert_eq!(summary.linked_entities.len(), 1);
    let neighbour = &summary.linked_entities[0];
    assert_eq!(neighbour.entity, data("cervantes"));
    assert_eq!(neighbour.entity_class, onto("Writer"));
    assert_eq!(neighbour.link_type, onto("bornIn"));
    assert_eq!(neighbour.central_entity_role, CentralRole::Object);
}

#[tokio::test]
async fn test_cache_serves_repeated_requests() {
    let endpoint = Arc::new(CountingEndpoint::new(local_store()));
    let cache = Arc::new(MemoryResultCache::new(100, Duration::from_secs(60)));
    let orch = orchestrator(endpoint.clone(), cache);

    let first = orch
        .fetch_entities_by_ids(&ids(&["cervantes"]), "en", false)
        .await
        .unwrap();
    let calls_after_first = endpoint.calls();
    assert!(calls_after_first > 0);

    let second = orch
        .fetch_entities_by_ids(&ids(&["cervantes"]), "en", false)
        .await
        .unwrap();
    assert_eq!(endpoint.calls(), calls_after_first);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_transport_follows_query_length() {
    let endpoint = Arc::new(CountingEndpoint::new(local_store()));
    let orch = orchestrator(endpoint.clone(), Arc::new(NoopCache));

    orch.fetch_entities_by_ids(&ids(&["lonely"]), "en", false)
        .await
        .unwrap();

    let queries = endpoint.queries();
    let transports = endpoint.transports();
    assert_eq!(queries.len(), 3);
    for (query, transport) in queries.iter().zip(transports) {
        let expected = if query.len() > 1000 {
            Transport::Post
        } else {
            Transport::Get
        };
        assert_eq!(transport, expected);
    }
}

#[tokio::test]
async fn test_upstream_failure_is_distinct_from_empty() {
    let orch = orchestrator(Arc::new(FailingEndpoint), Arc::new(NoopCache));

    let err = orch
        .fetch_entities_by_ids(&ids(&["cervantes"]), "en", false)
        .await
        .unwrap_err();
    assert!(err.is_upstream());

    let err = orch.check_existence(&ids(&["cervantes"])).await.unwrap_err();
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_app_context_with_local_endpoint() {
    let app = AppContext::bootstrap(config())
        .unwrap()
        .with_endpoint(Arc::new(local_store()))
        .without_cache();
    assert_eq!(app.ontology.classes().len(), model().classes().len());

    let missing = app
        .orchestrator()
        .check_existence(&ids(&["madrid", "atlantis"]))
        .await
        .unwrap();
    assert_eq!(missing, ids(&["atlantis"]));
}
