/// Example: Describe an entity from the bundled test fixtures
///
/// Loads the fixture schema and answers queries from the fixture data file
/// with the in-memory store, so no SPARQL endpoint is needed.
///
/// Usage:
///   cargo run --example describe_entity
///   cargo run --example describe_entity http://example.org/data/quijote es

use grontopi_core::cache::NoopCache;
use grontopi_core::{AppContext, LocalStoreEndpoint, OntologyModel, ServiceConfig};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("core-rs/tests/fixtures")
        .join(name)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let entity = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "http://example.org/data/cervantes".to_string());
    let lang = args.get(2).cloned().unwrap_or_else(|| "en".to_string());

    let config = ServiceConfig {
        ontology_namespace: "http://example.org/onto/".to_string(),
        ontology_path: fixture("ontology.ttl"),
        ..ServiceConfig::default()
    };
    let ontology = OntologyModel::load(&config.ontology_path, &config)?;
    let store = LocalStoreEndpoint::load_file(fixture("data.ttl"))?;

    let app = AppContext::with_components(
        config,
        Arc::new(ontology),
        Arc::new(store),
        Arc::new(NoopCache),
    );
    let orchestrator = app.orchestrator();

    let descriptions = orchestrator
        .fetch_entities_by_ids(&[entity.clone()], &lang, true)
        .await?;
    for description in &descriptions {
        println!("{} ({})", description.uri, description.class_id);
        if let Some(shoulder) = app.ontology.shoulder(&description.class_id) {
            println!("  group: {}", shoulder);
        }
        for label in &description.labels {
            println!("  label: {}", label.label_value);
        }
        for literal in &description.data_properties {
            println!("  {} = {}", literal.predicate, literal.literal);
        }
        for link in &description.object_properties {
            println!("  {} -> {}", link.predicate, link.object);
        }
        for link in &description.inverse_properties {
            println!("  {} <- {}", link.predicate, link.object);
        }
    }

    let neighbourhood = orchestrator.fetch_neighbourhood(&entity, &lang).await?;
    println!("\nlink counts:");
    for (class, counts) in &neighbourhood.link_count {
        for (predicate, count) in counts {
            println!("  {} via {}: {}", class, predicate, count);
        }
    }
    Ok(())
}
