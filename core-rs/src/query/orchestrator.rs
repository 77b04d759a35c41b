//! QueryOrchestrator: domain lookups turned into batched SPARQL
//!
//! Every query goes through [`QueryOrchestrator::run`]: normalize the text,
//! answer from the cache when possible, otherwise pick GET or POST by size,
//! call the endpoint and store the raw rows. Endpoint failures surface as
//! `GrontopiError::Upstream`; empty answers are ordinary empty results.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::ResultCache;
use crate::config::ServiceConfig;
use crate::endpoint::{Binding, GraphQueryEndpoint, QueryResponse, TermKind, Transport};
use crate::errors::Result;
use crate::ontology::OntologyModel;
use crate::query::builder::{entity_iri, language_tag, QueryContext, SparqlQuery};
use crate::query::records::{
    compute_long_name, CentralRole, EntityDescription, EntityListWithLabels, EntityWithLabel,
    LabelWithLang, NeighbourDescriptor, NeighbourhoodSummary, PredicateLiteralTuple,
    PredicateObjectTuple,
};

/// Execution knobs
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    /// Normalized queries longer than this are POSTed
    pub post_threshold: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            post_threshold: 1000,
        }
    }
}

/// Links of one entity, split by direction
#[derive(Debug, Default)]
struct EntityLinks {
    data: Vec<PredicateLiteralTuple>,
    outgoing: Vec<PredicateObjectTuple>,
    incoming: Vec<PredicateObjectTuple>,
}

impl EntityLinks {
    fn neighbours(&self) -> impl Iterator<Item = &String> {
        self.outgoing.iter().chain(self.incoming.iter()).map(|t| &t.object)
    }
}

pub struct QueryOrchestrator {
    ontology: Arc<OntologyModel>,
    endpoint: Arc<dyn GraphQueryEndpoint>,
    cache: Arc<dyn ResultCache>,
    context: QueryContext,
    settings: QuerySettings,
}

impl QueryOrchestrator {
    pub fn new(
        ontology: Arc<OntologyModel>,
        endpoint: Arc<dyn GraphQueryEndpoint>,
        cache: Arc<dyn ResultCache>,
        context: QueryContext,
        settings: QuerySettings,
    ) -> Self {
        Self {
            ontology,
            endpoint,
            cache,
            context,
            settings,
        }
    }

    pub fn from_config(
        config: &ServiceConfig,
        ontology: Arc<OntologyModel>,
        endpoint: Arc<dyn GraphQueryEndpoint>,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        Self::new(
            ontology,
            endpoint,
            cache,
            QueryContext::from_config(config),
            QuerySettings {
                post_threshold: config.post_threshold,
            },
        )
    }

    pub fn ontology(&self) -> &OntologyModel {
        &self.ontology
    }

    /// Describe a batch of entities.
    ///
    /// Class and label lookups for the batch run concurrently. Links are
    /// only expanded when `force_full` is set or a single id was given;
    /// otherwise every property list is empty.
    pub async fn fetch_entities_by_ids(
        &self,
        ids: &[String],
        lang: &str,
        force_full: bool,
    ) -> Result<Vec<EntityDescription>> {
        let lang = language_tag(lang)?;
        let ids = unique_iris(ids)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (classes, mut labels) =
            tokio::try_join!(self.classes_for(&ids), self.labels_for(&ids, lang))?;

        let expand = force_full || ids.len() == 1;
        let mut descriptions = Vec::with_capacity(ids.len());
        let mut neighbours: Vec<String> = Vec::new();
        let mut seen_neighbours: HashSet<String> = HashSet::new();

        for id in &ids {
            let class_id = match classes.get(id) {
                Some(candidates) => self.ontology.maximal_class(candidates),
                None => self.ontology.study_domain_root().to_string(),
            };
            let entity_labels = labels.remove(id).unwrap_or_default();
            let mut description = EntityDescription::new(id.clone(), entity_labels, class_id);

            if expand {
                let links = self.links_of(id, lang).await?;
                for neighbour in links.neighbours() {
                    if seen_neighbours.insert(neighbour.clone()) {
                        neighbours.push(neighbour.clone());
                    }
                }
                description.data_properties = links.data;
                description.object_properties = links.outgoing;
                description.inverse_properties = links.incoming;
            }
            descriptions.push(description);
        }

        if !neighbours.is_empty() {
            let neighbour_labels = self.labels_for(&neighbours, lang).await?;
            for description in &mut descriptions {
                for tuple in description
                    .object_properties
                    .iter_mut()
                    .chain(description.inverse_properties.iter_mut())
                {
                    tuple.object_labels = neighbour_labels
                        .get(&tuple.object)
                        .cloned()
                        .unwrap_or_default();
                }
            }
        }

        Ok(descriptions)
    }

    /// One page of instances of `class_id`. A `prefix` shorter than three
    /// characters is ignored.
    pub async fn fetch_entities_of_class(
        &self,
        class_id: &str,
        start: usize,
        count: usize,
        lang: &str,
        prefix: &str,
    ) -> Result<EntityListWithLabels> {
        let lang = language_tag(lang)?;
        let class_iri = entity_iri(class_id)?;

        let query = SparqlQuery::entities_of_class(&self.context, &class_iri, start, count, lang, prefix);
        let response = self.run(&query).await?;

        let mut order: Vec<String> = Vec::new();
        let mut labels = self.collect_labels(&response);
        for row in response.bindings() {
            if let Some(entity) = uri_value(row, "s") {
                if !order.iter().any(|e| e == entity) {
                    order.push(entity.to_string());
                }
            }
        }

        let entities_with_labels = order
            .into_iter()
            .map(|entity| {
                let entity_labels = labels.remove(&entity).unwrap_or_default();
                EntityWithLabel {
                    longname: compute_long_name(&entity_labels),
                    entity,
                    labels: entity_labels,
                    class_id: class_iri.clone(),
                }
            })
            .collect();

        Ok(EntityListWithLabels {
            entities_with_labels,
        })
    }

    /// Ids with no study-domain class on the endpoint, in input order
    pub async fn check_existence(&self, ids: &[String]) -> Result<Vec<String>> {
        let ids = unique_iris(ids)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.classes_for(&ids).await?;
        Ok(ids.into_iter().filter(|id| !found.contains_key(id)).collect())
    }

    /// Neighbours of one entity with their classes and a per-class,
    /// per-predicate link count
    pub async fn fetch_neighbourhood(&self, entity_id: &str, lang: &str) -> Result<NeighbourhoodSummary> {
        let lang = language_tag(lang)?;
        let id = entity_iri(entity_id)?;

        let links = self.links_of(&id, lang).await?;
        let mut neighbours: Vec<String> = Vec::new();
        for neighbour in links.neighbours() {
            if !neighbours.contains(neighbour) {
                neighbours.push(neighbour.clone());
            }
        }

        let descriptions: HashMap<String, EntityDescription> = self
            .fetch_entities_by_ids(&neighbours, lang, true)
            .await?
            .into_iter()
            .map(|d| (d.uri.clone(), d))
            .collect();

        let mut summary = NeighbourhoodSummary::default();
        let directed = links
            .outgoing
            .iter()
            .map(|t| (t, CentralRole::Subject))
            .chain(links.incoming.iter().map(|t| (t, CentralRole::Object)));

        for (tuple, role) in directed {
            let (entity_class, labels) = match descriptions.get(&tuple.object) {
                Some(d) => (d.class_id.clone(), d.labels.clone()),
                None => (self.ontology.study_domain_root().to_string(), Vec::new()),
            };
            summary.record(NeighbourDescriptor {
                link_type: tuple.predicate.clone(),
                entity: tuple.object.clone(),
                entity_class,
                labels,
                central_entity_role: role,
            });
        }

        debug!(
            entity = %id,
            neighbours = summary.linked_entities.len(),
            "neighbourhood assembled"
        );
        Ok(summary)
    }

    /// entity -> asserted study-domain classes
    async fn classes_for(&self, ids: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let allowed = self.ontology.study_domain_classes();
        let query = SparqlQuery::entity_classes(&self.context, ids, allowed.keys());
        let response = self.run(&query).await?;

        let mut classes: HashMap<String, Vec<String>> = HashMap::new();
        for row in response.bindings() {
            match (uri_value(row, "s"), uri_value(row, "cls")) {
                (Some(entity), Some(class)) => {
                    let entry = classes.entry(entity.to_string()).or_default();
                    if !entry.iter().any(|c| c == class) {
                        entry.push(class.to_string());
                    }
                }
                _ => warn!(?row, "skipping class row without ?s/?cls"),
            }
        }
        Ok(classes)
    }

    async fn labels_for(&self, ids: &[String], lang: &str) -> Result<HashMap<String, Vec<LabelWithLang>>> {
        let query = SparqlQuery::entity_labels(&self.context, ids, lang);
        let response = self.run(&query).await?;
        Ok(self.collect_labels(&response))
    }

    /// Gather `?labvar_i` values per `?s`, without duplicates
    fn collect_labels(&self, response: &QueryResponse) -> HashMap<String, Vec<LabelWithLang>> {
        let variables = self.context.label_variables();
        let mut labels: HashMap<String, Vec<LabelWithLang>> = HashMap::new();

        for row in response.bindings() {
            let Some(entity) = uri_value(row, "s") else {
                warn!(?row, "skipping label row without ?s");
                continue;
            };
            let entry = labels.entry(entity.to_string()).or_default();
            for (variable, predicate) in &variables {
                let Some(term) = row.get(variable) else {
                    continue;
                };
                if !term.is_literal() {
                    continue;
                }
                let label = LabelWithLang {
                    label_predicate: predicate.clone(),
                    label_value: term.value.clone(),
                    label_lang: term.lang.clone(),
                };
                if !entry.contains(&label) {
                    entry.push(label);
                }
            }
        }
        labels
    }

    async fn links_of(&self, id: &str, lang: &str) -> Result<EntityLinks> {
        let predicates = self.ontology.allowed_predicates();
        let allowed = self.ontology.study_domain_classes();
        let query = SparqlQuery::entity_links(&self.context, id, predicates.iter(), allowed.keys());
        let response = self.run(&query).await?;

        let mut links = EntityLinks::default();
        for row in response.bindings() {
            let (Some(subject), Some(predicate), Some(object)) =
                (row.get("s"), uri_value(row, "p"), row.get("o"))
            else {
                warn!(?row, "skipping link row without ?s/?p/?o");
                continue;
            };

            match object.kind {
                TermKind::Uri if subject.is_uri() => {
                    if subject.value == id {
                        links.outgoing.push(PredicateObjectTuple {
                            predicate: predicate.to_string(),
                            object: object.value.clone(),
                            object_labels: Vec::new(),
                        });
                    } else {
                        links.incoming.push(PredicateObjectTuple {
                            predicate: predicate.to_string(),
                            object: subject.value.clone(),
                            object_labels: Vec::new(),
                        });
                    }
                }
                TermKind::Literal | TermKind::TypedLiteral => {
                    if object.lang.as_deref().is_some_and(|l| l != lang) {
                        continue;
                    }
                    links.data.push(PredicateLiteralTuple {
                        predicate: predicate.to_string(),
                        literal: object.value.trim().to_string(),
                        language: object.lang.clone(),
                        datatype: object.datatype.clone(),
                    });
                }
                _ => debug!(?row, "ignoring blank or unknown link term"),
            }
        }
        Ok(links)
    }

    /// Execute through the cache
    async fn run(&self, query: &SparqlQuery) -> Result<QueryResponse> {
        let key = query.normalized();
        if let Some(hit) = self.cache.get(&key).await {
            debug!(bytes = key.len(), "cache hit");
            return Ok(hit);
        }

        let transport = Transport::for_length(key.len(), self.settings.post_threshold);
        debug!(bytes = key.len(), %transport, endpoint = %self.endpoint.describe(), "cache miss");
        let response = self.endpoint.query(&key, transport).await?;
        self.cache.set(&key, response.clone()).await;
        Ok(response)
    }
}

fn uri_value<'a>(row: &'a Binding, variable: &str) -> Option<&'a str> {
    row.get(variable)
        .filter(|term| term.is_uri())
        .map(|term| term.value.as_str())
}

/// Validate ids and drop repeats, keeping first occurrences in order
fn unique_iris(ids: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        let iri = entity_iri(id)?;
        if seen.insert(iri.clone()) {
            unique.push(iri);
        }
    }
    Ok(unique)
}
