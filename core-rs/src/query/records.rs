//! Records produced by the orchestrator
//!
//! Built per request and discarded afterwards. They carry copied IRIs and
//! labels only, never references into the ontology model.

use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelWithLang {
    pub label_predicate: String,
    pub label_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_lang: Option<String>,
}

/// Data property: predicate plus literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateLiteralTuple {
    pub predicate: String,
    pub literal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

/// Object or inverse property: predicate plus the linked entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateObjectTuple {
    pub predicate: String,
    pub object: String,
    #[serde(default)]
    pub object_labels: Vec<LabelWithLang>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescription {
    pub uri: String,
    pub labels: Vec<LabelWithLang>,
    /// Maximal class
    pub class_id: String,
    pub longname: String,
    pub data_properties: Vec<PredicateLiteralTuple>,
    /// Outgoing links (this entity is the subject)
    pub object_properties: Vec<PredicateObjectTuple>,
    /// Incoming links (this entity is the object)
    pub inverse_properties: Vec<PredicateObjectTuple>,
}

impl EntityDescription {
    pub fn new(uri: String, labels: Vec<LabelWithLang>, class_id: String) -> Self {
        Self {
            longname: compute_long_name(&labels),
            uri,
            labels,
            class_id,
            data_properties: Vec::new(),
            object_properties: Vec::new(),
            inverse_properties: Vec::new(),
        }
    }

    /// False for an entity the endpoint knows nothing about; the caller
    /// decides whether that means "not found".
    pub fn has_properties(&self) -> bool {
        !self.data_properties.is_empty()
            || !self.object_properties.is_empty()
            || !self.inverse_properties.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityWithLabel {
    pub entity: String,
    pub labels: Vec<LabelWithLang>,
    pub longname: String,
    pub class_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityListWithLabels {
    pub entities_with_labels: Vec<EntityWithLabel>,
}

/// Role the central entity plays in a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralRole {
    Subject,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourDescriptor {
    pub link_type: String,
    pub entity: String,
    pub entity_class: String,
    pub labels: Vec<LabelWithLang>,
    pub central_entity_role: CentralRole,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodSummary {
    pub linked_entities: Vec<NeighbourDescriptor>,
    /// neighbour class -> link predicate -> number of links
    pub link_count: BTreeMap<String, BTreeMap<String, usize>>,
}

impl NeighbourhoodSummary {
    pub fn record(&mut self, neighbour: NeighbourDescriptor) {
        *self
            .link_count
            .entry(neighbour.entity_class.clone())
            .or_default()
            .entry(neighbour.link_type.clone())
            .or_default() += 1;
        self.linked_entities.push(neighbour);
    }
}

/// Lowercased labels followed by their ASCII transliteration, for fuzzy
/// matching on the client side
pub fn compute_long_name(labels: &[LabelWithLang]) -> String {
    let mut longname = String::new();
    for label in labels {
        let lower = label.label_value.to_lowercase();
        longname.push_str(&lower);
        longname.push(' ');
        longname.push_str(&deunicode(&lower));
        longname.push(' ');
    }
    longname
}
