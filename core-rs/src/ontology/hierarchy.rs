//! Generic labelled-hierarchy traversal
//!
//! One walk serves classes (children via rdfs:subClassOf), relations and
//! properties (no children) and catalogs (children via skos:broader). Nodes
//! without any label are structural helpers (blank union nodes, unnamed
//! restrictions) and are dropped from the result.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::ontology::graph::{Node, SchemaGraph};
use crate::ontology::types::Label;
use crate::ontology::vocab;

/// Label kinds tried, in order, when no preferred predicate yields a value
const LABEL_KIND_ORDER: &[&str] = &["prefLabel", "label", "altLabel"];

/// Parameters for [`elements_with_hierarchy`]
#[derive(Debug, Clone)]
pub struct TraversalSpec<'a> {
    /// Top of the tree (not returned). `None` walks every member instance.
    pub root: Option<&'a str>,
    /// Only instances of this class are returned
    pub member_class: &'a str,
    /// `(child, relation, parent)` predicate defining children
    pub child_relation: Option<&'a str>,
    /// `(kind, predicate)` pairs, e.g. `("prefLabel", skos:prefLabel)`
    pub label_predicates: &'a [(&'a str, &'a str)],
    /// Predicates whose IRI objects (union lists expanded) are collected
    pub forward_predicates: &'a [&'a str],
    /// Label predicates consulted first for the default label
    pub preferred_labels: &'a [String],
    /// Children are expanded only below this many hops from the root
    pub max_level: usize,
}

impl<'a> TraversalSpec<'a> {
    pub fn members(member_class: &'a str, label_predicates: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            root: None,
            member_class,
            child_relation: None,
            label_predicates,
            forward_predicates: &[],
            preferred_labels: &[],
            max_level: usize::MAX,
        }
    }
}

/// One node reached by the traversal
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyElement {
    pub iri: String,
    /// Labels grouped by kind, in the order the kinds were requested
    pub labels: Vec<(String, Vec<Label>)>,
    pub default_label: String,
    pub children: BTreeSet<String>,
    /// Predicate IRI -> collected object IRIs
    pub forward: BTreeMap<String, BTreeSet<String>>,
    pub level: usize,
}

impl HierarchyElement {
    pub fn all_labels(&self) -> Vec<Label> {
        self.labels
            .iter()
            .flat_map(|(_, labels)| labels.iter().cloned())
            .collect()
    }

    pub fn labels_of(&self, kind: &str) -> Vec<Label> {
        self.labels
            .iter()
            .filter(|(k, _)| k == kind)
            .flat_map(|(_, labels)| labels.iter().cloned())
            .collect()
    }

    pub fn forward_of(&self, predicate: &str) -> BTreeSet<String> {
        self.forward.get(predicate).cloned().unwrap_or_default()
    }
}

/// Literal values of `node` under each `(kind, predicate)` pair
pub fn node_labels(
    graph: &SchemaGraph,
    node: &Node,
    label_predicates: &[(&str, &str)],
) -> Vec<(String, Vec<Label>)> {
    label_predicates
        .iter()
        .map(|(kind, predicate)| {
            let labels = graph
                .objects(node, predicate)
                .filter_map(|object| match object {
                    Node::Literal { value, language, .. } => clean_label(value).map(|value| Label {
                        value,
                        language: language.clone(),
                    }),
                    _ => None,
                })
                .collect();
            (kind.to_string(), labels)
        })
        .collect()
}

/// Label text without quotes and with whitespace collapsed. Blank labels
/// count as missing.
pub fn clean_label(raw: &str) -> Option<String> {
    let cleaned = raw
        .replace('"', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Pick the default label: preferred predicates first, then the fixed
/// kind order, then whatever label exists.
pub fn default_label(
    labels: &[(String, Vec<Label>)],
    label_predicates: &[(&str, &str)],
    preferred: &[String],
) -> String {
    let first_of_kind = |kind: &str| {
        labels
            .iter()
            .filter(|(k, _)| k == kind)
            .flat_map(|(_, values)| values.first())
            .next()
    };

    for predicate in preferred {
        if let Some((kind, _)) = label_predicates.iter().find(|(_, p)| p == predicate) {
            if let Some(label) = first_of_kind(*kind) {
                return label.value.clone();
            }
        }
    }

    for kind in LABEL_KIND_ORDER {
        if let Some(label) = first_of_kind(*kind) {
            return label.value.clone();
        }
    }

    labels
        .iter()
        .flat_map(|(_, values)| values.first())
        .next()
        .map(|label| label.value.clone())
        .unwrap_or_default()
}

/// Breadth-first walk collecting labelled members of a class hierarchy
pub fn elements_with_hierarchy(
    graph: &SchemaGraph,
    spec: &TraversalSpec<'_>,
) -> BTreeMap<String, HierarchyElement> {
    let members = graph.instances_of(spec.member_class);
    let excluded = if spec.member_class == vocab::SKOS_CONCEPT {
        Default::default()
    } else {
        graph.instances_of(vocab::SKOS_CONCEPT)
    };

    let mut queue: VecDeque<(Node, usize)> = match (spec.root, spec.child_relation) {
        (Some(root), Some(relation)) => graph
            .subjects(relation, &Node::iri(root))
            .map(|child| (child.clone(), 1))
            .collect(),
        (Some(_), None) => VecDeque::new(),
        (None, _) => members.iter().map(|m| (m.clone(), 1)).collect(),
    };

    let mut visited: HashSet<Node> = HashSet::new();
    let mut elements = BTreeMap::new();

    while let Some((node, level)) = queue.pop_front() {
        if !visited.insert(node.clone()) {
            continue;
        }
        if !members.contains(&node) || excluded.contains(&node) {
            continue;
        }

        let mut children = BTreeSet::new();
        if let Some(relation) = spec.child_relation {
            if level < spec.max_level {
                for child in graph.subjects(relation, &node) {
                    if let Some(iri) = child.as_iri() {
                        children.insert(iri.to_string());
                    }
                    queue.push_back((child.clone(), level + 1));
                }
            }
        }

        let labels = node_labels(graph, &node, spec.label_predicates);
        let label_count: usize = labels.iter().map(|(_, values)| values.len()).sum();
        if label_count == 0 {
            continue;
        }
        let Some(iri) = node.as_iri() else {
            continue;
        };

        let forward = spec
            .forward_predicates
            .iter()
            .map(|predicate| {
                let targets = graph
                    .objects(&node, predicate)
                    .filter(|object| !object.is_literal())
                    .flat_map(|object| graph.union_members(object))
                    .collect();
                (predicate.to_string(), targets)
            })
            .collect();

        let default_label = default_label(&labels, spec.label_predicates, spec.preferred_labels);
        elements.insert(
            iri.to_string(),
            HierarchyElement {
                iri: iri.to_string(),
                labels,
                default_label,
                children,
                forward,
                level,
            },
        );
    }

    elements
}
