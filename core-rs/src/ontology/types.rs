//! Typed records for the materialized schema views

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// A label value with its optional language tag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Label {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Label {
    pub fn new(value: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            value: value.into(),
            language: language.map(str::to_string),
        }
    }
}

/// How the range of a relation or property is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    /// XML Schema datatype other than a date
    Literal,
    /// xsd:dateTime or xsd:date
    DatedLiteral,
    /// Range is a catalog root
    CatalogReference,
    ObjectReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    pub iri: String,
    pub labels: Vec<Label>,
    pub default_label: String,
    /// Direct subclasses
    pub subclasses: BTreeSet<String>,
    /// Relations/properties this class (or an ancestor) is a domain of
    pub domain_of: BTreeSet<String>,
    /// Relations/properties this class (or an ancestor) is a range of
    pub range_of: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationNode {
    pub iri: String,
    pub labels: Vec<Label>,
    pub default_label: String,
    pub domain: BTreeSet<String>,
    pub range: BTreeSet<String>,
    pub range_kind: RangeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogNode {
    pub iri: String,
    pub pref_labels: Vec<Label>,
    pub alt_labels: Vec<Label>,
    pub default_label: String,
    pub narrower: BTreeSet<String>,
    /// Hops below the catalog root (1 = direct member)
    pub level: usize,
}

/// One catalog root and its bounded-depth concept tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTree {
    pub iri: String,
    pub labels: Vec<Label>,
    pub default_label: String,
    pub items: BTreeMap<String, CatalogNode>,
}

/// Introspection record covering the whole materialized schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDump {
    pub catalogs: BTreeMap<String, CatalogTree>,
    pub classes: BTreeMap<String, ClassNode>,
    pub relations: BTreeMap<String, RelationNode>,
    pub properties: BTreeMap<String, RelationNode>,
}

/// Shared traversal contract: every hierarchy node has labels and children
pub trait HierarchyNode {
    fn labels(&self) -> Vec<&Label>;
    fn children(&self) -> &BTreeSet<String>;
}

impl HierarchyNode for ClassNode {
    fn labels(&self) -> Vec<&Label> {
        self.labels.iter().collect()
    }

    fn children(&self) -> &BTreeSet<String> {
        &self.subclasses
    }
}

impl HierarchyNode for CatalogNode {
    fn labels(&self) -> Vec<&Label> {
        self.pref_labels.iter().chain(self.alt_labels.iter()).collect()
    }

    fn children(&self) -> &BTreeSet<String> {
        &self.narrower
    }
}

/// Breadth-first walk over `children`, starting below `root`. Children
/// missing from `nodes` are still reported but not expanded.
pub fn descendants<N: HierarchyNode>(nodes: &BTreeMap<String, N>, root: &str) -> Vec<String> {
    let mut reached = Vec::new();
    let mut visited: HashSet<&str> = HashSet::from([root]);
    let mut queue: VecDeque<&str> = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        let Some(node) = nodes.get(current) else {
            continue;
        };
        for child in node.children() {
            if visited.insert(child.as_str()) {
                reached.push(child.clone());
                queue.push_back(child.as_str());
            }
        }
    }
    reached
}
