//! OntologyModel: the schema graph plus everything derived from it at load
//!
//! Load order matters. Domain/range facts are materialized as
//! `(class, isDomainOf, relation)` triples first, then pushed down the
//! subclass hierarchy, and only then are the views built. After load the
//! model is immutable; every lookup is infallible and answers with a
//! default (the study-domain root, an empty set) on unknown input.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::errors::Result;
use crate::ontology::graph::{Node, SchemaGraph};
use crate::ontology::hierarchy::{
    self, elements_with_hierarchy, node_labels, HierarchyElement, TraversalSpec,
};
use crate::ontology::types::{
    descendants, CatalogNode, CatalogTree, ClassNode, RangeKind, RelationNode, SchemaDump,
};
use crate::ontology::vocab;

const CLASS_LABELS: &[(&str, &str)] = &[("label", vocab::RDFS_LABEL)];
const CATALOG_LABELS: &[(&str, &str)] = &[
    ("prefLabel", vocab::SKOS_PREF_LABEL),
    ("altLabel", vocab::SKOS_ALT_LABEL),
];
const CATALOG_DEPTH: usize = 2;

/// IRIs the model needs from the service configuration
#[derive(Debug, Clone)]
struct SchemaTerms {
    study_domain: String,
    base_classes: Vec<String>,
    domain_of: String,
    range_of: String,
    catalog_class: String,
    label_predicates: Vec<String>,
}

impl SchemaTerms {
    fn from_config(config: &ServiceConfig) -> Self {
        Self {
            study_domain: config.study_domain_iri(),
            base_classes: config.base_class_iris(),
            domain_of: config.domain_of_iri(),
            range_of: config.range_of_iri(),
            catalog_class: config.catalog_class_iri(),
            label_predicates: config.label_predicate_iris(),
        }
    }

    fn is_base(&self, iri: &str) -> bool {
        self.base_classes.iter().any(|b| b == iri)
    }
}

#[derive(Debug, Clone)]
pub struct OntologyModel {
    graph: SchemaGraph,
    terms: SchemaTerms,
    classes: BTreeMap<String, ClassNode>,
    study_domain_classes: BTreeMap<String, ClassNode>,
    relations: BTreeMap<String, RelationNode>,
    properties: BTreeMap<String, RelationNode>,
    catalogs: BTreeMap<String, CatalogTree>,
    /// class -> every transitive ancestor
    superclasses: HashMap<String, BTreeSet<String>>,
    levels: HashMap<String, u8>,
    shoulders: HashMap<String, String>,
}

impl OntologyModel {
    /// Load the schema file named by `path`
    pub fn load<P: AsRef<Path>>(path: P, config: &ServiceConfig) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading ontology");
        let graph = SchemaGraph::load_file(path)?;
        Ok(Self::from_graph(graph, config))
    }

    pub fn from_turtle(content: &str, config: &ServiceConfig) -> Result<Self> {
        let graph = SchemaGraph::from_turtle(content)?;
        Ok(Self::from_graph(graph, config))
    }

    /// Materialize derived facts over an already parsed graph
    pub fn from_graph(graph: SchemaGraph, config: &ServiceConfig) -> Self {
        let raw_triples = graph.len();
        let mut model = Self {
            graph,
            terms: SchemaTerms::from_config(config),
            classes: BTreeMap::new(),
            study_domain_classes: BTreeMap::new(),
            relations: BTreeMap::new(),
            properties: BTreeMap::new(),
            catalogs: BTreeMap::new(),
            superclasses: HashMap::new(),
            levels: HashMap::new(),
            shoulders: HashMap::new(),
        };

        model.add_builtin_labels();
        model.materialize_domain_range_of();
        model.materialize_subclass_closure();

        model.compute_levels_and_shoulders();
        model.classes = model.build_classes();
        model.relations = model.build_relations(&[vocab::OWL_OBJECT_PROPERTY]);
        model.properties = model.build_properties();
        model.study_domain_classes = model.build_study_domain_classes();
        model.catalogs = model.build_catalogs(None);

        if !model.classes.contains_key(&model.terms.study_domain) {
            warn!(
                root = %model.terms.study_domain,
                "study-domain root is not a labelled class in the schema"
            );
        }

        info!(
            raw_triples,
            triples = model.graph.len(),
            classes = model.classes.len(),
            study_domain_classes = model.study_domain_classes.len(),
            relations = model.relations.len(),
            properties = model.properties.len(),
            catalogs = model.catalogs.len(),
            "ontology materialized"
        );
        model
    }

    fn add_builtin_labels(&mut self) {
        for (term, label) in vocab::BUILTIN_LABELS {
            self.graph
                .insert(Node::iri(*term), vocab::RDFS_LABEL, Node::literal(*label, None));
        }
    }

    /// Every relation or property whose domain/range is declared gets the
    /// inverse fact on each (union-expanded) class.
    fn materialize_domain_range_of(&mut self) {
        let mut facts = Vec::new();
        for relation in self.relation_like_nodes() {
            for class in self.declared(&relation, vocab::RDFS_DOMAIN) {
                facts.push((class, self.terms.domain_of.clone(), relation.clone()));
            }
            for class in self.declared(&relation, vocab::RDFS_RANGE) {
                facts.push((class, self.terms.range_of.clone(), relation.clone()));
            }
        }

        let added = self.insert_facts(facts);
        debug!(added, "materialized domain-of/range-of facts");
    }

    /// Push every class's domain-of/range-of facts to all its descendants
    /// and record the superclass index.
    fn materialize_subclass_closure(&mut self) {
        let class_nodes: Vec<Node> = self
            .graph
            .instances_of(vocab::OWL_CLASS)
            .into_iter()
            .filter(|n| n.as_iri().is_some())
            .collect();

        let mut facts = Vec::new();
        for class in &class_nodes {
            let Some(class_iri) = class.as_iri() else {
                continue;
            };
            let domain_of = self.iri_objects(class, &self.terms.domain_of);
            let range_of = self.iri_objects(class, &self.terms.range_of);

            for descendant in self.graph.subjects_transitive(vocab::RDFS_SUBCLASS_OF, class) {
                let Some(descendant_iri) = descendant.as_iri() else {
                    continue;
                };
                self.superclasses
                    .entry(descendant_iri.to_string())
                    .or_default()
                    .insert(class_iri.to_string());

                for relation in &domain_of {
                    facts.push((descendant_iri.to_string(), self.terms.domain_of.clone(), relation.clone()));
                }
                for relation in &range_of {
                    facts.push((descendant_iri.to_string(), self.terms.range_of.clone(), relation.clone()));
                }
            }
        }

        let added = self.insert_facts(facts);
        debug!(added, "materialized inherited domain/range facts");
    }

    fn insert_facts(&mut self, facts: Vec<(String, String, String)>) -> usize {
        let mut added = 0;
        for (subject, predicate, object) in facts {
            if self.graph.insert(Node::iri(subject), &predicate, Node::iri(object)) {
                added += 1;
            }
        }
        added
    }

    fn relation_like_nodes(&self) -> Vec<String> {
        let mut nodes: BTreeSet<String> = BTreeSet::new();
        for class in [vocab::RDF_PROPERTY, vocab::OWL_OBJECT_PROPERTY] {
            nodes.extend(
                self.graph
                    .instances_of(class)
                    .iter()
                    .filter_map(|n| n.as_iri().map(str::to_string)),
            );
        }
        nodes.into_iter().collect()
    }

    /// Union-expanded objects of `(iri, predicate, ?)`
    fn declared(&self, iri: &str, predicate: &str) -> BTreeSet<String> {
        self.graph
            .objects(&Node::iri(iri), predicate)
            .flat_map(|object| self.graph.union_members(object))
            .collect()
    }

    fn iri_objects(&self, node: &Node, predicate: &str) -> Vec<String> {
        self.graph
            .objects(node, predicate)
            .filter_map(|n| n.as_iri().map(str::to_string))
            .collect()
    }

    /// Levels: base classes 0, their direct subclasses 1, anything deeper 2.
    /// Shoulders come from the level-1 class and are inherited below it.
    fn compute_levels_and_shoulders(&mut self) {
        for base in &self.terms.base_classes {
            self.levels.insert(base.clone(), 0);
        }

        for base in self.terms.base_classes.clone() {
            let base_node = Node::iri(base.as_str());
            let direct: Vec<Node> = self
                .graph
                .subjects(vocab::RDFS_SUBCLASS_OF, &base_node)
                .cloned()
                .collect();

            for child in direct {
                let Some(child_iri) = child.as_iri().map(str::to_string) else {
                    continue;
                };
                if self.terms.is_base(&child_iri) {
                    continue;
                }
                self.raise_level(&child_iri, 1);
                let shoulder = shoulder_for(&child_iri);
                self.shoulders
                    .entry(child_iri.clone())
                    .or_insert_with(|| shoulder.clone());

                for descendant in self.graph.subjects_transitive(vocab::RDFS_SUBCLASS_OF, &child) {
                    let Some(descendant_iri) = descendant.as_iri() else {
                        continue;
                    };
                    if self.terms.is_base(descendant_iri) {
                        continue;
                    }
                    self.raise_level(descendant_iri, 2);
                    self.shoulders
                        .insert(descendant_iri.to_string(), shoulder.clone());
                }
            }
        }
    }

    fn raise_level(&mut self, iri: &str, level: u8) {
        let current = self.levels.entry(iri.to_string()).or_insert(level);
        if *current < level {
            *current = level;
        }
    }

    fn build_classes(&self) -> BTreeMap<String, ClassNode> {
        let forward = [self.terms.domain_of.as_str(), self.terms.range_of.as_str()];
        let spec = TraversalSpec {
            root: None,
            member_class: vocab::OWL_CLASS,
            child_relation: Some(vocab::RDFS_SUBCLASS_OF),
            label_predicates: CLASS_LABELS,
            forward_predicates: &forward,
            preferred_labels: &self.terms.label_predicates,
            max_level: usize::MAX,
        };

        elements_with_hierarchy(&self.graph, &spec)
            .into_values()
            .map(|element| {
                let node = ClassNode {
                    labels: element.all_labels(),
                    default_label: element.default_label.clone(),
                    domain_of: element.forward_of(&self.terms.domain_of),
                    range_of: element.forward_of(&self.terms.range_of),
                    level: self.levels.get(&element.iri).copied(),
                    shoulder: self.shoulder(&element.iri),
                    subclasses: element.children,
                    iri: element.iri,
                };
                (node.iri.clone(), node)
            })
            .collect()
    }

    fn build_relations(&self, member_classes: &[&str]) -> BTreeMap<String, RelationNode> {
        let forward = [vocab::RDFS_DOMAIN, vocab::RDFS_RANGE];
        let mut relations = BTreeMap::new();

        for member_class in member_classes {
            let spec = TraversalSpec {
                forward_predicates: &forward,
                preferred_labels: &self.terms.label_predicates,
                ..TraversalSpec::members(member_class, CLASS_LABELS)
            };
            for element in elements_with_hierarchy(&self.graph, &spec).into_values() {
                let relation = self.relation_node(element);
                relations.insert(relation.iri.clone(), relation);
            }
        }
        relations
    }

    /// Properties additionally pick up the materialized domain/range facts
    fn build_properties(&self) -> BTreeMap<String, RelationNode> {
        let mut properties = self.build_relations(&[vocab::RDF_PROPERTY, vocab::OWL_OBJECT_PROPERTY]);

        for (class, property) in self.graph.pairs(&self.terms.domain_of) {
            if let (Some(class), Some(property)) = (class.as_iri(), property.as_iri()) {
                if let Some(node) = properties.get_mut(property) {
                    node.domain.insert(class.to_string());
                }
            }
        }
        for (class, property) in self.graph.pairs(&self.terms.range_of) {
            if let (Some(class), Some(property)) = (class.as_iri(), property.as_iri()) {
                if let Some(node) = properties.get_mut(property) {
                    node.range.insert(class.to_string());
                }
            }
        }

        for node in properties.values_mut() {
            node.range_kind = self.range_kind(&node.range);
        }
        properties
    }

    fn relation_node(&self, element: HierarchyElement) -> RelationNode {
        let domain = element.forward_of(vocab::RDFS_DOMAIN);
        let range = element.forward_of(vocab::RDFS_RANGE);
        RelationNode {
            labels: element.all_labels(),
            default_label: element.default_label,
            range_kind: self.range_kind(&range),
            domain,
            range,
            iri: element.iri,
        }
    }

    fn range_kind(&self, range: &BTreeSet<String>) -> RangeKind {
        if range
            .iter()
            .any(|r| r == vocab::XSD_DATE_TIME || r == vocab::XSD_DATE)
        {
            return RangeKind::DatedLiteral;
        }
        if range.iter().any(|r| vocab::is_xsd(r)) {
            return RangeKind::Literal;
        }
        if range
            .iter()
            .any(|r| self.graph.has_type(&Node::iri(r.as_str()), &self.terms.catalog_class))
        {
            return RangeKind::CatalogReference;
        }
        RangeKind::ObjectReference
    }

    /// Walks rdfs:subClassOf in the raw graph rather than the labelled
    /// class records: an unlabelled intermediate class is not returned, but
    /// its labelled subclasses are.
    fn build_study_domain_classes(&self) -> BTreeMap<String, ClassNode> {
        let root = Node::iri(self.terms.study_domain.as_str());

        self.graph
            .subjects_transitive(vocab::RDFS_SUBCLASS_OF, &root)
            .into_iter()
            .filter_map(|node| node.as_iri().map(str::to_string))
            .filter(|iri| !self.terms.is_base(iri))
            .filter_map(|iri| self.classes.get(&iri).map(|node| (iri, node.clone())))
            .collect()
    }

    /// Catalog trees, optionally restricted to a single root
    pub fn build_catalogs(&self, root: Option<&str>) -> BTreeMap<String, CatalogTree> {
        let mut catalogs = BTreeMap::new();
        let roots = self.graph.instances_of(&self.terms.catalog_class);

        for root_node in roots {
            let Some(root_iri) = root_node.as_iri() else {
                continue;
            };
            if root.is_some_and(|wanted| strip_brackets(wanted) != root_iri) {
                continue;
            }

            let root_labels = node_labels(&self.graph, &root_node, CATALOG_LABELS);
            let labels: Vec<_> = root_labels
                .iter()
                .flat_map(|(_, values)| values.iter().cloned())
                .collect();
            if labels.is_empty() {
                continue;
            }

            let spec = TraversalSpec {
                root: Some(root_iri),
                member_class: vocab::SKOS_CONCEPT,
                child_relation: Some(vocab::SKOS_BROADER),
                label_predicates: CATALOG_LABELS,
                forward_predicates: &[],
                preferred_labels: &self.terms.label_predicates,
                max_level: CATALOG_DEPTH,
            };
            let items = elements_with_hierarchy(&self.graph, &spec)
                .into_values()
                .map(|element| {
                    let node = CatalogNode {
                        pref_labels: element.labels_of("prefLabel"),
                        alt_labels: element.labels_of("altLabel"),
                        default_label: element.default_label.clone(),
                        narrower: element.children,
                        level: element.level,
                        iri: element.iri,
                    };
                    (node.iri.clone(), node)
                })
                .collect();

            let default_label = hierarchy::default_label(
                &root_labels,
                CATALOG_LABELS,
                &self.terms.label_predicates,
            );
            catalogs.insert(
                root_iri.to_string(),
                CatalogTree {
                    iri: root_iri.to_string(),
                    labels,
                    default_label,
                    items,
                },
            );
        }
        catalogs
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn study_domain_root(&self) -> &str {
        &self.terms.study_domain
    }

    pub fn base_classes(&self) -> &[String] {
        &self.terms.base_classes
    }

    /// Every labelled owl:Class, base classes included
    pub fn classes(&self) -> &BTreeMap<String, ClassNode> {
        &self.classes
    }

    /// Classes below the study-domain root, base classes excluded
    pub fn study_domain_classes(&self) -> &BTreeMap<String, ClassNode> {
        &self.study_domain_classes
    }

    pub fn relations(&self) -> &BTreeMap<String, RelationNode> {
        &self.relations
    }

    pub fn properties(&self) -> &BTreeMap<String, RelationNode> {
        &self.properties
    }

    pub fn catalogs(&self) -> &BTreeMap<String, CatalogTree> {
        &self.catalogs
    }

    pub fn level(&self, class_iri: &str) -> Option<u8> {
        self.levels.get(strip_brackets(class_iri)).copied()
    }

    /// Grouping name of a class: its own if level 1, inherited below that
    pub fn shoulder(&self, class_iri: &str) -> Option<String> {
        self.shoulders.get(strip_brackets(class_iri)).cloned()
    }

    pub fn superclasses(&self, class_iri: &str) -> BTreeSet<String> {
        self.superclasses
            .get(strip_brackets(class_iri))
            .cloned()
            .unwrap_or_default()
    }

    /// Labelled classes below `class_iri`, breadth first. Unlabelled
    /// classes are not in the class records, so the walk stops at them.
    pub fn subclasses(&self, class_iri: &str) -> Vec<String> {
        descendants(&self.classes, strip_brackets(class_iri))
            .into_iter()
            .filter(|iri| self.classes.contains_key(iri))
            .collect()
    }

    /// Relations and properties allowed as link predicates
    pub fn allowed_predicates(&self) -> BTreeSet<String> {
        self.relations
            .keys()
            .chain(self.properties.keys())
            .cloned()
            .collect()
    }

    /// The most specific of `candidates`: highest level, ties broken by the
    /// lexicographically smallest IRI. Falls back to the study-domain root
    /// when no candidate has a level.
    pub fn maximal_class<S: AsRef<str>>(&self, candidates: &[S]) -> String {
        candidates
            .iter()
            .map(|c| strip_brackets(c.as_ref()))
            .filter_map(|iri| self.levels.get(iri).map(|level| (*level, iri)))
            .max_by(|(la, a), (lb, b)| la.cmp(lb).then_with(|| b.cmp(a)))
            .map(|(_, iri)| iri.to_string())
            .unwrap_or_else(|| self.terms.study_domain.clone())
    }

    pub fn schema_dump(&self, catalog: Option<&str>) -> SchemaDump {
        let catalogs = match catalog {
            Some(_) => self.build_catalogs(catalog),
            None => self.catalogs.clone(),
        };
        SchemaDump {
            catalogs,
            classes: self.study_domain_classes.clone(),
            relations: self.relations.clone(),
            properties: self.properties.clone(),
        }
    }
}

fn strip_brackets(iri: &str) -> &str {
    iri.trim().trim_start_matches('<').trim_end_matches('>')
}

/// Lowercased local name plus a plural suffix: `s` after a vowel, else `es`
pub fn shoulder_for(class_iri: &str) -> String {
    let local = vocab::local_name(class_iri).to_lowercase();
    let suffix = match local.chars().last() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "s",
        _ => "es",
    };
    format!("{}{}", local, suffix)
}
