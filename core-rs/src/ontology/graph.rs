//! In-memory schema triple index
//!
//! The schema document is parsed once with oxigraph and copied into two
//! adjacency maps (by subject and by object) so the materialization passes
//! can walk the graph in both directions without SPARQL.

use oxigraph::io::RdfFormat;
use oxigraph::model::{Subject, Term};
use oxigraph::store::Store;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::errors::{GrontopiError, Result};
use crate::ontology::vocab;

/// A node of the schema graph
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri(iri.into())
    }

    /// Plain literal, optionally language tagged
    pub fn literal(value: impl Into<String>, language: Option<&str>) -> Self {
        Node::Literal {
            value: value.into(),
            language: language.map(str::to_string),
            datatype: None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal { .. })
    }

    fn from_subject(subject: &Subject) -> Option<Self> {
        match subject {
            Subject::NamedNode(n) => Some(Node::Iri(n.as_str().to_string())),
            Subject::BlankNode(b) => Some(Node::Blank(b.as_str().to_string())),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::NamedNode(n) => Some(Node::Iri(n.as_str().to_string())),
            Term::BlankNode(b) => Some(Node::Blank(b.as_str().to_string())),
            Term::Literal(l) => {
                let datatype = l.datatype().as_str();
                let datatype = if l.language().is_some() || datatype == vocab::XSD_STRING {
                    None
                } else {
                    Some(datatype.to_string())
                };
                Some(Node::Literal {
                    value: l.value().to_string(),
                    language: l.language().map(str::to_string),
                    datatype,
                })
            }
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(iri) => write!(f, "<{}>", iri),
            Node::Blank(id) => write!(f, "_:{}", id),
            Node::Literal {
                value,
                language: Some(lang),
                ..
            } => write!(f, "\"{}\"@{}", value, lang),
            Node::Literal {
                value,
                datatype: Some(dt),
                ..
            } => write!(f, "\"{}\"^^<{}>", value, dt),
            Node::Literal { value, .. } => write!(f, "\"{}\"", value),
        }
    }
}

type Adjacency = HashMap<Node, BTreeMap<String, BTreeSet<Node>>>;

/// Triple index over the schema document
#[derive(Debug, Default, Clone)]
pub struct SchemaGraph {
    by_subject: Adjacency,
    by_object: Adjacency,
    len: usize,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a Turtle document
    pub fn from_turtle(content: &str) -> Result<Self> {
        let store = Store::new().map_err(|e| GrontopiError::SchemaParse(e.to_string()))?;
        store
            .load_from_reader(RdfFormat::Turtle, content.as_bytes())
            .map_err(|e| GrontopiError::SchemaParse(e.to_string()))?;

        let mut graph = Self::new();
        for quad in store.iter() {
            let quad = quad.map_err(|e| GrontopiError::SchemaParse(e.to_string()))?;
            let (Some(subject), Some(object)) =
                (Node::from_subject(&quad.subject), Node::from_term(&quad.object))
            else {
                continue;
            };
            graph.insert(subject, quad.predicate.as_str(), object);
        }

        debug!(triples = graph.len(), "parsed schema graph");
        Ok(graph)
    }

    /// Read and parse a Turtle file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(GrontopiError::SchemaNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_turtle(&content).map_err(|e| match e {
            GrontopiError::SchemaParse(msg) => {
                GrontopiError::SchemaParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Add a triple; returns false when it was already present
    pub fn insert(&mut self, subject: Node, predicate: &str, object: Node) -> bool {
        let added = self
            .by_subject
            .entry(subject.clone())
            .or_default()
            .entry(predicate.to_string())
            .or_default()
            .insert(object.clone());
        if added {
            self.by_object
                .entry(object)
                .or_default()
                .entry(predicate.to_string())
                .or_default()
                .insert(subject);
            self.len += 1;
        }
        added
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, subject: &Node, predicate: &str, object: &Node) -> bool {
        self.by_subject
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .map(|objects| objects.contains(object))
            .unwrap_or(false)
    }

    /// Objects of `(subject, predicate, ?)`
    pub fn objects<'a>(&'a self, subject: &Node, predicate: &str) -> impl Iterator<Item = &'a Node> {
        self.by_subject
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .into_iter()
            .flatten()
    }

    /// Subjects of `(?, predicate, object)`
    pub fn subjects<'a>(&'a self, predicate: &str, object: &Node) -> impl Iterator<Item = &'a Node> {
        self.by_object
            .get(object)
            .and_then(|preds| preds.get(predicate))
            .into_iter()
            .flatten()
    }

    /// All `(subject, object)` pairs for a predicate
    pub fn pairs<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = (&'a Node, &'a Node)> {
        self.by_subject.iter().flat_map(move |(subject, preds)| {
            preds
                .get(predicate)
                .into_iter()
                .flatten()
                .map(move |object| (subject, object))
        })
    }

    /// Nodes typed with `class_iri` through rdf:type
    pub fn instances_of(&self, class_iri: &str) -> BTreeSet<Node> {
        self.subjects(vocab::RDF_TYPE, &Node::iri(class_iri))
            .cloned()
            .collect()
    }

    pub fn has_type(&self, node: &Node, class_iri: &str) -> bool {
        self.contains(node, vocab::RDF_TYPE, &Node::iri(class_iri))
    }

    /// Members of an RDF collection (rdf:first / rdf:rest chain)
    pub fn list_members(&self, head: &Node) -> Vec<Node> {
        let mut members = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![head.clone()];

        while let Some(cell) = pending.pop() {
            if cell == Node::iri(vocab::RDF_NIL) || !visited.insert(cell.clone()) {
                continue;
            }
            members.extend(self.objects(&cell, vocab::RDF_FIRST).cloned());
            pending.extend(self.objects(&cell, vocab::RDF_REST).cloned());
        }
        members
    }

    /// Expand `node` into named members: an IRI stands for itself, a blank
    /// node carrying owl:unionOf stands for the members of its list (nested
    /// unions included). Other blank nodes expand to nothing.
    pub fn union_members(&self, node: &Node) -> BTreeSet<String> {
        let mut members = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([node.clone()]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            match &current {
                Node::Iri(iri) => {
                    members.insert(iri.clone());
                }
                Node::Blank(_) => {
                    for head in self.objects(&current, vocab::OWL_UNION_OF) {
                        queue.extend(self.list_members(head));
                    }
                }
                Node::Literal { .. } => {}
            }
        }
        members
    }

    /// Breadth-first walk over `(?, predicate, node)` starting at `start`,
    /// returning every reached subject (excluding `start`) in visit order
    pub fn subjects_transitive(&self, predicate: &str, start: &Node) -> Vec<Node> {
        let mut reached = Vec::new();
        let mut visited = HashSet::from([start.clone()]);
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(current) = queue.pop_front() {
            for subject in self.subjects(predicate, &current) {
                if visited.insert(subject.clone()) {
                    reached.push(subject.clone());
                    queue.push_back(subject.clone());
                }
            }
        }
        reached
    }
}
