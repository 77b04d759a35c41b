//! LocalStoreEndpoint: evaluates queries against an in-memory Oxigraph store
//!
//! Used by the CLI `--data` mode and by tests that want real SPARQL
//! evaluation without a network service.

use async_trait::async_trait;
use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::endpoint::results::{Binding, BoundTerm, QueryResponse, TermKind};
use crate::endpoint::traits::{GraphQueryEndpoint, Transport};
use crate::errors::{GrontopiError, Result};
use crate::ontology::vocab;

pub struct LocalStoreEndpoint {
    store: Store,
    source: Option<PathBuf>,
}

impl LocalStoreEndpoint {
    /// Build a store from Turtle text
    pub fn from_turtle(content: &str) -> Result<Self> {
        let store = Store::new().map_err(|e| GrontopiError::Upstream(e.to_string()))?;
        store
            .load_from_reader(RdfFormat::Turtle, content.as_bytes())
            .map_err(|e| GrontopiError::SchemaParse(e.to_string()))?;
        Ok(Self {
            store,
            source: None,
        })
    }

    /// Build a store from a Turtle file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(GrontopiError::SchemaNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let mut endpoint = Self::from_turtle(&content)?;
        endpoint.source = Some(path.to_path_buf());
        info!(path = %path.display(), triples = endpoint.len(), "loaded local data store");
        Ok(endpoint)
    }

    pub fn len(&self) -> usize {
        self.store.len().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evaluate(&self, query: &str) -> Result<QueryResponse> {
        let results = self
            .store
            .query(query)
            .map_err(|e| GrontopiError::Upstream(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let vars: Vec<String> = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();

                let mut bindings = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| GrontopiError::Upstream(e.to_string()))?;
                    let mut row = Binding::new();
                    for (var, term) in solution.iter() {
                        if let Some(bound) = bound_term(term) {
                            row.insert(var.as_str().to_string(), bound);
                        }
                    }
                    bindings.push(row);
                }

                let mut response = QueryResponse::default();
                response.head.vars = vars;
                response.results.bindings = bindings;
                Ok(response)
            }
            QueryResults::Boolean(_) | QueryResults::Graph(_) => Err(GrontopiError::Upstream(
                "only SELECT queries are supported".to_string(),
            )),
        }
    }
}

fn bound_term(term: &Term) -> Option<BoundTerm> {
    match term {
        Term::NamedNode(n) => Some(BoundTerm::uri(n.as_str())),
        Term::BlankNode(b) => Some(BoundTerm {
            kind: TermKind::Bnode,
            value: b.as_str().to_string(),
            lang: None,
            datatype: None,
        }),
        Term::Literal(l) => {
            if let Some(lang) = l.language() {
                Some(BoundTerm::literal(l.value(), Some(lang)))
            } else if l.datatype().as_str() == vocab::XSD_STRING {
                Some(BoundTerm::literal(l.value(), None))
            } else {
                Some(BoundTerm::typed_literal(l.value(), l.datatype().as_str()))
            }
        }
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

#[async_trait]
impl GraphQueryEndpoint for LocalStoreEndpoint {
    async fn query(&self, query: &str, _transport: Transport) -> Result<QueryResponse> {
        self.evaluate(query)
    }

    fn describe(&self) -> String {
        match &self.source {
            Some(path) => format!("local store ({})", path.display()),
            None => "local store".to_string(),
        }
    }
}
