//! SPARQL 1.1 Query Results JSON format
//!
//! Only SELECT results are modelled. Unknown term types deserialize as
//! [`TermKind::Other`] so one odd binding never fails a whole response.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type of a bound RDF term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermKind {
    Uri,
    Literal,
    TypedLiteral,
    Bnode,
    #[serde(other)]
    Other,
}

/// One value in a result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundTerm {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl BoundTerm {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn literal(value: impl Into<String>, lang: Option<&str>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            lang: lang.map(str::to_string),
            datatype: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: &str) -> Self {
        Self {
            kind: TermKind::TypedLiteral,
            value: value.into(),
            lang: None,
            datatype: Some(datatype.to_string()),
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == TermKind::Uri
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, TermKind::Literal | TermKind::TypedLiteral)
    }
}

/// A row: variable name (without `?`) to bound term
pub type Binding = BTreeMap<String, BoundTerm>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBody {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Raw endpoint answer, the unit stored in the result cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub head: ResultHead,
    #[serde(default)]
    pub results: ResultBody,
}

impl QueryResponse {
    pub fn new(vars: &[&str], bindings: Vec<Binding>) -> Self {
        Self {
            head: ResultHead {
                vars: vars.iter().map(|v| v.to_string()).collect(),
            },
            results: ResultBody { bindings },
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.results.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }
}
