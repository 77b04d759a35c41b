/**
 * builder.rs
 * SPARQL text for the four lookup shapes
 *
 * Every id batch goes into one `VALUES` block. Label variables are
 * `?labvar_0 .. ?labvar_n`, one per configured label predicate, and each is
 * filtered to the requested language or no language tag.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ServiceConfig;
use crate::errors::{GrontopiError, Result};

static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*$").expect("language tag pattern is valid")
});

/// Prefixes shorter than this are ignored by `entities_of_class`
pub const MIN_PREFIX_LEN: usize = 3;

const PREFIX_VARIABLE: &str = "prefixlabel";

/// Trim each line and rejoin; the result is the cache key
pub fn normalize(query: &str) -> String {
    query.split('\n').map(str::trim).collect::<Vec<_>>().join("\n")
}

/// Validate an entity or class id (`<iri>` or `iri`) and return the bare IRI
pub fn entity_iri(id: &str) -> Result<String> {
    let trimmed = id.trim();
    let bare = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed);

    let forbidden = |c: char| c.is_whitespace() || "<>\"{}|^`\\".contains(c);
    if bare.is_empty() || !bare.contains(':') || bare.chars().any(forbidden) {
        return Err(GrontopiError::InvalidIri(id.to_string()));
    }
    Ok(bare.to_string())
}

/// Validate a language tag before it is embedded in query text
pub fn language_tag(lang: &str) -> Result<&str> {
    if LANGUAGE_TAG.is_match(lang) {
        Ok(lang)
    } else {
        Err(GrontopiError::InvalidLanguage(lang.to_string()))
    }
}

/// Escape a value for a single-quoted SPARQL string literal
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Name (without `?`) of the variable bound to the i-th label predicate
pub fn label_variable(index: usize) -> String {
    format!("labvar_{}", index)
}

/// Query-shaping settings shared by every builder
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    pub type_predicates: Vec<String>,
    pub label_predicates: Vec<String>,
    pub different_graphs: bool,
}

impl QueryContext {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            type_predicates: config.type_predicate_iris(),
            label_predicates: config.label_predicate_iris(),
            different_graphs: config.different_graphs,
        }
    }

    /// `(variable, predicate)` for each label predicate, in order
    pub fn label_variables(&self) -> Vec<(String, String)> {
        self.label_predicates
            .iter()
            .enumerate()
            .map(|(i, predicate)| (label_variable(i), predicate.clone()))
            .collect()
    }

    fn graph_open(&self) -> &'static str {
        if self.different_graphs {
            "GRAPH ?g {"
        } else {
            ""
        }
    }

    fn graph_close(&self) -> &'static str {
        if self.different_graphs {
            "}"
        } else {
            ""
        }
    }

    fn type_values(&self) -> String {
        iri_list(self.type_predicates.iter(), " ")
    }

    fn label_select(&self) -> String {
        self.label_variables()
            .iter()
            .map(|(var, _)| format!("?{}", var))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// One OPTIONAL per label predicate. The language test sits inside each
    /// OPTIONAL so a value in another language leaves only its own variable
    /// unbound.
    fn label_optionals(&self, lang: &str) -> String {
        self.label_variables()
            .iter()
            .map(|(var, predicate)| {
                format!(
                    "OPTIONAL {{ ?s <{p}> ?{v} FILTER({f}) }} .",
                    p = predicate,
                    v = var,
                    f = language_filter(var, lang)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Accept a value with no language tag or exactly `lang`
fn language_filter(var: &str, lang: &str) -> String {
    format!("LANG(?{v}) = '' || LANG(?{v}) = '{lang}'", v = var, lang = lang)
}

fn iri_list<'a>(iris: impl Iterator<Item = &'a String>, separator: &str) -> String {
    iris.map(|iri| format!("<{}>", iri))
        .collect::<Vec<_>>()
        .join(separator)
}

/// A built query
#[derive(Debug, Clone, PartialEq)]
pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// Cache key / wire text
    pub fn normalized(&self) -> String {
        normalize(&self.query)
    }

    /// Labels of a batch of entities, one OPTIONAL per label predicate
    pub fn entity_labels(ctx: &QueryContext, ids: &[String], lang: &str) -> Self {
        Self::new(format!(
            r#"
            SELECT ?s {select}
            WHERE {{
                {open}
                    VALUES ?s {{ {values} }}
                    {optionals}
                {close}
            }}
            "#,
            select = ctx.label_select(),
            open = ctx.graph_open(),
            values = iri_list(ids.iter(), " "),
            optionals = ctx.label_optionals(lang),
            close = ctx.graph_close(),
        ))
    }

    /// Classes (restricted to `allowed_classes`) of a batch of entities
    pub fn entity_classes<'a>(
        ctx: &QueryContext,
        ids: &[String],
        allowed_classes: impl Iterator<Item = &'a String>,
    ) -> Self {
        Self::new(format!(
            r#"
            SELECT ?s ?cls
            WHERE {{
                {open}
                    VALUES ?s {{ {values} }}
                    VALUES ?typepred {{ {types} }}
                    ?s ?typepred ?cls .
                {close}
                FILTER(?cls IN ( {classes} ))
            }}
            "#,
            open = ctx.graph_open(),
            values = iri_list(ids.iter(), " "),
            types = ctx.type_values(),
            close = ctx.graph_close(),
            classes = iri_list(allowed_classes, ", "),
        ))
    }

    /// Outgoing and incoming links of one entity over the allowed predicates.
    /// Literal objects always pass; IRI neighbours must be typed with an
    /// allowed class.
    pub fn entity_links<'a, 'b>(
        ctx: &QueryContext,
        id: &str,
        predicates: impl Iterator<Item = &'a String>,
        allowed_classes: impl Iterator<Item = &'b String>,
    ) -> Self {
        Self::new(format!(
            r#"
            SELECT DISTINCT ?s ?p ?o
            WHERE {{
                {open}
                    VALUES ?p {{ {predicates} }}
                    VALUES ?typepred {{ {types} }}
                    {{
                        <{id}> ?p ?o .
                        BIND (<{id}> AS ?s) .
                        OPTIONAL {{ ?o ?typepred ?cls }}
                    }}
                    UNION
                    {{
                        ?s ?p <{id}> .
                        ?s ?typepred ?cls .
                        BIND (<{id}> AS ?o)
                    }}
                {close}
                FILTER(isLiteral(?o) || ?cls IN ( {classes} ))
            }}
            "#,
            open = ctx.graph_open(),
            predicates = iri_list(predicates, " "),
            types = ctx.type_values(),
            id = id,
            close = ctx.graph_close(),
            classes = iri_list(allowed_classes, ", "),
        ))
    }

    /// One page of instances of a class with their labels.
    ///
    /// OFFSET/LIMIT apply to distinct subjects in a subquery, so an entity
    /// with several labels still occupies exactly one slot. The prefix test
    /// runs inside the subquery against the first label predicate.
    pub fn entities_of_class(
        ctx: &QueryContext,
        class_iri: &str,
        start: usize,
        count: usize,
        lang: &str,
        prefix: &str,
    ) -> Self {
        let prefix_pattern = match ctx.label_predicates.first() {
            Some(predicate) if prefix.chars().count() >= MIN_PREFIX_LEN => format!(
                "?s <{p}> ?{v} .\nFILTER(({lf}) && STRSTARTS(LCASE(STR(?{v})), '{prefix}'))",
                p = predicate,
                v = PREFIX_VARIABLE,
                lf = language_filter(PREFIX_VARIABLE, lang),
                prefix = escape_literal(&prefix.to_lowercase()),
            ),
            _ => String::new(),
        };

        Self::new(format!(
            r#"
            SELECT ?s {select}
            WHERE {{
                {{
                    SELECT DISTINCT ?s
                    WHERE {{
                        {open}
                            VALUES ?typepred {{ {types} }}
                            ?s ?typepred <{class}> .
                            {prefix_pattern}
                        {close}
                    }}
                    OFFSET {start} LIMIT {count}
                }}
                {open}
                    {optionals}
                {close}
            }}
            "#,
            select = ctx.label_select(),
            open = ctx.graph_open(),
            types = ctx.type_values(),
            class = class_iri,
            prefix_pattern = prefix_pattern,
            close = ctx.graph_close(),
            start = start,
            count = count,
            optionals = ctx.label_optionals(lang),
        ))
    }
}
