//! Well-known vocabulary IRIs used while reading the schema graph

pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDF_SUBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#subject";
pub const RDF_PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate";
pub const RDF_OBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#object";

pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";

pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const OWL_UNION_OF: &str = "http://www.w3.org/2002/07/owl#unionOf";

pub const SKOS_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
pub const SKOS_BROADER: &str = "http://www.w3.org/2004/02/skos/core#broader";
pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const SKOS_ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";

pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Human-readable labels attached to the RDF/RDFS terms that show up as
/// predicates in query results but carry no label in most schemas.
pub const BUILTIN_LABELS: &[(&str, &str)] = &[
    (RDF_TYPE, "belongs to class"),
    (RDF_SUBJECT, "has subject"),
    (RDF_PREDICATE, "has predicate"),
    (RDF_OBJECT, "has object"),
    (RDFS_SUBCLASS_OF, "is subclass of"),
];

/// Final path segment of an IRI (after the last `#`, else after the last `/`)
pub fn local_name(iri: &str) -> &str {
    let iri = iri.trim_start_matches('<').trim_end_matches('>');
    if let Some(idx) = iri.rfind('#') {
        return &iri[idx + 1..];
    }
    iri.rsplit('/').next().unwrap_or(iri)
}

/// True for XML Schema datatypes, which mark a property range as a literal
pub fn is_xsd(iri: &str) -> bool {
    iri.starts_with(XSD_NS)
}
