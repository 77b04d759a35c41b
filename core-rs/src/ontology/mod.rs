/**
 * ontology module
 *
 * - vocab: RDF/RDFS/OWL/SKOS/XSD term IRIs
 * - graph: in-memory schema triple index loaded with Oxigraph
 * - types: ClassNode / RelationNode / CatalogNode records and the HierarchyNode contract
 * - hierarchy: generic labelled-hierarchy traversal
 * - model: OntologyModel (materialization, levels, shoulders, maximal class)
 */

pub mod graph;
pub mod hierarchy;
pub mod model;
pub mod types;
pub mod vocab;

pub use graph::{Node, SchemaGraph};
pub use hierarchy::{clean_label, elements_with_hierarchy, HierarchyElement, TraversalSpec};
pub use model::{shoulder_for, OntologyModel};
pub use types::{
    descendants, CatalogNode, CatalogTree, ClassNode, HierarchyNode, Label, RangeKind,
    RelationNode, SchemaDump,
};
