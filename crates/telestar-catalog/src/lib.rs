//! Relationship catalog contracts and validation.
//!
//! A catalog declares which column is the primary key of each table and the
//! foreign-key relationships the reconciler must satisfy.

pub mod builtin;
pub mod errors;
pub mod graph;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{CatalogError, IssueSeverity, ValidationIssue, ValidationReport};
pub use graph::{FkGraphReport, FkGraphSummary, build_fk_graph_report};
pub use model::{CATALOG_VERSION, Catalog, Relationship};
pub use schema::{catalog_json_schema, catalog_json_schema_value};
pub use validate::{
    ValidatedCatalog, load_catalog, validate_catalog, validate_catalog_against_store,
    validate_catalog_document, validate_catalog_json,
};
