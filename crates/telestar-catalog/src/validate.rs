use std::collections::HashSet;
use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value;
use telestar_core::TableStore;

use crate::errors::{CatalogError, ValidationIssue, ValidationReport};
use crate::model::{CATALOG_VERSION, Catalog, Relationship};
use crate::schema::catalog_json_schema_value;

/// Validated catalog with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedCatalog {
    pub catalog: Catalog,
    pub warnings: Vec<ValidationIssue>,
}

/// Read, structurally validate and semantically validate a catalog file.
pub fn load_catalog(path: &Path) -> Result<ValidatedCatalog, CatalogError> {
    let contents = std::fs::read_to_string(path)?;
    let catalog_json: Value = serde_json::from_str(&contents)?;
    let schema = catalog_json_schema_value()?;
    validate_catalog_document(&catalog_json, &schema).map_err(CatalogError::Invalid)
}

/// Validate a catalog JSON document against the catalog JSON Schema.
pub fn validate_catalog_json(
    catalog_json: &Value,
    catalog_schema: &Value,
) -> Result<ValidationReport, CatalogError> {
    let compiled = JSONSchema::compile(catalog_schema)
        .map_err(|err| CatalogError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(catalog_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Validate the document end-to-end, returning structured issues on failure.
pub fn validate_catalog_document(
    catalog_json: &Value,
    catalog_schema: &Value,
) -> Result<ValidatedCatalog, ValidationReport> {
    let structural = match validate_catalog_json(catalog_json, catalog_schema) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let catalog: Catalog = match serde_json::from_value(catalog_json.clone()) {
        Ok(catalog) => catalog,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "invalid_catalog_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let semantic = validate_catalog(&catalog);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedCatalog {
        catalog,
        warnings: semantic.warnings,
    })
}

/// Check internal consistency of a catalog.
///
/// Errors: version mismatch, empty table or column names.
/// Warnings: duplicate relationships, relationships whose primary side is not
/// the declared primary key, primary tables without a declared key.
pub fn validate_catalog(catalog: &Catalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    if catalog.catalog_version != CATALOG_VERSION {
        report.push(ValidationIssue::error(
            "catalog_version_mismatch",
            "/catalog_version",
            format!(
                "catalog_version '{}' is not supported (expected '{}')",
                catalog.catalog_version, CATALOG_VERSION
            ),
            Some(format!("set catalog_version to \"{CATALOG_VERSION}\"")),
        ));
    }

    for (table, column) in &catalog.primary_keys {
        if table.trim().is_empty() || column.trim().is_empty() {
            report.push(ValidationIssue::error(
                "empty_name",
                format!("/primary_keys/{table}"),
                "primary key entries need a table and a column name".to_string(),
                None,
            ));
        }
    }

    if catalog.relationships.is_empty() {
        report.push(ValidationIssue::warning(
            "relationships_empty",
            "/relationships",
            "catalog declares no relationships".to_string(),
            Some("reconciliation will only pad primary tables".to_string()),
        ));
    }

    let mut seen: HashSet<&Relationship> = HashSet::new();
    let mut undeclared: HashSet<&str> = HashSet::new();

    for (idx, rel) in catalog.relationships.iter().enumerate() {
        let base_path = format!("/relationships/{idx}");
        validate_names(rel, &base_path, &mut report);

        if !seen.insert(rel) {
            report.push(ValidationIssue::warning(
                "duplicate_relationship",
                base_path.clone(),
                format!("relationship {} is declared more than once", rel.path()),
                Some("the second occurrence is a no-op".to_string()),
            ));
        }

        match catalog.primary_key(&rel.primary_table) {
            Some(declared) if declared != rel.primary_key => {
                report.push(ValidationIssue::warning(
                    "primary_key_mismatch",
                    format!("{base_path}/primary_key"),
                    format!(
                        "relationship references {}.{} but the declared key is {}",
                        rel.primary_table, rel.primary_key, declared
                    ),
                    None,
                ));
            }
            Some(_) => {}
            None => {
                if undeclared.insert(rel.primary_table.as_str()) {
                    report.push(ValidationIssue::warning(
                        "undeclared_primary_table",
                        format!("{base_path}/primary_table"),
                        format!(
                            "table '{}' has no declared primary key and will not be padded",
                            rel.primary_table
                        ),
                        Some("add it to primary_keys to seed a sentinel row".to_string()),
                    ));
                }
            }
        }
    }

    report
}

/// Report catalog entries that the loaded tables cannot satisfy.
///
/// Everything here is a warning; reconciliation skips those relationships.
pub fn validate_catalog_against_store(catalog: &Catalog, store: &TableStore) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (idx, rel) in catalog.relationships.iter().enumerate() {
        let base_path = format!("/relationships/{idx}");
        for (role, table, column) in [
            ("primary", &rel.primary_table, &rel.primary_key),
            ("foreign", &rel.foreign_table, &rel.foreign_key),
        ] {
            match store.get(table) {
                None => report.push(ValidationIssue::warning(
                    "missing_table",
                    format!("{base_path}/{role}_table"),
                    format!("{role} table '{table}' is not loaded"),
                    None,
                )),
                Some(loaded) if !loaded.has_column(column) => {
                    report.push(ValidationIssue::warning(
                        "missing_column",
                        format!("{base_path}/{role}_key"),
                        format!("column '{table}.{column}' is not present"),
                        None,
                    ))
                }
                Some(_) => {}
            }
        }
    }

    for (table, column) in &catalog.primary_keys {
        if let Some(loaded) = store.get(table) {
            if !loaded.has_column(column) {
                report.push(ValidationIssue::warning(
                    "missing_column",
                    format!("/primary_keys/{table}"),
                    format!("declared primary key '{table}.{column}' is not present"),
                    None,
                ));
            }
        }
    }

    report
}

fn validate_names(rel: &Relationship, base_path: &str, report: &mut ValidationReport) {
    for (field, value) in [
        ("primary_table", &rel.primary_table),
        ("primary_key", &rel.primary_key),
        ("foreign_table", &rel.foreign_table),
        ("foreign_key", &rel.foreign_key),
    ] {
        if value.trim().is_empty() {
            report.push(ValidationIssue::error(
                "empty_name",
                format!("{base_path}/{field}"),
                format!("{field} must not be empty"),
                None,
            ));
        }
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
