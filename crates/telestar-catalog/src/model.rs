use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Current contract version for catalog files.
pub const CATALOG_VERSION: &str = "0.1";

/// A declared foreign-key relationship between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    /// Table owning the referenced key.
    pub primary_table: String,
    /// Referenced column in the primary table.
    pub primary_key: String,
    /// Table holding the references.
    pub foreign_table: String,
    /// Referencing column in the foreign table.
    pub foreign_key: String,
}

impl Relationship {
    pub fn new(
        primary_table: impl Into<String>,
        primary_key: impl Into<String>,
        foreign_table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            primary_table: primary_table.into(),
            primary_key: primary_key.into(),
            foreign_table: foreign_table.into(),
            foreign_key: foreign_key.into(),
        }
    }

    /// Human-readable `Foreign.fk -> Primary.pk` path.
    pub fn path(&self) -> String {
        format!(
            "{}.{} -> {}.{}",
            self.foreign_table, self.foreign_key, self.primary_table, self.primary_key
        )
    }

    pub fn is_self_reference(&self) -> bool {
        self.primary_table == self.foreign_table
    }
}

/// Primary keys per table plus the ordered relationship list.
///
/// Relationships are reconciled in the order they are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Catalog {
    /// Contract version for this catalog format.
    pub catalog_version: String,
    /// Declared primary key column per table; only these tables are padded.
    #[serde(default)]
    pub primary_keys: BTreeMap<String, String>,
    /// Relationships in processing order.
    pub relationships: Vec<Relationship>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            catalog_version: CATALOG_VERSION.to_string(),
            primary_keys: BTreeMap::new(),
            relationships: Vec::new(),
        }
    }
}

impl Catalog {
    pub fn new(primary_keys: BTreeMap<String, String>, relationships: Vec<Relationship>) -> Self {
        Self {
            catalog_version: CATALOG_VERSION.to_string(),
            primary_keys,
            relationships,
        }
    }

    pub fn primary_key(&self, table: &str) -> Option<&str> {
        self.primary_keys.get(table).map(String::as_str)
    }

    pub fn with_primary_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.primary_keys.insert(table.into(), column.into());
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }
}
