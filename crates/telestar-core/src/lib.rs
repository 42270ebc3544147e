//! Core contracts for Telestar.
//!
//! This crate defines the in-memory table store shared by the reconciliation
//! engine, the auditor and the CLI: typed values, columns with an inferred
//! semantic kind, tables and the store that owns them.

pub mod error;
pub mod store;
pub mod table;
pub mod value;

pub use error::{Error, Result};
pub use store::TableStore;
pub use table::{Column, ColumnKind, Row, Table};
pub use value::{Value, epoch_timestamp};
