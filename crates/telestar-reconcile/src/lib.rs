//! Referential-integrity reconciliation for Telestar.
//!
//! Pads declared primary tables with a sentinel row, then repairs every
//! catalog relationship by synthesizing placeholder primary rows for missing
//! foreign-key values and rewriting the foreign rows that still dangle.

pub mod engine;
pub mod errors;
pub mod input;
pub mod model;
pub mod output;
pub mod padding;
pub mod placeholder;
pub mod time_dimension;

pub use engine::{Reconciler, assign_round_robin, reconcile, reconcile_relationship};
pub use errors::{ReconcileError, TableRole};
pub use input::{load_store_dir, load_table_csv};
pub use model::{
    OutcomeStatus, PaddingRecord, ReconcileIssue, ReconcileOptions, ReconcileReport,
    RelationshipOutcome, RewritePolicy,
};
pub use output::{write_store_dir, write_table_csv};
pub use padding::{pad, pad_store};
pub use placeholder::{placeholder_for, placeholder_for_kind, sentinel_key, synthesize};
pub use time_dimension::{
    TIME_DIMENSION_TABLE, TimeDimension, TimeSource, build_time_dimension, telecom_time_sources,
};
