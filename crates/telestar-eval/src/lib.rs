//! Read-only referential-integrity audit over a table store.

pub mod audit;
pub mod errors;
pub mod model;
pub mod report;

pub use audit::{audit, ensure_clean, write_audit};
pub use errors::EvalError;
pub use model::{
    AUDIT_VERSION, AuditPaths, AuditReport, ROW_SAMPLE_LIMIT, RelationshipViolation,
    SkippedRelationship,
};
pub use report::render_report;
