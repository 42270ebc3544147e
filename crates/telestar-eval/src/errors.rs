use thiserror::Error;

/// Errors emitted by the audit.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("audit failed with {0} invalid row(s)")]
    Violations(u64),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
