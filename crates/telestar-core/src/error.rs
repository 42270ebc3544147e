use thiserror::Error;

/// Core error type shared across Telestar crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A table was built or mutated with inconsistent shape.
    #[error("invalid table: {0}")]
    InvalidTable(String),
    /// A table name is already taken in the store.
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
}

/// Convenience alias for results returned by Telestar crates.
pub type Result<T> = std::result::Result<T, Error>;
