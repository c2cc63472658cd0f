//! Error types for the mapping layer.
//!
//! `NotFound` is deliberately not part of this taxonomy: a missing row is a
//! normal outcome and is represented as `Option::None` by the repository.
//! None of these errors are retried internally; retries, if any, are a
//! collaborator's responsibility.

use thiserror::Error;

/// Result type for mapping-layer operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the entity-to-wide-column mapping layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Row key that is not a well-formed entity identifier.
    #[error("invalid row key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// A cell was read whose column matches no descriptor, or whose payload
    /// does not decode as the declared column type. Carries enough context
    /// (table, row, column) to diagnose schema drift.
    #[error(
        "schema mismatch in table '{table}', row '{row_key}', column '{family}:{qualifier}': {detail}"
    )]
    SchemaMismatch {
        table: String,
        row_key: String,
        family: String,
        qualifier: String,
        detail: String,
    },

    /// A value failed to encode on the write path.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport or backend failure while talking to the store.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Operation addressed a table the store does not know.
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Entity metadata is unusable (empty table id, colliding families, ...).
    /// Raised at repository construction, never per operation.
    #[error("entity metadata error: {0}")]
    Construction(String),
}
