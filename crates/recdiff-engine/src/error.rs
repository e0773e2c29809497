//! Error types for the diff engine.

use recdiff_schema::SchemaError;

/// Errors that abort a comparison.
///
/// Problems local to one field (unreadable values, undeclared list element
/// types) are not errors; they are reported to the diagnostic sink and the
/// field is treated as unchanged.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The two sides of a comparison have incompatible shapes.
    #[error("type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// A schema could not be registered.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A record could not be serialized for comparison.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
