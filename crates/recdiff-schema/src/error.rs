use thiserror::Error;

/// Errors produced while building or loading diff schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("type {type_name} declares more than one identity field: {fields:?}")]
    MultipleIdentityFields {
        type_name: String,
        fields: Vec<String>,
    },

    #[error("type {0} is already registered")]
    DuplicateType(String),

    #[error("type name must not be empty")]
    EmptyTypeName,

    #[error("field {type_name}.{field} references unknown type {referenced}")]
    UnknownType {
        type_name: String,
        field: String,
        referenced: String,
    },

    #[error("field {type_name}.{field} has invalid type declaration: {reason}")]
    InvalidFieldType {
        type_name: String,
        field: String,
        reason: String,
    },

    #[error("schema parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
