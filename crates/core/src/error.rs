//! Error types for Tessera core types.

use crate::types::DataType;
use alloc::string::String;
use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for schema and value operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Type mismatch error.
    #[error("Type mismatch: expected {expected:?}, got {got:?}")]
    TypeMismatch { expected: DataType, got: DataType },
    /// Null value written to a non-nullable column.
    #[error("Null constraint violation on column: {column}")]
    NullConstraint { column: String },
    /// Invalid schema definition.
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },
    /// Column not found.
    #[error("Column {column} not found in source {source_type}")]
    ColumnNotFound { source_type: String, column: String },
    /// Row width does not match the source definition.
    #[error("Row for {source_type} has {got} values, expected {expected}")]
    ArityMismatch {
        source_type: String,
        expected: usize,
        got: usize,
    },
}

impl Error {
    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch { expected, got }
    }

    /// Creates a null constraint error.
    pub fn null_constraint(column: impl Into<String>) -> Self {
        Error::NullConstraint {
            column: column.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(source_type: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            source_type: source_type.into(),
            column: column.into(),
        }
    }
}
