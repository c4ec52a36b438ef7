//! Error types for query execution and cursor reads.

use thiserror::Error;

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors raised while compiling, executing or reading a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The backend has no source registered under this name.
    #[error("Unknown source type: {0}")]
    UnknownType(String),

    /// A column referenced by an expression, sort or projection is missing.
    #[error("Column {column} not found in {context}")]
    ColumnNotFound { context: String, column: String },

    /// Natural or reverse order cannot be expressed across joined sources.
    #[error("Cannot do natural order in joining queries")]
    NaturalOrderInJoin,

    /// A row was requested from a cursor with no rows left.
    #[error("Cursor exhausted")]
    Exhausted,

    /// A read was attempted on a closed cursor.
    #[error("Cursor is closed")]
    Closed,

    /// Read or execution failure reported by the backing store.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Schema or value error from the core types.
    #[error(transparent)]
    Core(#[from] tessera_core::Error),
}

impl QueryError {
    /// Creates a column not found error.
    pub fn column_not_found(context: impl Into<String>, column: impl Into<String>) -> Self {
        QueryError::ColumnNotFound {
            context: context.into(),
            column: column.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        QueryError::Backend(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::column_not_found("stations", "elevation");
        assert_eq!(err.to_string(), "Column elevation not found in stations");

        let err = QueryError::NaturalOrderInJoin;
        assert!(err.to_string().contains("natural order"));
    }

    #[test]
    fn test_core_error_conversion() {
        let err: QueryError = tessera_core::Error::invalid_schema("bad").into();
        assert!(matches!(err, QueryError::Core(_)));
        assert!(err.to_string().contains("bad"));
    }
}
