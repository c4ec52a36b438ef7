//! Error types for the joining engine.

use crate::session::CallerId;
use tessera_query::QueryError;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of engine errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Misuse of the engine or an inconsistent mapping.
    Configuration,
    /// The query backend broke its contract.
    Internal,
    /// Rows do not have the shape the mappings promise.
    DataShape,
    /// A cursor or backend read failed.
    Io,
}

/// Errors raised by the joining engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("A session is already open for {0}")]
    SessionAlreadyOpen(CallerId),

    #[error("No session is open for {0}")]
    SessionNotOpen(CallerId),

    #[error("No feature type mapping registered for {0}")]
    MissingMapping(String),

    #[error("Feature type mapping {type_name} has no attribute mapping for {path}")]
    MissingAttributeMapping { type_name: String, path: String },

    #[error("Nested attribute {0} shares its parent's source and must be read from the parent row")]
    SameSource(String),

    #[error("Query for {0} did not return a joining cursor")]
    NonJoiningCursor(String),

    #[error("Cannot resolve the nested type of {0} from the parent row")]
    UnresolvedNestedType(String),

    #[error("Column {column} is missing from the {type_name} cursor")]
    MissingColumn { type_name: String, column: String },

    #[error("Expected {expected} identifier values for {type_name}, got {got}")]
    IdArity {
        type_name: String,
        expected: usize,
        got: usize,
    },

    #[error("Feature type mapping {type_name} has no attribute {path}")]
    UnknownAttribute { type_name: String, path: String },

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl Error {
    /// Creates a missing attribute mapping error.
    pub fn missing_attribute_mapping(
        type_name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Error::MissingAttributeMapping {
            type_name: type_name.into(),
            path: path.into(),
        }
    }

    /// Creates a missing column error.
    pub fn missing_column(type_name: impl Into<String>, column: impl Into<String>) -> Self {
        Error::MissingColumn {
            type_name: type_name.into(),
            column: column.into(),
        }
    }

    /// Creates an unknown attribute error.
    pub fn unknown_attribute(type_name: impl Into<String>, path: impl Into<String>) -> Self {
        Error::UnknownAttribute {
            type_name: type_name.into(),
            path: path.into(),
        }
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SessionAlreadyOpen(_)
            | Error::SessionNotOpen(_)
            | Error::MissingMapping(_)
            | Error::MissingAttributeMapping { .. }
            | Error::SameSource(_)
            | Error::UnknownAttribute { .. } => ErrorKind::Configuration,
            Error::NonJoiningCursor(_) => ErrorKind::Internal,
            Error::UnresolvedNestedType(_) | Error::MissingColumn { .. } | Error::IdArity { .. } => {
                ErrorKind::DataShape
            }
            Error::Query(err) => match err {
                QueryError::UnknownType(_)
                | QueryError::ColumnNotFound { .. }
                | QueryError::NaturalOrderInJoin => ErrorKind::Configuration,
                QueryError::Core(_) => ErrorKind::DataShape,
                QueryError::Exhausted | QueryError::Closed | QueryError::Backend(_) => ErrorKind::Io,
            },
        }
    }
}
