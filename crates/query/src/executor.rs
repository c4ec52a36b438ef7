//! The query execution collaborator.

use crate::cursor::RowCursor;
use crate::error::Result;
use crate::query::Query;

/// Executes queries against a relational store.
///
/// Joining queries must yield rows ordered by every join level from the
/// outermost inward (each level's sort, then its identifier columns),
/// followed by the query's own sort, and must label each joined level's
/// identifier columns `FOREIGN_ID_<level>_<index>`.
pub trait QueryExecutor: Send + Sync {
    /// Runs a query and returns a forward-only cursor over its rows.
    fn execute(&self, query: &Query) -> Result<Box<dyn RowCursor>>;

    /// Returns the primary key columns of a source type.
    fn primary_key(&self, type_name: &str) -> Result<Vec<String>>;
}
