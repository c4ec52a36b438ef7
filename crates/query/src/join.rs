//! Join chain steps.

use crate::ast::{Expr, SortBy};

/// One step of a join chain.
///
/// A joining query selects the rows of its own source type that join, through
/// a chain of these steps, to the rows of the outermost source. Step 0 is the
/// immediate parent of the queried type; the last step is the outermost one.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinSpec {
    /// Source type joined at this step.
    pub parent_type: String,
    /// Key expression evaluated on the parent rows.
    pub parent_key: Expr,
    /// Key expression evaluated on the rows of the next inner level.
    pub child_key: Expr,
    /// Identifier columns of the parent. Empty means the parent's primary key.
    pub id_columns: Vec<String>,
    /// Sort of the parent rows. Empty means the parent's primary key.
    pub sort: Vec<SortBy>,
}

impl JoinSpec {
    /// Creates a join step on the given keys.
    pub fn new(parent_type: impl Into<String>, parent_key: Expr, child_key: Expr) -> Self {
        Self {
            parent_type: parent_type.into(),
            parent_key,
            child_key,
            id_columns: Vec::new(),
            sort: Vec::new(),
        }
    }

    /// Sets the parent identifier columns.
    pub fn with_ids(mut self, id_columns: Vec<String>) -> Self {
        self.id_columns = id_columns;
        self
    }

    /// Sets the parent sort.
    pub fn with_sort(mut self, sort: Vec<SortBy>) -> Self {
        self.sort = sort;
        self
    }
}
