//! Queries against a source type, optionally joined to ancestor sources.

use crate::ast::{Filter, SortBy};
use crate::join::JoinSpec;
use std::time::Duration;

/// Nested-resolution hint forwarded to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveHint {
    /// Resolution explicitly disabled.
    Disabled,
    /// Resolve references up to `depth` levels, waiting at most `timeout`.
    Depth { depth: u32, timeout: Option<Duration> },
}

/// A query over one source type.
///
/// With a non-empty join list the query is a joining query: it returns only
/// the rows that join to the outermost source through every step, ordered by
/// the join levels from the outermost inward, and labels each joined level's
/// identifier columns as `FOREIGN_ID_<level>_<index>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    type_name: String,
    properties: Option<Vec<String>>,
    filter: Filter,
    sort: Vec<SortBy>,
    joins: Vec<JoinSpec>,
    reprojection: Option<String>,
    resolve: Option<ResolveHint>,
    has_id_column: bool,
}

impl Query {
    /// Creates a query returning every row and column of a source type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: None,
            filter: Filter::Include,
            sort: Vec::new(),
            joins: Vec::new(),
            reprojection: None,
            resolve: None,
            has_id_column: true,
        }
    }

    /// Restricts the projected columns. `None` projects every column.
    pub fn with_properties(mut self, properties: Option<Vec<String>>) -> Self {
        self.properties = properties;
        self
    }

    /// Sets the row filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the query's own sort.
    pub fn with_sort(mut self, sort: Vec<SortBy>) -> Self {
        self.sort = sort;
        self
    }

    /// Replaces the join list. `joins[0]` is the immediate parent.
    pub fn with_joins(mut self, joins: Vec<JoinSpec>) -> Self {
        self.joins = joins;
        self
    }

    /// Sets the opaque reprojection target.
    pub fn with_reprojection(mut self, target: Option<String>) -> Self {
        self.reprojection = target;
        self
    }

    /// Sets the resolve hint.
    pub fn with_resolve(mut self, hint: ResolveHint) -> Self {
        self.resolve = Some(hint);
        self
    }

    /// Declares whether the queried mapping has its own identifier column.
    /// Without one, the backend appends `PRIMARY_KEY_<index>` columns.
    pub fn with_id_column(mut self, has_id_column: bool) -> Self {
        self.has_id_column = has_id_column;
        self
    }

    /// Adds a join one level further out than the current immediate parent,
    /// making it the new immediate parent.
    pub fn prepend_join(&mut self, join: JoinSpec) {
        self.joins.insert(0, join);
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn properties(&self) -> Option<&[String]> {
        self.properties.as_deref()
    }

    #[inline]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    #[inline]
    pub fn sort(&self) -> &[SortBy] {
        &self.sort
    }

    #[inline]
    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    #[inline]
    pub fn reprojection(&self) -> Option<&str> {
        self.reprojection.as_deref()
    }

    #[inline]
    pub fn resolve(&self) -> Option<ResolveHint> {
        self.resolve
    }

    #[inline]
    pub fn has_id_column(&self) -> bool {
        self.has_id_column
    }

    /// Returns true if the query joins to at least one ancestor source.
    #[inline]
    pub fn is_joining(&self) -> bool {
        !self.joins.is_empty()
    }

    /// Returns true if any sort key, own or inherited, uses storage order.
    pub fn uses_natural_order(&self) -> bool {
        self.sort.iter().any(SortBy::is_natural)
            || self.joins.iter().flat_map(|j| j.sort.iter()).any(SortBy::is_natural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    fn join(parent: &str) -> JoinSpec {
        JoinSpec::new(parent, Expr::column("id"), Expr::column("parent_id"))
    }

    #[test]
    fn test_defaults() {
        let q = Query::new("stations");
        assert_eq!(q.type_name(), "stations");
        assert!(q.properties().is_none());
        assert!(q.filter().is_include());
        assert!(!q.is_joining());
        assert!(q.has_id_column());
        assert!(q.resolve().is_none());
    }

    #[test]
    fn test_prepend_join_makes_immediate_parent() {
        let mut q = Query::new("readings").with_joins(vec![join("networks")]);
        q.prepend_join(join("stations"));
        let parents: Vec<_> = q.joins().iter().map(|j| j.parent_type.as_str()).collect();
        assert_eq!(parents, vec!["stations", "networks"]);
        assert!(q.is_joining());
    }

    #[test]
    fn test_natural_order_detection() {
        let q = Query::new("readings").with_sort(vec![SortBy::asc("id")]);
        assert!(!q.uses_natural_order());
        let q = q.with_joins(vec![join("stations").with_sort(vec![SortBy::Reverse])]);
        assert!(q.uses_natural_order());
    }
}
