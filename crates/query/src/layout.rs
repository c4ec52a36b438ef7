//! Named row layouts.
//!
//! Rows are positional; a `RowLayout` names each position so that expressions
//! can be evaluated by column name. Layouts are shared between all rows of a
//! cursor through an `Arc`.
//!
//! Joining queries surface two families of synthetic columns that the
//! backend's row materialization must honor:
//!
//! - `FOREIGN_ID_<level>_<index>`: identifier column `index` of the source
//!   joined at chain `level` (level 0 is the immediate parent).
//! - `PRIMARY_KEY_<index>`: primary key column `index` of the queried source,
//!   present when the query reports no identifier column of its own.

use crate::error::{QueryError, Result};
use hashbrown::HashMap;
use std::sync::Arc;
use tessera_core::schema::SourceType;
use tessera_core::{Row, Value};

/// Prefix of the synthetic identifier columns of joined sources.
pub const FOREIGN_ID: &str = "FOREIGN_ID";

/// Prefix of the synthetic primary key columns.
pub const PRIMARY_KEY: &str = "PRIMARY_KEY";

/// Returns the name of identifier column `index` of join `level`.
pub fn foreign_id_column(level: usize, index: usize) -> String {
    format!("{}_{}_{}", FOREIGN_ID, level, index)
}

/// Returns the name of primary key column `index`.
pub fn primary_key_column(index: usize) -> String {
    format!("{}_{}", PRIMARY_KEY, index)
}

/// Column names of a row stream, with name lookup.
#[derive(Clone, Debug, Default)]
pub struct RowLayout {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl RowLayout {
    /// Creates a layout from column names. Later duplicates do not shadow
    /// earlier columns.
    pub fn new(columns: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        Self { columns, positions }
    }

    /// Creates the layout of a source type's stored rows.
    pub fn from_source(source: &SourceType) -> Self {
        Self::new(source.columns().iter().map(|c| c.name().to_string()).collect())
    }

    /// Returns the column names in position order.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the layout has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the position of a column.
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Returns the position of a column, or a column-not-found error.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| QueryError::column_not_found("row layout", name))
    }

    /// Returns the synthetic foreign-id columns, in position order.
    pub fn foreign_id_columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.synthetic_columns(FOREIGN_ID)
    }

    /// Returns the synthetic primary key columns, in position order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.synthetic_columns(PRIMARY_KEY)
    }

    fn synthetic_columns<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (usize, &'a str)> {
        self.columns.iter().enumerate().filter_map(move |(i, name)| {
            name.strip_prefix(prefix)
                .filter(|rest| rest.starts_with('_'))
                .map(|_| (i, name.as_str()))
        })
    }
}

impl From<Vec<String>> for RowLayout {
    fn from(columns: Vec<String>) -> Self {
        Self::new(columns)
    }
}

/// A shared layout handle.
pub type SharedLayout = Arc<RowLayout>;

/// A row viewed through its layout.
#[derive(Clone, Copy, Debug)]
pub struct RowRef<'a> {
    layout: &'a RowLayout,
    row: &'a Row,
}

impl<'a> RowRef<'a> {
    /// Pairs a row with the layout naming its values.
    #[inline]
    pub fn new(layout: &'a RowLayout, row: &'a Row) -> Self {
        Self { layout, row }
    }

    /// Returns the value of a named column.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.layout.position(name).and_then(|i| self.row.get(i))
    }

    /// Returns the underlying row.
    #[inline]
    pub fn row(&self) -> &'a Row {
        self.row
    }

    /// Returns the layout.
    #[inline]
    pub fn layout(&self) -> &'a RowLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> RowLayout {
        RowLayout::new(vec![
            "id".into(),
            "name".into(),
            foreign_id_column(0, 0),
            foreign_id_column(1, 0),
            primary_key_column(0),
        ])
    }

    #[test]
    fn test_synthetic_names() {
        assert_eq!(foreign_id_column(2, 1), "FOREIGN_ID_2_1");
        assert_eq!(primary_key_column(0), "PRIMARY_KEY_0");
    }

    #[test]
    fn test_position_lookup() {
        let layout = layout();
        assert_eq!(layout.position("name"), Some(1));
        assert_eq!(layout.position("missing"), None);
        assert!(layout.require("missing").is_err());
    }

    #[test]
    fn test_synthetic_column_iteration() {
        let layout = layout();
        let foreign: Vec<_> = layout.foreign_id_columns().map(|(i, _)| i).collect();
        assert_eq!(foreign, vec![2, 3]);
        let pk: Vec<_> = layout.primary_key_columns().map(|(_, n)| n.to_string()).collect();
        assert_eq!(pk, vec!["PRIMARY_KEY_0".to_string()]);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let layout = RowLayout::new(vec!["a".into(), "a".into()]);
        assert_eq!(layout.position("a"), Some(0));
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn test_row_ref_get() {
        let layout = layout();
        let row = Row::new(
            1,
            vec![
                Value::Int64(1),
                "Kew".into(),
                Value::Int64(10),
                Value::Int64(100),
                Value::Int64(1),
            ],
        );
        let view = RowRef::new(&layout, &row);
        assert_eq!(view.get("name"), Some(&Value::String("Kew".into())));
        assert_eq!(view.get("FOREIGN_ID_1_0"), Some(&Value::Int64(100)));
        assert_eq!(view.get("other"), None);
    }
}
