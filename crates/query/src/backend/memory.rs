//! In-memory query executor.
//!
//! Joining queries are answered with one hash join per chain level: the
//! parent source is indexed on its key expression, then every partial chain
//! looks up its child key in the index. Chains are filtered on the outermost
//! row, sorted level by level and projected into a single row per chain.

use crate::ast::{Expr, SortBy, SortOrder};
use crate::cursor::{MemoryCursor, RowCursor};
use crate::error::{QueryError, Result};
use crate::executor::QueryExecutor;
use crate::layout::{foreign_id_column, primary_key_column, RowLayout, RowRef};
use crate::query::Query;
use core::cmp::Ordering;
use hashbrown::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use tessera_core::schema::SourceType;
use tessera_core::{next_row_id, Row, RowId, Value};
use tracing::debug;

/// Stored rows of one source type.
struct Table {
    source: SourceType,
    layout: RowLayout,
    rows: Vec<Row>,
}

impl Table {
    fn position(&self, column: &str) -> Result<usize> {
        self.source
            .get_column_index(column)
            .ok_or_else(|| QueryError::column_not_found(self.source.name(), column))
    }

    #[inline]
    fn row_ref(&self, index: usize) -> RowRef<'_> {
        RowRef::new(&self.layout, &self.rows[index])
    }

    /// Declared identifier columns, or the primary key when none are declared.
    fn id_columns<'a>(&'a self, declared: &'a [String]) -> &'a [String] {
        if declared.is_empty() {
            self.source.primary_key()
        } else {
            declared
        }
    }

    /// Indexes row positions by the normalized value of a key expression.
    fn key_index(&self, key: &Expr) -> Result<HashMap<Value, Vec<usize>>> {
        let mut index: HashMap<Value, Vec<usize>> = HashMap::with_capacity(self.rows.len());
        for i in 0..self.rows.len() {
            if let Some(value) = join_key(key.eval(self.row_ref(i))?) {
                index.entry(value).or_default().push(i);
            }
        }
        Ok(index)
    }

    /// Resolves sort keys for this table at a chain level. Property sorts
    /// end with the primary key as a tie-break, so an empty sort is the
    /// primary key alone. Storage order gets no tie-break.
    fn sort_keys(&self, level: usize, sort: &[SortBy], keys: &mut Vec<SortKey>) -> Result<()> {
        if sort.iter().any(SortBy::is_natural) {
            return Ok(());
        }
        let mut sorted: Vec<&str> = Vec::with_capacity(sort.len());
        for by in sort {
            if let SortBy::Property { name, order } = by {
                keys.push(SortKey::new(level, self.position(name)?, *order));
                sorted.push(name);
            }
        }
        for pk in self.source.primary_key() {
            if !sorted.contains(&pk.as_str()) {
                keys.push(SortKey::new(level, self.position(pk)?, SortOrder::Asc));
            }
        }
        Ok(())
    }
}

/// Normalizes a join key so that integer widths hash alike. Null keys never join.
fn join_key(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Int32(v) => Some(Value::Int64(v as i64)),
        other => Some(other),
    }
}

#[derive(Clone, Copy, Debug)]
struct SortKey {
    level: usize,
    position: usize,
    order: SortOrder,
}

impl SortKey {
    fn new(level: usize, position: usize, order: SortOrder) -> Self {
        Self {
            level,
            position,
            order,
        }
    }
}

/// An in-memory relational store that executes joining queries.
pub struct MemoryBackend {
    tables: HashMap<String, Table>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Registers a source type. Re-registering a name is an error.
    pub fn register(&mut self, source: SourceType) -> Result<()> {
        if self.tables.contains_key(source.name()) {
            return Err(QueryError::backend(format!(
                "Source type {} is already registered",
                source.name()
            )));
        }
        let layout = RowLayout::from_source(&source);
        self.tables.insert(
            source.name().to_string(),
            Table {
                source,
                layout,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    /// Validates and stores one row, returning its id.
    pub fn insert(&mut self, type_name: &str, values: Vec<Value>) -> Result<RowId> {
        let table = self
            .tables
            .get_mut(type_name)
            .ok_or_else(|| QueryError::UnknownType(type_name.to_string()))?;
        let row = Row::create(values);
        table.source.validate_row(&row)?;
        let id = row.id();
        table.rows.push(row);
        Ok(id)
    }

    /// Validates and stores rows in order.
    pub fn insert_all<I>(&mut self, type_name: &str, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        for values in rows {
            self.insert(type_name, values)?;
        }
        Ok(())
    }

    /// Returns a registered source type.
    pub fn source(&self, type_name: &str) -> Result<&SourceType> {
        self.table(type_name).map(|t| &t.source)
    }

    /// Returns the number of stored rows of a source type.
    pub fn row_count(&self, type_name: &str) -> Result<usize> {
        self.table(type_name).map(|t| t.rows.len())
    }

    /// Returns the number of cursors handed out and not yet closed or dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(AtomicOrdering::SeqCst)
    }

    fn table(&self, type_name: &str) -> Result<&Table> {
        self.tables
            .get(type_name)
            .ok_or_else(|| QueryError::UnknownType(type_name.to_string()))
    }

    /// Builds row-index chains, one entry per level, from the queried source
    /// out to the outermost joined source.
    fn join_chains(&self, query: &Query, levels: &[&Table]) -> Result<Vec<Vec<usize>>> {
        let mut chains: Vec<Vec<usize>> = (0..levels[0].rows.len()).map(|i| vec![i]).collect();
        for (step, join) in query.joins().iter().enumerate() {
            let child = levels[step];
            let index = levels[step + 1].key_index(&join.parent_key)?;
            let mut joined = Vec::with_capacity(chains.len());
            for chain in chains {
                let key = join.child_key.eval(child.row_ref(chain[step]))?;
                let Some(key) = join_key(key) else { continue };
                if let Some(parents) = index.get(&key) {
                    for &parent in parents {
                        let mut extended = Vec::with_capacity(chain.len() + 1);
                        extended.extend_from_slice(&chain);
                        extended.push(parent);
                        joined.push(extended);
                    }
                }
            }
            chains = joined;
        }
        Ok(chains)
    }

    /// Sort keys from the outermost level inward, ending with the query's own sort.
    fn sort_keys(&self, query: &Query, levels: &[&Table]) -> Result<Vec<SortKey>> {
        let mut keys = Vec::new();
        for (step, join) in query.joins().iter().enumerate().rev() {
            let level = step + 1;
            let table = levels[level];
            table.sort_keys(level, &join.sort, &mut keys)?;
            for id in table.id_columns(&join.id_columns) {
                keys.push(SortKey::new(level, table.position(id)?, SortOrder::Asc));
            }
        }
        levels[0].sort_keys(0, query.sort(), &mut keys)?;
        Ok(keys)
    }

    /// Output column names and their (level, position) sources.
    fn projection(
        &self,
        query: &Query,
        levels: &[&Table],
    ) -> Result<(Vec<String>, Vec<(usize, usize)>)> {
        let target = levels[0];
        let mut names: Vec<String> = Vec::new();
        let mut sources = Vec::new();
        match query.properties() {
            Some(properties) => {
                for name in properties {
                    if names.contains(name) {
                        continue;
                    }
                    sources.push((0, target.position(name)?));
                    names.push(name.clone());
                }
            }
            None => {
                for (i, column) in target.layout.columns().iter().enumerate() {
                    sources.push((0, i));
                    names.push(column.clone());
                }
            }
        }
        for (step, join) in query.joins().iter().enumerate() {
            let parent = levels[step + 1];
            for (i, id) in parent.id_columns(&join.id_columns).iter().enumerate() {
                sources.push((step + 1, parent.position(id)?));
                names.push(foreign_id_column(step, i));
            }
        }
        if !query.has_id_column() {
            for (i, pk) in target.source.primary_key().iter().enumerate() {
                sources.push((0, target.position(pk)?));
                names.push(primary_key_column(i));
            }
        }
        Ok((names, sources))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_chains(keys: &[SortKey], levels: &[&Table], a: &[usize], b: &[usize]) -> Ordering {
    for key in keys {
        let table = levels[key.level];
        let a_val = table.rows[a[key.level]].get(key.position);
        let b_val = table.rows[b[key.level]].get(key.position);
        let cmp = match (a_val, b_val) {
            (Some(av), Some(bv)) => av.cmp(bv),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if cmp != Ordering::Equal {
            return match key.order {
                SortOrder::Asc => cmp,
                SortOrder::Desc => cmp.reverse(),
            };
        }
    }
    Ordering::Equal
}

impl QueryExecutor for MemoryBackend {
    fn execute(&self, query: &Query) -> Result<Box<dyn RowCursor>> {
        if query.is_joining() && query.uses_natural_order() {
            return Err(QueryError::NaturalOrderInJoin);
        }
        let mut levels = Vec::with_capacity(query.joins().len() + 1);
        levels.push(self.table(query.type_name())?);
        for join in query.joins() {
            levels.push(self.table(&join.parent_type)?);
        }

        let mut chains = self.join_chains(query, &levels)?;

        let root = levels.len() - 1;
        if !query.filter().is_include() {
            let mut kept = Vec::with_capacity(chains.len());
            for chain in chains {
                if query.filter().evaluate(levels[root].row_ref(chain[root]))? {
                    kept.push(chain);
                }
            }
            chains = kept;
        }

        if query.sort().iter().any(|s| matches!(s, SortBy::Reverse)) {
            chains.reverse();
        }
        let keys = self.sort_keys(query, &levels)?;
        chains.sort_by(|a, b| compare_chains(&keys, &levels, a, b));

        let (names, sources) = self.projection(query, &levels)?;
        let joining = query.is_joining();
        let rows: Vec<Row> = chains
            .iter()
            .map(|chain| {
                let values = sources
                    .iter()
                    .map(|&(level, position)| {
                        levels[level].rows[chain[level]]
                            .get(position)
                            .cloned()
                            .unwrap_or(Value::Null)
                    })
                    .collect();
                // A child joined under several parents yields several rows.
                let id = if joining { next_row_id() } else { levels[0].rows[chain[0]].id() };
                Row::new(id, values)
            })
            .collect();

        debug!(
            type_name = query.type_name(),
            joins = query.joins().len(),
            rows = rows.len(),
            reprojection = ?query.reprojection(),
            resolve = ?query.resolve(),
            "executed query"
        );

        let cursor = MemoryCursor::new(Arc::new(RowLayout::new(names)), rows)
            .tracked(Arc::clone(&self.open_cursors));
        if query.is_joining() {
            Ok(Box::new(cursor.joining()))
        } else {
            Ok(Box::new(cursor))
        }
    }

    fn primary_key(&self, type_name: &str) -> Result<Vec<String>> {
        Ok(self.table(type_name)?.source.primary_key().to_vec())
    }
}
