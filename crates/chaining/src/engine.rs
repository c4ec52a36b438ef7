//! The joining engine.
//!
//! An engine serves one nested attribute. A session is opened per caller
//! over the parent row stream produced by a base query. For every parent row
//! the caller asks for the rows of the nested type the row selects; the
//! engine opens a joining cursor for that type on first use and reads the
//! contiguous run matching the parent's key and identifiers. All cursors of
//! a session move forward together: whenever one cursor consumes a run, the
//! others discard theirs, and every accounted run is logged so that a cursor
//! opened later can catch up.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::feature::{Feature, FeatureAssembler};
use crate::mapping::{FeatureTypeMapping, MappingRegistry, NestedAttributeMapping};
use crate::matcher::{discard_run, take_run};
use crate::request::NestedRequest;
use crate::session::{CallerId, NestedCursor, Session, SkippedRun};
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tessera_core::{Row, Value};
use tessera_query::layout::SharedLayout;
use tessera_query::{
    foreign_id_column, Expr, JoinSpec, Query, QueryExecutor, ResolveHint, RowCursor, RowRef,
    SortBy,
};
use tracing::{debug, warn};

/// The parent context of a fetch: the join key and identifier values of the
/// current parent row, and the row itself for polymorphic type resolution.
#[derive(Clone, Debug)]
pub struct ParentRow<'a> {
    row: Option<RowRef<'a>>,
    key: Value,
    ids: Vec<Value>,
}

impl<'a> ParentRow<'a> {
    /// Creates a parent context from explicit key and identifier values.
    pub fn new(key: Value, ids: Vec<Value>) -> Self {
        Self { row: None, key, ids }
    }

    /// Attaches the parent row.
    pub fn with_row(mut self, row: RowRef<'a>) -> Self {
        self.row = Some(row);
        self
    }

    #[inline]
    pub fn key(&self) -> &Value {
        &self.key
    }

    #[inline]
    pub fn ids(&self) -> &[Value] {
        &self.ids
    }
}

/// Raw rows of one matched run.
#[derive(Clone, Debug)]
pub struct MatchedRows {
    nested_type: String,
    layout: SharedLayout,
    rows: Vec<Row>,
}

impl MatchedRows {
    /// The resolved nested type the rows belong to.
    #[inline]
    pub fn nested_type(&self) -> &str {
        &self.nested_type
    }

    #[inline]
    pub fn layout(&self) -> &SharedLayout {
        &self.layout
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows viewed through their layout.
    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |row| RowRef::new(&self.layout, row))
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

type SessionHandle = Arc<Mutex<Session>>;

/// Coordinates the nested cursors of one nested attribute for concurrent callers.
pub struct JoiningEngine {
    executor: Arc<dyn QueryExecutor>,
    registry: Arc<MappingRegistry>,
    nested: NestedAttributeMapping,
    config: EngineConfig,
    sessions: Mutex<HashMap<CallerId, SessionHandle>>,
}

impl JoiningEngine {
    /// Creates an engine with the default configuration.
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        registry: Arc<MappingRegistry>,
        nested: NestedAttributeMapping,
    ) -> Self {
        Self::with_config(executor, registry, nested, EngineConfig::default())
    }

    pub fn with_config(
        executor: Arc<dyn QueryExecutor>,
        registry: Arc<MappingRegistry>,
        nested: NestedAttributeMapping,
        config: EngineConfig,
    ) -> Self {
        Self {
            executor,
            registry,
            nested,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    /// The nested attribute this engine serves.
    #[inline]
    pub fn nested(&self) -> &NestedAttributeMapping {
        &self.nested
    }

    /// Opens a session for `caller` over the rows of `base_query`, whose
    /// features are described by `parent_mapping`.
    pub fn open(
        &self,
        caller: CallerId,
        base_query: Query,
        parent_mapping: &FeatureTypeMapping,
    ) -> Result<()> {
        if self.is_open(caller) {
            return Err(Error::SessionAlreadyOpen(caller));
        }
        let parent_ids = parent_mapping.id_columns(self.executor.as_ref())?;
        let session = Session::new(
            base_query,
            parent_mapping.clone(),
            parent_ids,
            self.config.key_comparison(),
        );
        match self.sessions.lock().entry(caller) {
            Entry::Occupied(_) => return Err(Error::SessionAlreadyOpen(caller)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(session)));
            }
        }
        debug!(%caller, parent = parent_mapping.name(), "opened session");
        Ok(())
    }

    /// Closes every cursor of the caller's session and removes it.
    ///
    /// Every cursor is closed even if an earlier one fails; the session is
    /// removed regardless and the first failure is returned.
    pub fn close(&self, caller: CallerId) -> Result<()> {
        let handle = self
            .sessions
            .lock()
            .remove(&caller)
            .ok_or(Error::SessionNotOpen(caller))?;
        let mut session = handle.lock();
        let mut first_error = None;
        for nested in session.cursors.iter_mut() {
            if let Err(err) = nested.cursor.close() {
                warn!(
                    %caller,
                    nested_type = %nested.type_name,
                    error = %err,
                    "failed to close nested cursor"
                );
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        let closed = session.cursors.len();
        session.cursors.clear();
        debug!(%caller, cursors = closed, "closed session");
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Returns true if a session is open for `caller`.
    pub fn is_open(&self, caller: CallerId) -> bool {
        self.sessions.lock().contains_key(&caller)
    }

    /// Builds the parent context of a row of the session's base query: the
    /// nested attribute's key and the parent mapping's identifier values.
    pub fn parent_row<'a>(&self, caller: CallerId, row: RowRef<'a>) -> Result<ParentRow<'a>> {
        let handle = self.session(caller)?;
        let session = handle.lock();
        let key = self.nested.source().eval(row)?;
        let ids = session.parent_mapping.id_values(row)?;
        Ok(ParentRow::new(key, ids).with_row(row))
    }

    /// Returns the features matching the parent, merging consecutive rows
    /// that share a feature id.
    pub fn fetch_features(
        &self,
        caller: CallerId,
        parent: &ParentRow<'_>,
        request: &NestedRequest,
    ) -> Result<Vec<Feature>> {
        let matched = self.fetch_rows(caller, parent, request)?;
        let mapping = self.registry.mapping(&matched.nested_type)?;
        FeatureAssembler::new(mapping, &matched.layout).assemble(&matched.rows)
    }

    /// Returns the raw rows matching the parent.
    pub fn fetch_rows(
        &self,
        caller: CallerId,
        parent: &ParentRow<'_>,
        request: &NestedRequest,
    ) -> Result<MatchedRows> {
        if self.nested.is_same_source() {
            return Err(Error::SameSource(self.nested.target_path().to_string()));
        }
        let handle = self.session(caller)?;
        let mut guard = handle.lock();
        let session = &mut *guard;

        let nested_type = self.nested.resolve_nested_type(parent.row)?;
        let index = match session.cursor_index(&nested_type) {
            Some(index) => index,
            None => self.open_cursor(session, &nested_type, request)?,
        };

        let cmp = self.config.key_comparison();
        let target = &mut session.cursors[index];
        let rows = take_run(target, &parent.key, &parent.ids, cmp)?;
        let layout = Arc::clone(target.cursor.layout());
        for (i, other) in session.cursors.iter_mut().enumerate() {
            if i != index {
                discard_run(other, &parent.key, &parent.ids, cmp)?;
            }
        }
        session.skipped.record(&parent.key, &parent.ids);

        Ok(MatchedRows {
            nested_type,
            layout,
            rows,
        })
    }

    /// Discards the `(key, ids)` run on every open cursor and logs it. A run
    /// already logged is left alone.
    pub fn skip_all(&self, caller: CallerId, key: &Value, ids: &[Value]) -> Result<()> {
        let handle = self.session(caller)?;
        let mut guard = handle.lock();
        let session = &mut *guard;
        if session.skipped.contains(key, ids) {
            return Ok(());
        }
        let cmp = self.config.key_comparison();
        for nested in session.cursors.iter_mut() {
            discard_run(nested, key, ids, cmp)?;
        }
        session.skipped.record(key, ids);
        Ok(())
    }

    /// Returns the query the caller's cursor for `nested_type` was opened
    /// with, if it has been opened. The query can serve as the base query of
    /// a session one level deeper.
    pub fn compiled_query(&self, caller: CallerId, nested_type: &str) -> Result<Option<Query>> {
        let handle = self.session(caller)?;
        let session = handle.lock();
        Ok(session
            .cursor_index(nested_type)
            .map(|i| session.cursors[i].query.clone()))
    }

    /// Returns the number of runs in the caller's skip log.
    pub fn skipped_run_count(&self, caller: CallerId) -> Result<usize> {
        Ok(self.session(caller)?.lock().skipped.len())
    }

    /// Returns a copy of the caller's skip log, oldest run first.
    pub fn skipped_runs(&self, caller: CallerId) -> Result<Vec<SkippedRun>> {
        Ok(self.session(caller)?.lock().skipped.runs().to_vec())
    }

    /// Returns the number of nested cursors open in the caller's session.
    pub fn open_cursor_count(&self, caller: CallerId) -> Result<usize> {
        Ok(self.session(caller)?.lock().cursors.len())
    }

    fn session(&self, caller: CallerId) -> Result<SessionHandle> {
        self.sessions
            .lock()
            .get(&caller)
            .cloned()
            .ok_or(Error::SessionNotOpen(caller))
    }

    /// Opens, registers and catches up the cursor of a nested type.
    fn open_cursor(
        &self,
        session: &mut Session,
        nested_type: &str,
        request: &NestedRequest,
    ) -> Result<usize> {
        let mapping = self.registry.mapping(nested_type)?;
        let path = self.nested.nested_target_path();
        let child_key = mapping
            .attribute(path)
            .ok_or_else(|| Error::missing_attribute_mapping(nested_type, path))?
            .source()
            .clone();

        let query = self.nested_query(session, mapping, &child_key, request)?;
        let mut cursor = self.executor.execute(&query)?;
        if !cursor.is_joining() {
            release(cursor.as_mut(), nested_type);
            return Err(Error::NonJoiningCursor(nested_type.to_string()));
        }

        let mut foreign_ids = Vec::new();
        for (level, join) in query.joins().iter().enumerate() {
            for i in 0..join.id_columns.len() {
                let column = foreign_id_column(level, i);
                match cursor.layout().position(&column) {
                    Some(position) => foreign_ids.push(position),
                    None => {
                        release(cursor.as_mut(), nested_type);
                        return Err(Error::missing_column(nested_type, column));
                    }
                }
            }
        }
        debug!(
            nested_type,
            source = query.type_name(),
            joins = query.joins().len(),
            "opened nested cursor"
        );

        session.cursors.push(NestedCursor {
            type_name: nested_type.to_string(),
            cursor,
            key: child_key,
            foreign_ids,
            query,
        });
        let index = session.cursors.len() - 1;

        let cmp = self.config.key_comparison();
        let Session { cursors, skipped, .. } = session;
        for run in skipped.runs() {
            discard_run(&mut cursors[index], &run.key, &run.ids, cmp)?;
        }
        Ok(index)
    }

    /// Builds the joining query for a nested type one level below the
    /// session's base query.
    fn nested_query(
        &self,
        session: &Session,
        mapping: &FeatureTypeMapping,
        child_key: &Expr,
        request: &NestedRequest,
    ) -> Result<Query> {
        let base = &session.base_query;

        let mut joins = Vec::with_capacity(base.joins().len() + 1);
        for join in base.joins() {
            let mut join = join.clone();
            if join.id_columns.is_empty() {
                join.id_columns = self.executor.primary_key(&join.parent_type)?;
            }
            joins.push(join);
        }

        let properties = match mapping
            .source_columns(request.properties(), request.include_mandatory())?
        {
            Some(mut columns) => {
                for name in child_key.attribute_names() {
                    if !columns.contains(&name) {
                        columns.push(name);
                    }
                }
                Some(columns)
            }
            None => None,
        };

        let resolve = if request.resolve_depth() > 0 {
            ResolveHint::Depth {
                depth: request.resolve_depth(),
                timeout: request
                    .resolve_timeout()
                    .or(self.config.default_resolve_timeout()),
            }
        } else {
            ResolveHint::Disabled
        };

        let sort = if mapping.has_id_column() {
            mapping
                .id_expression()
                .attribute_names()
                .into_iter()
                .map(SortBy::asc)
                .collect()
        } else {
            Vec::new()
        };

        let mut query = Query::new(mapping.source_type())
            .with_properties(properties)
            .with_filter(base.filter().clone())
            .with_sort(sort)
            .with_joins(joins)
            .with_reprojection(request.reprojection().map(str::to_string))
            .with_resolve(resolve)
            .with_id_column(mapping.has_id_column());
        query.prepend_join(
            JoinSpec::new(base.type_name(), self.nested.source().clone(), child_key.clone())
                .with_ids(session.parent_ids.clone())
                .with_sort(base.sort().to_vec()),
        );
        Ok(query)
    }
}

/// Closes a cursor that will not be registered.
fn release(cursor: &mut dyn RowCursor, nested_type: &str) {
    if let Err(err) = cursor.close() {
        warn!(nested_type, error = %err, "failed to close rejected cursor");
    }
}

impl std::fmt::Debug for JoiningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoiningEngine")
            .field("nested", &self.nested.target_path())
            .field("config", &self.config)
            .field("sessions", &self.sessions.lock().len())
            .finish()
    }
}
