//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tessera_chaining::{
    AttributeMapping, CallerId, FeatureTypeMapping, JoiningEngine, MappingRegistry,
    NestedAttributeMapping, NestedRequest,
};
use tessera_core::schema::SourceTypeBuilder;
use tessera_core::{DataType, Row, Value};
use tessera_query::layout::SharedLayout;
use tessera_query::{
    Expr, MemoryBackend, MemoryCursor, Query, QueryError, QueryExecutor, RowCursor, RowLayout,
    RowRef,
};

// ============================================================================
// Station network fixture
// ============================================================================

/// Networks own stations; stations own readings and visits. `kind` selects
/// the observation type of a station.
///
/// | station | network | kind    | readings   | visits   |
/// |---------|---------|---------|------------|----------|
/// | 1       | north   | Reading | 100, 101   | 500      |
/// | 2       | north   | Visit   |            | 501, 502 |
/// | 3       | south   | Reading | 102        |          |
/// | 4       | south   | Visit   | 103, 104   | 503      |
pub fn network_backend() -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    backend
        .register(
            SourceTypeBuilder::new("networks")
                .unwrap()
                .add_column("code", DataType::String)
                .unwrap()
                .add_column("region", DataType::String)
                .unwrap()
                .add_primary_key(&["code"])
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
    backend
        .register(
            SourceTypeBuilder::new("stations")
                .unwrap()
                .add_column("id", DataType::Int64)
                .unwrap()
                .add_column("network", DataType::String)
                .unwrap()
                .add_column("name", DataType::String)
                .unwrap()
                .add_column("kind", DataType::String)
                .unwrap()
                .add_primary_key(&["id"])
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
    backend
        .register(
            SourceTypeBuilder::new("readings")
                .unwrap()
                .add_column("rid", DataType::Int64)
                .unwrap()
                .add_column("station_id", DataType::Int64)
                .unwrap()
                .add_column("value", DataType::Float64)
                .unwrap()
                .add_column("unit", DataType::String)
                .unwrap()
                .add_primary_key(&["rid"])
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
    backend
        .register(
            SourceTypeBuilder::new("visits")
                .unwrap()
                .add_column("vid", DataType::Int64)
                .unwrap()
                .add_column("station_id", DataType::Int64)
                .unwrap()
                .add_column("engineer", DataType::String)
                .unwrap()
                .add_primary_key(&["vid"])
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();

    backend
        .insert_all(
            "networks",
            vec![
                vec!["north".into(), "N".into()],
                vec!["south".into(), "S".into()],
            ],
        )
        .unwrap();
    backend
        .insert_all(
            "stations",
            vec![
                vec![Value::Int64(3), "south".into(), "Kew".into(), "Reading".into()],
                vec![Value::Int64(1), "north".into(), "Leeds".into(), "Reading".into()],
                vec![Value::Int64(4), "south".into(), "Wisley".into(), "Visit".into()],
                vec![Value::Int64(2), "north".into(), "York".into(), "Visit".into()],
            ],
        )
        .unwrap();
    backend
        .insert_all(
            "readings",
            vec![
                reading(104, 4, 0.4),
                reading(100, 1, 1.0),
                reading(102, 3, 3.0),
                reading(101, 1, 1.5),
                reading(103, 4, 4.0),
            ],
        )
        .unwrap();
    backend
        .insert_all(
            "visits",
            vec![
                vec![Value::Int64(503), Value::Int64(4), "Ada".into()],
                vec![Value::Int64(500), Value::Int64(1), "Grace".into()],
                vec![Value::Int64(502), Value::Int64(2), "Ada".into()],
                vec![Value::Int64(501), Value::Int64(2), "Linus".into()],
            ],
        )
        .unwrap();
    backend
}

fn reading(rid: i64, station: i64, value: f64) -> Vec<Value> {
    vec![
        Value::Int64(rid),
        Value::Int64(station),
        Value::Float64(value),
        "mm".into(),
    ]
}

pub fn network_mapping() -> FeatureTypeMapping {
    FeatureTypeMapping::new("Network", "networks")
        .with_id(Expr::column("code"))
        .with_attribute(AttributeMapping::new("region", Expr::column("region")))
        .with_nested(stations_attribute())
}

pub fn station_mapping() -> FeatureTypeMapping {
    FeatureTypeMapping::new("Station", "stations")
        .with_id(Expr::column("id"))
        .with_attribute(AttributeMapping::new("name", Expr::column("name")))
        .with_attribute(AttributeMapping::new("network", Expr::column("network")))
        .with_nested(readings_attribute())
        .with_nested(visits_attribute())
        .with_nested(observations_attribute())
}

pub fn reading_mapping() -> FeatureTypeMapping {
    FeatureTypeMapping::new("Reading", "readings")
        .with_id(Expr::concat(vec![Expr::literal("reading."), Expr::column("rid")]))
        .with_attribute(AttributeMapping::new("station", Expr::column("station_id")))
        .with_attribute(AttributeMapping::new("value", Expr::column("value")))
        .with_attribute(AttributeMapping::new("unit", Expr::column("unit")).mandatory())
}

pub fn visit_mapping() -> FeatureTypeMapping {
    FeatureTypeMapping::new("Visit", "visits")
        .with_id(Expr::column("vid"))
        .with_attribute(AttributeMapping::new("station", Expr::column("station_id")))
        .with_attribute(AttributeMapping::new("engineer", Expr::column("engineer")))
}

pub fn stations_attribute() -> NestedAttributeMapping {
    NestedAttributeMapping::new("stations", Expr::column("code"), "Station", "network")
}

pub fn readings_attribute() -> NestedAttributeMapping {
    NestedAttributeMapping::new("readings", Expr::column("id"), "Reading", "station")
}

pub fn visits_attribute() -> NestedAttributeMapping {
    NestedAttributeMapping::new("visits", Expr::column("id"), "Visit", "station")
}

/// Readings or visits, as selected by the station's `kind`.
pub fn observations_attribute() -> NestedAttributeMapping {
    NestedAttributeMapping::polymorphic(
        "observations",
        Expr::column("id"),
        Expr::column("kind"),
        "station",
    )
}

pub fn registry() -> Arc<MappingRegistry> {
    Arc::new(
        MappingRegistry::new()
            .with(network_mapping())
            .with(station_mapping())
            .with(reading_mapping())
            .with(visit_mapping()),
    )
}

/// An engine serving `nested` over the station network.
pub fn network_engine(nested: NestedAttributeMapping) -> (Arc<MemoryBackend>, JoiningEngine) {
    let backend = Arc::new(network_backend());
    let engine = JoiningEngine::new(backend.clone(), registry(), nested);
    (backend, engine)
}

/// Reads every row of a cursor.
pub fn drain(cursor: &mut dyn RowCursor) -> (SharedLayout, Vec<Row>) {
    let layout = cursor.layout().clone();
    let mut rows = Vec::new();
    while cursor.has_next().unwrap() {
        rows.push(cursor.next_row().unwrap());
    }
    (layout, rows)
}

/// Reads the parent rows of a base query.
pub fn parent_rows(backend: &dyn QueryExecutor, query: &Query) -> (SharedLayout, Vec<Row>) {
    drain(backend.execute(query).unwrap().as_mut())
}

/// Fetches nested feature ids for every parent row of `query`.
pub fn fetch_all_ids(
    engine: &JoiningEngine,
    backend: &dyn QueryExecutor,
    caller: CallerId,
    query: &Query,
) -> Vec<Vec<String>> {
    let (layout, rows) = parent_rows(backend, query);
    rows.iter()
        .map(|row| {
            let parent = engine.parent_row(caller, RowRef::new(&layout, row)).unwrap();
            engine
                .fetch_features(caller, &parent, &NestedRequest::new())
                .unwrap()
                .iter()
                .map(|f| f.id().to_string())
                .collect()
        })
        .collect()
}

// ============================================================================
// Scripted executor
// ============================================================================

/// Canned result of one query.
#[derive(Clone, Debug)]
pub struct Script {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub joining: bool,
    pub fail_close: bool,
}

impl Script {
    pub fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            joining: true,
            fail_close: false,
        }
    }

    pub fn non_joining(mut self) -> Self {
        self.joining = false;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

/// Cursor whose close can be made to fail.
pub struct ScriptedCursor {
    inner: MemoryCursor,
    fail_close: bool,
    closes: Arc<AtomicUsize>,
}

impl RowCursor for ScriptedCursor {
    fn layout(&self) -> &SharedLayout {
        self.inner.layout()
    }

    fn peek(&mut self) -> tessera_query::Result<Option<&Row>> {
        self.inner.peek()
    }

    fn next_row(&mut self) -> tessera_query::Result<Row> {
        self.inner.next_row()
    }

    fn close(&mut self) -> tessera_query::Result<()> {
        self.inner.close()?;
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            Err(QueryError::backend("connection reset while closing"))
        } else {
            Ok(())
        }
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn is_joining(&self) -> bool {
        self.inner.is_joining()
    }
}

/// Executor answering each source type from a one-shot script.
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<HashMap<String, Script>>,
    queries: Mutex<Vec<Query>>,
    closes: Arc<AtomicUsize>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, type_name: &str, script: Script) -> Self {
        self.scripts.lock().insert(type_name.to_string(), script);
        self
    }

    /// Number of cursor closes, failed or not.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().clone()
    }
}

impl QueryExecutor for ScriptedExecutor {
    fn execute(&self, query: &Query) -> tessera_query::Result<Box<dyn RowCursor>> {
        self.queries.lock().push(query.clone());
        let script = self
            .scripts
            .lock()
            .remove(query.type_name())
            .ok_or_else(|| QueryError::UnknownType(query.type_name().to_string()))?;
        let layout = Arc::new(RowLayout::new(script.columns));
        let rows = script
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| Row::new(i as u64, values))
            .collect();
        let mut inner = MemoryCursor::new(layout, rows);
        if script.joining {
            inner = inner.joining();
        }
        Ok(Box::new(ScriptedCursor {
            inner,
            fail_close: script.fail_close,
            closes: Arc::clone(&self.closes),
        }))
    }

    fn primary_key(&self, _type_name: &str) -> tessera_query::Result<Vec<String>> {
        Ok(vec!["id".to_string()])
    }
}

/// Parent stations keyed by `id`, identified by `code`.
pub fn scripted_station_mapping() -> FeatureTypeMapping {
    FeatureTypeMapping::new("Station", "stations").with_id(Expr::column("code"))
}

/// Nested readings joined on `fk`, identified by `rid`.
pub fn scripted_reading_mapping() -> FeatureTypeMapping {
    FeatureTypeMapping::new("Reading", "readings")
        .with_id(Expr::column("rid"))
        .with_attribute(AttributeMapping::new("station", Expr::column("fk")))
}

pub fn scripted_visit_mapping() -> FeatureTypeMapping {
    FeatureTypeMapping::new("Visit", "visits")
        .with_id(Expr::column("vid"))
        .with_attribute(AttributeMapping::new("station", Expr::column("fk")))
}

pub fn scripted_readings() -> NestedAttributeMapping {
    NestedAttributeMapping::new("readings", Expr::column("id"), "Reading", "station")
}

/// Selects readings or visits by the parent's `kind` column.
pub fn scripted_observations() -> NestedAttributeMapping {
    NestedAttributeMapping::polymorphic("observations", Expr::column("id"), Expr::column("kind"), "station")
}

/// Layout of the scripted parent rows used for polymorphic resolution.
pub fn scripted_parent_layout() -> RowLayout {
    RowLayout::new(vec!["code".into(), "kind".into()])
}

pub fn scripted_parent_row(code: &str, kind: &str) -> Row {
    Row::new(0, vec![code.into(), kind.into()])
}

pub fn scripted_engine(
    executor: Arc<ScriptedExecutor>,
    nested: NestedAttributeMapping,
) -> JoiningEngine {
    JoiningEngine::new(executor, scripted_registry(), nested)
}

pub fn scripted_registry() -> Arc<MappingRegistry> {
    Arc::new(
        MappingRegistry::new()
            .with(scripted_reading_mapping())
            .with(scripted_visit_mapping()),
    )
}

/// Rows of `(key, parent code, row id)` in the scripted nested layout.
pub fn keyed_rows(id_column: &str, rows: &[(i64, &str, &str)]) -> Script {
    Script::new(
        &[id_column, "fk", "FOREIGN_ID_0_0"],
        rows.iter()
            .map(|(key, code, id)| vec![(*id).into(), Value::Int64(*key), (*code).into()])
            .collect(),
    )
}

/// Parent context with an integer key and a single code identifier.
pub fn parent<'a>(key: i64, code: &str) -> tessera_chaining::ParentRow<'a> {
    tessera_chaining::ParentRow::new(Value::Int64(key), vec![code.into()])
}

// ============================================================================
// Recording executor
// ============================================================================

/// Wraps an executor and records every query it runs.
pub struct RecordingExecutor<E> {
    inner: E,
    queries: Mutex<Vec<Query>>,
}

impl<E: QueryExecutor> RecordingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().clone()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: QueryExecutor> QueryExecutor for RecordingExecutor<E> {
    fn execute(&self, query: &Query) -> tessera_query::Result<Box<dyn RowCursor>> {
        self.queries.lock().push(query.clone());
        self.inner.execute(query)
    }

    fn primary_key(&self, type_name: &str) -> tessera_query::Result<Vec<String>> {
        self.inner.primary_key(type_name)
    }
}
