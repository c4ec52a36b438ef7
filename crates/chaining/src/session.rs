//! Per-caller session state.

use crate::config::KeyComparison;
use crate::mapping::FeatureTypeMapping;
use hashbrown::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tessera_core::Value;
use tessera_query::{Expr, Query, RowCursor};

static NEXT_CALLER_ID: AtomicU64 = AtomicU64::new(1);

/// Token identifying the caller that owns a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallerId(u64);

impl CallerId {
    /// Allocates a process-unique caller id.
    pub fn next() -> Self {
        CallerId(NEXT_CALLER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps an externally managed id.
    pub const fn new(id: u64) -> Self {
        CallerId(id)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caller#{}", self.0)
    }
}

/// A `(key, ids)` run already accounted for in a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedRun {
    pub key: Value,
    pub ids: Vec<Value>,
}

/// Append-only log of accounted runs, free of duplicates.
///
/// Two runs are the same entry when the engine's key comparison would
/// match them, so the fingerprint follows that comparison.
#[derive(Debug, Default)]
pub(crate) struct SkipLog {
    comparison: KeyComparison,
    runs: Vec<SkippedRun>,
    seen: HashSet<String>,
}

impl SkipLog {
    pub(crate) fn new(comparison: KeyComparison) -> Self {
        Self {
            comparison,
            ..Self::default()
        }
    }

    fn fingerprint(&self, key: &Value, ids: &[Value]) -> String {
        let mut out = self.field(key);
        for id in ids {
            out.push('\u{1f}');
            out.push_str(&self.field(id));
        }
        out
    }

    fn field(&self, value: &Value) -> String {
        match self.comparison {
            KeyComparison::Text => value.canonical_text(),
            KeyComparison::Typed => typed_text(value),
        }
    }

    pub(crate) fn contains(&self, key: &Value, ids: &[Value]) -> bool {
        self.seen.contains(&self.fingerprint(key, ids))
    }

    /// Appends a run unless it is already logged. Returns true if appended.
    pub(crate) fn record(&mut self, key: &Value, ids: &[Value]) -> bool {
        if !self.seen.insert(self.fingerprint(key, ids)) {
            return false;
        }
        self.runs.push(SkippedRun {
            key: key.clone(),
            ids: ids.to_vec(),
        });
        true
    }

    pub(crate) fn runs(&self) -> &[SkippedRun] {
        &self.runs
    }

    pub(crate) fn len(&self) -> usize {
        self.runs.len()
    }
}

/// Type-tagged text of a value. Numbers equal in magnitude share a tag and
/// text whatever their width.
fn typed_text(value: &Value) -> String {
    match value {
        Value::Null => "n".into(),
        Value::Boolean(b) => format!("b{}", b),
        Value::Int32(i) => format!("i{}", i),
        Value::Int64(i) => format!("i{}", i),
        Value::Float64(v) if *v > -1e15 && *v < 1e15 && (*v as i64) as f64 == *v => {
            format!("i{}", *v as i64)
        }
        Value::Float64(v) if v.is_nan() => "fNaN".into(),
        Value::Float64(v) => format!("f{}", v),
        Value::String(s) => format!("s{}", s),
        Value::DateTime(ms) => format!("d{}", ms),
        Value::Bytes(_) => format!("x{}", value),
    }
}

/// A live cursor over the rows of one nested type.
pub(crate) struct NestedCursor {
    pub(crate) type_name: String,
    pub(crate) cursor: Box<dyn RowCursor>,
    /// Join key expression evaluated on the cursor's rows.
    pub(crate) key: Expr,
    /// Positions of the foreign-id columns, level by level.
    pub(crate) foreign_ids: Vec<usize>,
    pub(crate) query: Query,
}

/// Open cursors and skip log of one caller.
pub(crate) struct Session {
    pub(crate) base_query: Query,
    pub(crate) parent_mapping: FeatureTypeMapping,
    /// Identifier columns of the parent mapping.
    pub(crate) parent_ids: Vec<String>,
    pub(crate) cursors: Vec<NestedCursor>,
    pub(crate) skipped: SkipLog,
}

impl Session {
    pub(crate) fn new(
        base_query: Query,
        parent_mapping: FeatureTypeMapping,
        parent_ids: Vec<String>,
        comparison: KeyComparison,
    ) -> Self {
        Self {
            base_query,
            parent_mapping,
            parent_ids,
            cursors: Vec::new(),
            skipped: SkipLog::new(comparison),
        }
    }

    pub(crate) fn cursor_index(&self, type_name: &str) -> Option<usize> {
        self.cursors.iter().position(|c| c.type_name == type_name)
    }
}
