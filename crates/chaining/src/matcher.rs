//! Run matching on nested cursors.

use crate::config::KeyComparison;
use crate::error::{Error, Result};
use crate::session::NestedCursor;
use std::sync::Arc;
use tessera_core::{Row, Value};
use tessera_query::RowRef;
use tracing::trace;

/// Returns true if the cursor's next row belongs to the `(key, ids)` run.
fn at_run(
    nested: &mut NestedCursor,
    key: &Value,
    ids: &[Value],
    cmp: KeyComparison,
) -> Result<bool> {
    if ids.len() != nested.foreign_ids.len() {
        return Err(Error::IdArity {
            type_name: nested.type_name.clone(),
            expected: nested.foreign_ids.len(),
            got: ids.len(),
        });
    }
    let layout = Arc::clone(nested.cursor.layout());
    let NestedCursor {
        cursor,
        key: key_expr,
        foreign_ids,
        ..
    } = nested;
    let Some(row) = cursor.peek()? else {
        return Ok(false);
    };
    let view = RowRef::new(&layout, row);
    if !cmp.keys_match(&key_expr.eval(view)?, key) {
        return Ok(false);
    }
    Ok(foreign_ids
        .iter()
        .zip(ids)
        .all(|(&position, id)| row.get(position).is_some_and(|v| cmp.ids_match(v, id))))
}

/// Consumes and returns the run at the cursor position.
pub(crate) fn take_run(
    nested: &mut NestedCursor,
    key: &Value,
    ids: &[Value],
    cmp: KeyComparison,
) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    while at_run(nested, key, ids, cmp)? {
        rows.push(nested.cursor.next_row()?);
    }
    trace!(nested_type = %nested.type_name, key = %key, matched = rows.len(), "matched run");
    Ok(rows)
}

/// Discards the run at the cursor position, returning the number of rows skipped.
pub(crate) fn discard_run(
    nested: &mut NestedCursor,
    key: &Value,
    ids: &[Value],
    cmp: KeyComparison,
) -> Result<usize> {
    let mut skipped = 0;
    while at_run(nested, key, ids, cmp)? {
        nested.cursor.skip_row()?;
        skipped += 1;
    }
    if skipped > 0 {
        trace!(nested_type = %nested.type_name, key = %key, skipped, "discarded run");
    }
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_query::{foreign_id_column, Expr, MemoryCursor, Query, RowCursor, RowLayout};

    fn nested(rows: &[(i64, &str)]) -> NestedCursor {
        let layout = Arc::new(RowLayout::new(vec!["fk".into(), foreign_id_column(0, 0)]));
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, (k, id))| Row::new(i as u64, vec![Value::Int64(*k), (*id).into()]))
            .collect();
        NestedCursor {
            type_name: "Reading".into(),
            cursor: Box::new(MemoryCursor::new(layout, rows).joining()),
            key: Expr::column("fk"),
            foreign_ids: vec![1],
            query: Query::new("readings"),
        }
    }

    #[test]
    fn test_take_run_stops_at_id_change() {
        let mut c = nested(&[(1, "A"), (1, "A"), (1, "B"), (2, "A")]);
        let cmp = KeyComparison::Text;
        let a: Vec<Value> = vec!["A".into()];
        let b: Vec<Value> = vec!["B".into()];
        assert_eq!(take_run(&mut c, &Value::Int64(1), &a, cmp).unwrap().len(), 2);
        assert_eq!(take_run(&mut c, &Value::Int64(1), &b, cmp).unwrap().len(), 1);
        assert_eq!(take_run(&mut c, &Value::Int32(2), &a, cmp).unwrap().len(), 1);
        assert!(!c.cursor.has_next().unwrap());
    }

    #[test]
    fn test_mismatch_consumes_nothing() {
        let mut c = nested(&[(2, "A")]);
        let ids: Vec<Value> = vec!["A".into()];
        assert!(take_run(&mut c, &Value::Int64(1), &ids, KeyComparison::Text).unwrap().is_empty());
        assert_eq!(discard_run(&mut c, &Value::Int64(1), &ids, KeyComparison::Text).unwrap(), 0);
        assert!(c.cursor.has_next().unwrap());
    }

    #[test]
    fn test_id_arity_checked() {
        let mut c = nested(&[(1, "A")]);
        let err = take_run(&mut c, &Value::Int64(1), &[], KeyComparison::Text).unwrap_err();
        assert!(matches!(err, Error::IdArity { expected: 1, got: 0, .. }));
    }
}
