//! Forward-only row cursors.

use crate::error::{QueryError, Result};
use crate::layout::SharedLayout;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tessera_core::Row;

/// A forward-only stream of rows with one row of lookahead.
///
/// Cursors never seek backwards. Reads after `close` fail with
/// [`QueryError::Closed`]; closing twice is a no-op.
pub trait RowCursor: Send {
    /// Returns the layout naming the columns of every row.
    fn layout(&self) -> &SharedLayout;

    /// Returns true if another row is available.
    fn has_next(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_some())
    }

    /// Returns the next row without consuming it.
    fn peek(&mut self) -> Result<Option<&Row>>;

    /// Consumes and returns the next row.
    fn next_row(&mut self) -> Result<Row>;

    /// Consumes the next row without materializing it for the caller.
    fn skip_row(&mut self) -> Result<()> {
        self.next_row().map(|_| ())
    }

    /// Releases the cursor's resources.
    fn close(&mut self) -> Result<()>;

    /// Returns true once the cursor has been closed.
    fn is_closed(&self) -> bool;

    /// Returns true if the cursor was produced by a joining query and
    /// carries the synthetic foreign-id columns.
    fn is_joining(&self) -> bool;
}

/// A cursor over rows held in memory.
pub struct MemoryCursor {
    layout: SharedLayout,
    rows: VecDeque<Row>,
    joining: bool,
    closed: bool,
    open_cursors: Option<Arc<AtomicUsize>>,
}

impl MemoryCursor {
    /// Creates a non-joining cursor over the given rows.
    pub fn new(layout: SharedLayout, rows: Vec<Row>) -> Self {
        Self {
            layout,
            rows: rows.into(),
            joining: false,
            closed: false,
            open_cursors: None,
        }
    }

    /// Marks the cursor as the result of a joining query.
    pub fn joining(mut self) -> Self {
        self.joining = true;
        self
    }

    /// Registers the cursor with an open-cursor counter, released on close.
    pub fn tracked(mut self, open_cursors: Arc<AtomicUsize>) -> Self {
        open_cursors.fetch_add(1, Ordering::SeqCst);
        self.open_cursors = Some(open_cursors);
        self
    }

    /// Returns the number of rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(QueryError::Closed)
        } else {
            Ok(())
        }
    }

    fn release(&mut self) {
        if let Some(counter) = self.open_cursors.take() {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl RowCursor for MemoryCursor {
    fn layout(&self) -> &SharedLayout {
        &self.layout
    }

    fn peek(&mut self) -> Result<Option<&Row>> {
        self.check_open()?;
        Ok(self.rows.front())
    }

    fn next_row(&mut self) -> Result<Row> {
        self.check_open()?;
        self.rows.pop_front().ok_or(QueryError::Exhausted)
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.rows.clear();
            self.release();
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn is_joining(&self) -> bool {
        self.joining
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for MemoryCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCursor")
            .field("columns", &self.layout.columns())
            .field("remaining", &self.rows.len())
            .field("joining", &self.joining)
            .field("closed", &self.closed)
            .finish()
    }
}
