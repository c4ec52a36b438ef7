//! Tessera Query - Joining queries and streaming row cursors.
//!
//! This crate provides the query-side contracts of the joining engine:
//!
//! - `ast`: Expressions (with attribute extraction), row filters and sort orders
//! - `join`: `JoinSpec`, one step of a join chain
//! - `query`: `Query`, a (possibly joining) query with projection, filter, sort and hints
//! - `layout`: Named row layouts and the synthetic `FOREIGN_ID_<i>_<j>` / `PRIMARY_KEY_<j>` columns
//! - `cursor`: The forward-only `RowCursor` contract and an in-memory cursor
//! - `executor`: The `QueryExecutor` collaborator trait
//! - `backend`: A reference in-memory backend able to execute joining queries

pub mod ast;
pub mod backend;
pub mod cursor;
mod error;
pub mod executor;
pub mod join;
pub mod layout;
pub mod query;

pub use ast::{CompareOp, Expr, Filter, SortBy, SortOrder};
pub use backend::MemoryBackend;
pub use cursor::{MemoryCursor, RowCursor};
pub use error::{QueryError, Result};
pub use executor::QueryExecutor;
pub use join::JoinSpec;
pub use layout::{foreign_id_column, primary_key_column, RowLayout, RowRef, FOREIGN_ID, PRIMARY_KEY};
pub use query::{Query, ResolveHint};
