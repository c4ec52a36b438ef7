//! AST module for mapping expressions, row filters and sort orders.

mod expr;
mod filter;
mod sort;

pub use expr::Expr;
pub use filter::{CompareOp, Filter};
pub use sort::{SortBy, SortOrder};
