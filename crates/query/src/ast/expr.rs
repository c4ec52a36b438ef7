//! Expression AST definitions.
//!
//! Mapping expressions are evaluated against one row at a time. They are used
//! for join keys, identifier expressions, attribute sources and the polymorphic
//! nested type selector.

use crate::error::{QueryError, Result};
use crate::layout::RowRef;
use std::fmt;
use tessera_core::Value;

/// Expression AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// The unset expression. Evaluates to null and references no attributes.
    Nil,
    /// Column reference by name.
    Column(String),
    /// Literal value.
    Literal(Value),
    /// String concatenation of the canonical text of each argument.
    Concat(Vec<Expr>),
}

impl Expr {
    /// Creates a column reference expression.
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    /// Creates a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Creates a concatenation expression.
    pub fn concat(args: Vec<Expr>) -> Self {
        Expr::Concat(args)
    }

    /// Returns true for the unset expression.
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Expr::Nil)
    }

    /// Returns true for a literal expression.
    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    /// Returns the column names this expression reads, in first-use order
    /// and without duplicates.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_attributes(&mut names);
        names
    }

    pub(crate) fn collect_attributes(&self, names: &mut Vec<String>) {
        match self {
            Expr::Nil | Expr::Literal(_) => {}
            Expr::Column(name) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
            Expr::Concat(args) => {
                for arg in args {
                    arg.collect_attributes(names);
                }
            }
        }
    }

    /// Evaluates the expression against a row.
    pub fn eval(&self, row: RowRef<'_>) -> Result<Value> {
        match self {
            Expr::Nil => Ok(Value::Null),
            Expr::Column(name) => row
                .get(name)
                .cloned()
                .ok_or_else(|| QueryError::column_not_found("row layout", name.as_str())),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Concat(args) => {
                let mut out = String::new();
                for arg in args {
                    let value = arg.eval(row)?;
                    if !value.is_null() {
                        out.push_str(&value.canonical_text());
                    }
                }
                Ok(Value::String(out))
            }
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nil => f.write_str("NIL"),
            Expr::Column(name) => f.write_str(name),
            Expr::Literal(value) => write!(f, "'{}'", value),
            Expr::Concat(args) => {
                f.write_str("concat(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RowLayout;
    use tessera_core::Row;

    fn station() -> (RowLayout, Row) {
        let layout = RowLayout::new(vec!["id".into(), "code".into(), "name".into()]);
        let row = Row::new(1, vec![Value::Int64(7), "ST".into(), Value::Null]);
        (layout, row)
    }

    #[test]
    fn test_eval_column_and_literal() {
        let (layout, row) = station();
        let view = RowRef::new(&layout, &row);
        assert_eq!(Expr::column("id").eval(view).unwrap(), Value::Int64(7));
        assert_eq!(Expr::literal("x").eval(view).unwrap(), Value::String("x".into()));
        assert_eq!(Expr::Nil.eval(view).unwrap(), Value::Null);
    }

    #[test]
    fn test_eval_missing_column() {
        let (layout, row) = station();
        let err = Expr::column("elevation").eval(RowRef::new(&layout, &row)).unwrap_err();
        assert!(matches!(err, QueryError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_eval_concat_skips_nulls() {
        let (layout, row) = station();
        let expr = Expr::concat(vec![
            Expr::column("code"),
            Expr::literal("."),
            Expr::column("id"),
            Expr::column("name"),
        ]);
        assert_eq!(
            expr.eval(RowRef::new(&layout, &row)).unwrap(),
            Value::String("ST.7".into())
        );
    }

    #[test]
    fn test_attribute_names_dedup_in_order() {
        let expr = Expr::concat(vec![
            Expr::column("code"),
            Expr::literal("-"),
            Expr::column("id"),
            Expr::column("code"),
        ]);
        assert_eq!(expr.attribute_names(), vec!["code".to_string(), "id".to_string()]);
        assert!(Expr::Nil.attribute_names().is_empty());
        assert!(Expr::literal(1i64).attribute_names().is_empty());
    }

    #[test]
    fn test_display() {
        let expr = Expr::concat(vec![Expr::column("code"), Expr::literal(1i64)]);
        assert_eq!(expr.to_string(), "concat(code, '1')");
    }
}
