//! Row filter definitions.

use crate::ast::expr::Expr;
use crate::error::Result;
use crate::layout::RowRef;
use core::cmp::Ordering;

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// A boolean filter over rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Filter {
    /// Accepts every row.
    #[default]
    Include,
    /// Rejects every row.
    Exclude,
    /// Compares two expressions. Comparisons involving null are false.
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    /// True when the expression evaluates to null.
    IsNull(Expr),
    /// Conjunction.
    And(Vec<Filter>),
    /// Disjunction.
    Or(Vec<Filter>),
    /// Negation.
    Not(Box<Filter>),
}

impl Filter {
    /// Creates a comparison filter.
    pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Self {
        Filter::Compare { left, op, right }
    }

    /// Creates an equality filter.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::compare(left, CompareOp::Eq, right)
    }

    /// Creates a less-than filter.
    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::compare(left, CompareOp::Lt, right)
    }

    /// Creates a greater-than filter.
    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::compare(left, CompareOp::Gt, right)
    }

    /// Creates a negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    /// Combines two filters with AND, dropping `Include` operands.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Include, f) | (f, Filter::Include) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (l, r) => Filter::And(vec![l, r]),
        }
    }

    /// Returns true if this filter accepts every row.
    #[inline]
    pub fn is_include(&self) -> bool {
        matches!(self, Filter::Include)
    }

    /// Evaluates the filter against a row.
    pub fn evaluate(&self, row: RowRef<'_>) -> Result<bool> {
        match self {
            Filter::Include => Ok(true),
            Filter::Exclude => Ok(false),
            Filter::Compare { left, op, right } => {
                let l = left.eval(row)?;
                let r = right.eval(row)?;
                if l.is_null() || r.is_null() {
                    return Ok(false);
                }
                Ok(op.accepts(l.cmp(&r)))
            }
            Filter::IsNull(expr) => Ok(expr.eval(row)?.is_null()),
            Filter::And(filters) => {
                for f in filters {
                    if !f.evaluate(row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(filters) => {
                for f in filters {
                    if f.evaluate(row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(inner) => Ok(!inner.evaluate(row)?),
        }
    }

    /// Returns the column names this filter reads, in first-use order.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_attributes(&mut names);
        names
    }

    fn collect_attributes(&self, names: &mut Vec<String>) {
        match self {
            Filter::Include | Filter::Exclude => {}
            Filter::Compare { left, right, .. } => {
                left.collect_attributes(names);
                right.collect_attributes(names);
            }
            Filter::IsNull(expr) => expr.collect_attributes(names),
            Filter::And(filters) | Filter::Or(filters) => {
                for f in filters {
                    f.collect_attributes(names);
                }
            }
            Filter::Not(inner) => inner.collect_attributes(names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RowLayout;
    use tessera_core::{Row, Value};

    fn eval(filter: &Filter, values: Vec<Value>) -> bool {
        let layout = RowLayout::new(vec!["id".into(), "elevation".into()]);
        let row = Row::new(0, values);
        filter.evaluate(RowRef::new(&layout, &row)).unwrap()
    }

    #[test]
    fn test_compare_ops() {
        let high = Filter::gt(Expr::column("elevation"), Expr::literal(100.0));
        assert!(eval(&high, vec![Value::Int64(1), Value::Float64(250.0)]));
        assert!(!eval(&high, vec![Value::Int64(1), Value::Float64(50.0)]));
        // Cross-width numeric comparison.
        let id = Filter::eq(Expr::column("id"), Expr::literal(1i32));
        assert!(eval(&id, vec![Value::Int64(1), Value::Null]));
    }

    #[test]
    fn test_null_comparisons_are_false() {
        let high = Filter::gt(Expr::column("elevation"), Expr::literal(100.0));
        assert!(!eval(&high, vec![Value::Int64(1), Value::Null]));
        let not_null = Filter::not(Filter::IsNull(Expr::column("elevation")));
        assert!(!eval(&not_null, vec![Value::Int64(1), Value::Null]));
    }

    #[test]
    fn test_logical_combinators() {
        let f = Filter::Or(vec![
            Filter::eq(Expr::column("id"), Expr::literal(1i64)),
            Filter::eq(Expr::column("id"), Expr::literal(2i64)),
        ]);
        assert!(eval(&f, vec![Value::Int64(2), Value::Null]));
        assert!(!eval(&f, vec![Value::Int64(3), Value::Null]));
        assert!(!eval(&Filter::Exclude, vec![Value::Int64(1), Value::Null]));
    }

    #[test]
    fn test_and_drops_include() {
        let f = Filter::eq(Expr::column("id"), Expr::literal(1i64));
        assert_eq!(Filter::Include.and(f.clone()), f);
        let both = f.clone().and(Filter::IsNull(Expr::column("elevation")));
        assert!(matches!(both, Filter::And(ref v) if v.len() == 2));
    }

    #[test]
    fn test_attribute_names() {
        let f = Filter::eq(Expr::column("id"), Expr::literal(1i64))
            .and(Filter::IsNull(Expr::column("elevation")))
            .and(Filter::lt(Expr::column("id"), Expr::literal(9i64)));
        assert_eq!(f.attribute_names(), vec!["id".to_string(), "elevation".to_string()]);
    }
}
