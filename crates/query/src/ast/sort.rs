//! Sort specifications.

use std::fmt;

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One sort key of a query or join step.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SortBy {
    /// Sort on a named column.
    Property { name: String, order: SortOrder },
    /// Storage order.
    Natural,
    /// Reverse storage order.
    Reverse,
}

impl SortBy {
    /// Ascending sort on a column.
    pub fn asc(name: impl Into<String>) -> Self {
        SortBy::Property {
            name: name.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on a column.
    pub fn desc(name: impl Into<String>) -> Self {
        SortBy::Property {
            name: name.into(),
            order: SortOrder::Desc,
        }
    }

    /// Returns true for natural or reverse storage order.
    #[inline]
    pub fn is_natural(&self) -> bool {
        matches!(self, SortBy::Natural | SortBy::Reverse)
    }

    /// Returns the sorted column name, if any.
    pub fn property_name(&self) -> Option<&str> {
        match self {
            SortBy::Property { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Property { name, order: SortOrder::Asc } => write!(f, "{} ASC", name),
            SortBy::Property { name, order: SortOrder::Desc } => write!(f, "{} DESC", name),
            SortBy::Natural => f.write_str("NATURAL"),
            SortBy::Reverse => f.write_str("REVERSE"),
        }
    }
}
