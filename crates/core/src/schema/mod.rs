//! Schema module for Tessera sources.
//!
//! A source type is the flat, relational shape a feature type mapping reads
//! from: an ordered list of columns plus the primary key used when a mapping
//! defines no identifier expression of its own.

mod column;
mod source;

pub use column::Column;
pub use source::{SourceType, SourceTypeBuilder};
