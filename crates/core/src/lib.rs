//! Tessera Core - Core types shared by the Tessera joining engine.
//!
//! This crate provides the foundational types used to describe flat relational
//! sources that feed nested feature assembly:
//!
//! - `DataType`: Supported column types (Boolean, Int32, Int64, Float64, String, DateTime, Bytes)
//! - `Value`: Runtime cell values, with a canonical text form used for key comparison
//! - `Row`: A row of values with a unique identifier
//! - `schema`: Source type definitions (columns and primary key)
//! - `Error`: Error types for schema and value operations
//!
//! # Example
//!
//! ```rust
//! use tessera_core::{DataType, Value, Row};
//! use tessera_core::schema::SourceTypeBuilder;
//!
//! let stations = SourceTypeBuilder::new("stations")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::String)
//!     .unwrap()
//!     .add_primary_key(&["id"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let row = Row::new(1, vec![Value::Int64(1), Value::String("Kew".into())]);
//!
//! assert_eq!(stations.primary_key(), &["id"]);
//! assert_eq!(row.get(1), Some(&Value::String("Kew".into())));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod row;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use row::{next_row_id, Row, RowId};
pub use types::DataType;
pub use value::Value;
