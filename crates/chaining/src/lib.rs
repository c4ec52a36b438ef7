//! Tessera Chaining - Nested features assembled from joined row streams.
//!
//! A parent feature stream and the streams of its nested types are read in
//! lockstep. One `JoiningEngine` serves one nested attribute; each nested
//! type the attribute can select gets one joining cursor per caller session.
//! The cursor is sorted like the parent stream, so the rows of every parent
//! form one contiguous run that is consumed, or discarded, exactly once.
//!
//! - `mapping`: Feature type mappings, attribute and nested attribute mappings
//! - `engine`: `JoiningEngine` with per-caller sessions, run matching,
//!   cross-cursor synchronization and skip-log catch-up
//! - `feature`: Features built from matched rows
//! - `config`: `EngineConfig` and key comparison
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera_chaining::{
//!     AttributeMapping, CallerId, FeatureTypeMapping, JoiningEngine, MappingRegistry,
//!     NestedAttributeMapping, NestedRequest,
//! };
//! use tessera_core::schema::SourceTypeBuilder;
//! use tessera_core::{DataType, Value};
//! use tessera_query::{Expr, MemoryBackend, QueryExecutor, RowCursor, RowRef};
//!
//! let mut backend = MemoryBackend::new();
//! backend.register(
//!     SourceTypeBuilder::new("stations").unwrap()
//!         .add_column("id", DataType::Int64).unwrap()
//!         .add_primary_key(&["id"]).unwrap()
//!         .build().unwrap(),
//! ).unwrap();
//! backend.register(
//!     SourceTypeBuilder::new("readings").unwrap()
//!         .add_column("rid", DataType::Int64).unwrap()
//!         .add_column("station_id", DataType::Int64).unwrap()
//!         .add_primary_key(&["rid"]).unwrap()
//!         .build().unwrap(),
//! ).unwrap();
//! backend.insert("stations", vec![Value::Int64(1)]).unwrap();
//! backend.insert("readings", vec![Value::Int64(10), Value::Int64(1)]).unwrap();
//! backend.insert("readings", vec![Value::Int64(11), Value::Int64(1)]).unwrap();
//!
//! let station = FeatureTypeMapping::new("Station", "stations").with_id(Expr::column("id"));
//! let reading = FeatureTypeMapping::new("Reading", "readings")
//!     .with_id(Expr::column("rid"))
//!     .with_attribute(AttributeMapping::new("station", Expr::column("station_id")));
//! let nested = NestedAttributeMapping::new("readings", Expr::column("id"), "Reading", "station");
//!
//! let backend = Arc::new(backend);
//! let engine = JoiningEngine::new(
//!     backend.clone(),
//!     Arc::new(MappingRegistry::new().with(reading)),
//!     nested,
//! );
//! let caller = CallerId::next();
//! engine.open(caller, station.base_query(), &station).unwrap();
//!
//! let mut parents = backend.execute(&station.base_query()).unwrap();
//! let layout = parents.layout().clone();
//! while parents.has_next().unwrap() {
//!     let row = parents.next_row().unwrap();
//!     let parent = engine.parent_row(caller, RowRef::new(&layout, &row)).unwrap();
//!     let features = engine
//!         .fetch_features(caller, &parent, &NestedRequest::new())
//!         .unwrap();
//!     assert_eq!(features.len(), 2);
//! }
//! engine.close(caller).unwrap();
//! ```

mod config;
pub mod engine;
mod error;
pub mod feature;
pub mod mapping;
mod matcher;
mod request;
mod session;

pub use config::{EngineConfig, KeyComparison};
pub use engine::{JoiningEngine, MatchedRows, ParentRow};
pub use error::{Error, ErrorKind, Result};
pub use feature::{Feature, FeatureAssembler};
pub use mapping::{AttributeMapping, FeatureTypeMapping, MappingRegistry, NestedAttributeMapping};
pub use request::NestedRequest;
pub use session::{CallerId, SkippedRun};
