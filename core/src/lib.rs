//! # Static Database Core
//!
//! Turns untyped tabular data into a queryable in-memory SQL database.
//! Column types are inferred from sampled values, rows are coerced and bulk
//! loaded into an embedded engine, and structured queries are executed with
//! results mapped back to labelled rows.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bridge;
pub mod coercion;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod query;
pub mod schema;
pub mod source;
pub mod utils;

/// Re-export common types for ease of use
pub use bridge::{ResultRow, RowSet};
pub use config::StaticDbConfig;
pub use database::{DatabaseOptions, StaticDatabase};
pub use engine::{SqlEngine, SqliteEngine};
pub use error::{CoreError, Result};
pub use models::{ColumnMetadata, ColumnType, DatabaseMetadata, RawRow, RawTables, RawValue, TableMetadata};
pub use query::{Cond, Func, Order, RawQuery, SelectQuery, Sequelizable, SqlFlavor};
pub use source::{DataSource, Page, PageRequest, SharedDataSource, StaticDataSource};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
