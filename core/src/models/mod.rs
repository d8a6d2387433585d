//! Data models for static data sets
//!
//! This module provides data structures for raw tabular input and for the
//! schema metadata inferred from it.

mod metadata;
mod value;

pub use metadata::{ColumnMetadata, ColumnType, DatabaseMetadata, TableMetadata};
pub use value::{RawRow, RawTable, RawTables, RawValue};
