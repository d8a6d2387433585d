//! Schema inference
//!
//! This module derives a column schema from untyped rows: per-value
//! classification, per-column type resolution and per-table metadata.

mod builder;
mod classifier;
mod resolver;

pub use builder::{build_metadata, MetadataBuilder};
pub use classifier::{classify, is_datetime};
pub use resolver::{
    resolve_column_type, ColumnTypeResolver, TypeOverrides, DEFAULT_SAMPLE_SIZE, PRIMARY_KEY_LABEL,
};
