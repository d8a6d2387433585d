//! Database metadata construction
//!
//! Derives per-table column metadata (normalized name, original label and
//! resolved type) from raw tables.

use std::collections::HashSet;

use log::{debug, warn};

use crate::error::{to_malformed_input_error, CoreError, Result};
use crate::models::{ColumnMetadata, DatabaseMetadata, RawRow, RawTables, TableMetadata};
use crate::utils::StringUtils;
use super::resolver::{ColumnTypeResolver, TypeOverrides};

/// Builds [`DatabaseMetadata`] from raw tables
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    resolver: ColumnTypeResolver,
}

impl MetadataBuilder {
    /// Create a builder with primary key enforcement on and no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder around a configured resolver
    pub fn with_resolver(resolver: ColumnTypeResolver) -> Self {
        Self { resolver }
    }

    /// Metadata for every table in `tables`.
    ///
    /// Fails with `MalformedInput` if any table has no rows.
    pub fn build(&self, tables: &RawTables) -> Result<DatabaseMetadata> {
        let mut metadata = DatabaseMetadata::new();
        for (name, rows) in tables.iter() {
            let table = self.build_table(rows).map_err(|e| match e {
                CoreError::MalformedInput(msg) => {
                    CoreError::MalformedInput(format!("Table {}: {}", name, msg))
                }
                other => other,
            })?;
            metadata.insert_table(name, table);
        }
        Ok(metadata)
    }

    /// Metadata for one table. The first row defines the column order.
    pub fn build_table(&self, rows: &[RawRow]) -> Result<TableMetadata> {
        let first = rows
            .first()
            .ok_or_else(|| to_malformed_input_error("cannot infer a schema from zero rows"))?;

        let mut seen = HashSet::new();
        let columns = first
            .labels()
            .enumerate()
            .map(|(index, label)| {
                let column_type = self.resolver.resolve(label, rows);
                let name = unique_name(StringUtils::normalize_identifier(label, index), &mut seen);
                debug!("Column {:?} -> `{}` {}", label, name, column_type);
                ColumnMetadata::new(name, label, column_type)
            })
            .collect();

        Ok(TableMetadata::new(columns))
    }
}

/// Suffix `name` with `_2`, `_3`, .. until it does not collide with an earlier column
fn unique_name(name: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(name.clone()) {
        return name;
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", name, suffix);
        if seen.insert(candidate.clone()) {
            warn!("Column name `{}` is already taken, using `{}`", name, candidate);
            return candidate;
        }
        suffix += 1;
    }
}

/// Build metadata for all tables with the default sample size
pub fn build_metadata(
    tables: &RawTables,
    enforce_primary_key: bool,
    overrides: TypeOverrides,
) -> Result<DatabaseMetadata> {
    let resolver = ColumnTypeResolver::new()
        .with_primary_key(enforce_primary_key)
        .with_overrides(overrides);
    MetadataBuilder::with_resolver(resolver).build(tables)
}
