//! Column type resolution
//!
//! Aggregates the per-value classification of a column sample into one
//! resolved column type.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{ColumnType, RawRow};
use super::classifier::classify;

/// Number of leading rows sampled per column
pub const DEFAULT_SAMPLE_SIZE: usize = 500;

/// Label of the column treated as primary key when enforcement is on
pub const PRIMARY_KEY_LABEL: &str = "id";

/// Order in which co-occurring types win, most dominant first
const PRECEDENCE: [ColumnType; 5] = [
    ColumnType::Text,
    ColumnType::Real,
    ColumnType::Integer,
    ColumnType::IntegerPrimaryKey,
    ColumnType::Blob,
];

/// Remaps resolved types to different final types, e.g. REAL to TEXT
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeOverrides(BTreeMap<ColumnType, ColumnType>);

impl TypeOverrides {
    /// Create an empty override map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, from: ColumnType, to: ColumnType) -> Self {
        self.insert(from, to);
        self
    }

    /// Remap `from` to `to`
    pub fn insert(&mut self, from: ColumnType, to: ColumnType) {
        self.0.insert(from, to);
    }

    /// Apply the override for a resolved type, if any.
    /// EMPTY_TEXT is never a final type, so it lands on TEXT.
    pub fn apply(&self, column_type: ColumnType) -> ColumnType {
        match self.0.get(&column_type).copied().unwrap_or(column_type) {
            ColumnType::EmptyText => ColumnType::Text,
            other => other,
        }
    }

    /// Whether no overrides are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves the type of a column from a sample of its values
#[derive(Debug, Clone)]
pub struct ColumnTypeResolver {
    sample_size: usize,
    enforce_primary_key: bool,
    overrides: TypeOverrides,
}

impl Default for ColumnTypeResolver {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            enforce_primary_key: true,
            overrides: TypeOverrides::default(),
        }
    }
}

impl ColumnTypeResolver {
    /// Create a resolver with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of leading rows sampled
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set whether an `id` column always becomes the primary key
    pub fn with_primary_key(mut self, enforce_primary_key: bool) -> Self {
        self.enforce_primary_key = enforce_primary_key;
        self
    }

    /// Set the type override map
    pub fn with_overrides(mut self, overrides: TypeOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Resolve the type of the column `label` over `rows`
    pub fn resolve(&self, label: &str, rows: &[RawRow]) -> ColumnType {
        let resolved = self.resolve_unmapped(label, rows);
        self.overrides.apply(resolved)
    }

    fn resolve_unmapped(&self, label: &str, rows: &[RawRow]) -> ColumnType {
        if self.enforce_primary_key && label == PRIMARY_KEY_LABEL {
            return ColumnType::IntegerPrimaryKey;
        }

        let observed: BTreeSet<ColumnType> = rows
            .iter()
            .take(self.sample_size)
            .filter_map(|row| row.get(label))
            .filter_map(classify)
            .collect();

        let resolved = resolve_observed(&observed);
        debug!("Column {} observed {:?}, resolved {}", label, observed, resolved);
        resolved
    }
}

/// Collapse a set of observed types into one column type
fn resolve_observed(observed: &BTreeSet<ColumnType>) -> ColumnType {
    match observed.len() {
        // All sampled values were null
        0 => ColumnType::Text,
        1 => match observed.iter().next() {
            Some(ColumnType::EmptyText) | None => ColumnType::Text,
            Some(only) => *only,
        },
        _ => {
            if observed.contains(&ColumnType::EmptyText) && observed.contains(&ColumnType::DateTime) {
                return ColumnType::DateTime;
            }
            PRECEDENCE
                .iter()
                .find(|t| observed.contains(*t))
                .copied()
                .unwrap_or(ColumnType::Text)
        }
    }
}

/// Resolve a column type with the default sample size and no overrides
pub fn resolve_column_type(label: &str, rows: &[RawRow], enforce_primary_key: bool) -> ColumnType {
    ColumnTypeResolver::new()
        .with_primary_key(enforce_primary_key)
        .resolve(label, rows)
}
