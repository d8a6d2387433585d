//! Column types and schema metadata
//!
//! Resolved column types and the per-table, per-database column metadata
//! derived from raw input.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{to_config_error, CoreError};

/// SQL type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Text string
    #[serde(rename = "TEXT")]
    Text,

    /// Floating point number
    #[serde(rename = "REAL")]
    Real,

    /// Whole number
    #[serde(rename = "INTEGER")]
    Integer,

    /// Auto-incrementing integer primary key
    #[serde(rename = "INTEGER PRIMARY KEY AUTOINCREMENT")]
    IntegerPrimaryKey,

    /// Binary data
    #[serde(rename = "BLOB")]
    Blob,

    /// Date and time, stored as an ISO-8601 string
    #[serde(rename = "DATETIME")]
    DateTime,

    /// Empty string seen during inference. Never part of resolved metadata.
    #[serde(rename = "EMPTY_TEXT")]
    EmptyText,
}

impl ColumnType {
    /// Type as written in a column definition
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Real => "REAL",
            ColumnType::Integer => "INTEGER",
            ColumnType::IntegerPrimaryKey => "INTEGER PRIMARY KEY AUTOINCREMENT",
            ColumnType::Blob => "BLOB",
            ColumnType::DateTime => "DATETIME",
            ColumnType::EmptyText => "EMPTY_TEXT",
        }
    }

    /// Whether values of this type are stored as numbers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Real | ColumnType::Integer | ColumnType::IntegerPrimaryKey
        )
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.sql_type())
    }
}

impl FromStr for ColumnType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "TEXT" => Ok(ColumnType::Text),
            "REAL" => Ok(ColumnType::Real),
            "INTEGER" => Ok(ColumnType::Integer),
            "INTEGER PRIMARY KEY" | "INTEGER PRIMARY KEY AUTOINCREMENT" => {
                Ok(ColumnType::IntegerPrimaryKey)
            }
            "BLOB" => Ok(ColumnType::Blob),
            "DATETIME" => Ok(ColumnType::DateTime),
            "EMPTY TEXT" => Ok(ColumnType::EmptyText),
            _ => Err(to_config_error(format!("Unknown column type: {}", s))),
        }
    }
}

/// Metadata of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Normalized identifier used in the engine
    pub name: String,

    /// Column key as originally supplied
    pub label: String,

    /// Resolved type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnMetadata {
    /// Create column metadata
    pub fn new(name: impl Into<String>, label: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            column_type,
        }
    }

    /// Column definition as used in `CREATE TABLE`
    pub fn definition(&self) -> String {
        format!("`{}` {}", self.name, self.column_type.sql_type())
    }
}

/// Columns of one table, in first-row key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Column metadata
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Create table metadata
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self { columns }
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column definitions, in order
    pub fn column_definitions(&self) -> Vec<String> {
        self.columns.iter().map(ColumnMetadata::definition).collect()
    }

    /// Find a column by its original label
    pub fn column_by_label(&self, label: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.label == label)
    }

    /// Find a column by its normalized name
    pub fn column_by_name(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Metadata of every table in a data set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    /// Tables by name
    pub tables: BTreeMap<String, TableMetadata>,
}

impl DatabaseMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata of a table
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.get(name)
    }

    /// Whether a table is known
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Add or replace the metadata of a table
    pub fn insert_table(&mut self, name: impl Into<String>, table: TableMetadata) {
        self.tables.insert(name.into(), table);
    }
}
