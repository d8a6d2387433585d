//! Raw tabular input
//!
//! Loosely typed cells, rows and tables exactly as supplied by the caller.
//! Column order is carried explicitly by each row: the first row of a table
//! defines the column order of that table.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde_json::{Map, Value as JsonValue};

use crate::error::{to_malformed_input_error, CoreError, Result};

/// A single untyped cell value
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Missing value
    Null,

    /// Boolean flag
    Bool(bool),

    /// Whole number
    Integer(i64),

    /// Floating point number
    Float(f64),

    /// Text string
    Text(String),
}

impl RawValue {
    /// Whether the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Convert a JSON scalar into a raw value.
    ///
    /// Arrays and objects are rejected, nested column values are not supported.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Null => Ok(RawValue::Null),
            JsonValue::Bool(b) => Ok(RawValue::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(RawValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(RawValue::Float(f))
                } else {
                    Err(CoreError::MalformedInput(format!("Unsupported number {}", n)))
                }
            }
            JsonValue::String(s) => Ok(RawValue::Text(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => Err(CoreError::MalformedInput(
                format!("Nested values are not supported: {}", value),
            )),
        }
    }

    /// Convert the value back to JSON
    pub fn to_json(&self) -> JsonValue {
        match self {
            RawValue::Null => JsonValue::Null,
            RawValue::Bool(b) => JsonValue::Bool(*b),
            RawValue::Integer(i) => JsonValue::from(*i),
            RawValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            RawValue::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

impl Display for RawValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_json())
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Integer(value as i64)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Null)
    }
}

/// One row of raw input: labelled cells in the order they were supplied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, RawValue)>,
}

impl RawRow {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, label: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(label, value);
        self
    }

    /// Set a cell. An existing label keeps its position and gets the new value.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<RawValue>) {
        let label = label.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(l, _)| *l == label) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((label, value)),
        }
    }

    /// Look up a cell by its label
    pub fn get(&self, label: &str) -> Option<&RawValue> {
        self.cells.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    /// Column labels in supplied order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(l, _)| l.as_str())
    }

    /// Cell values in supplied order
    pub fn values(&self) -> impl Iterator<Item = &RawValue> {
        self.cells.iter().map(|(_, v)| v)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Build a row from a JSON object, keeping key order
    pub fn from_json_object(object: &Map<String, JsonValue>) -> Result<Self> {
        let mut row = RawRow::new();
        for (label, value) in object {
            row.insert(label.clone(), RawValue::from_json(value)?);
        }
        Ok(row)
    }

    /// Render the row as a JSON object
    pub fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        for (label, value) in &self.cells {
            object.insert(label.clone(), value.to_json());
        }
        JsonValue::Object(object)
    }
}

impl Display for RawRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_json())
    }
}

/// Ordered rows of one table
pub type RawTable = Vec<RawRow>;

/// Named raw tables, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTables {
    tables: Vec<(String, RawTable)>,
}

impl RawTables {
    /// Create an empty set of tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_table(mut self, name: impl Into<String>, rows: RawTable) -> Self {
        self.insert(name, rows);
        self
    }

    /// Add or replace a table
    pub fn insert(&mut self, name: impl Into<String>, rows: RawTable) {
        let name = name.into();
        match self.tables.iter_mut().find(|(n, _)| *n == name) {
            Some(table) => table.1 = rows,
            None => self.tables.push((name, rows)),
        }
    }

    /// Rows of a table
    pub fn get(&self, name: &str) -> Option<&RawTable> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, rows)| rows)
    }

    /// Iterate over `(name, rows)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawTable)> {
        self.tables.iter().map(|(n, rows)| (n.as_str(), rows))
    }

    /// Table names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(n, _)| n.as_str())
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether there are no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Parse `{ "table": [ { "column": value, .. }, .. ], .. }`
    pub fn from_json_value(value: &JsonValue) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| to_malformed_input_error("Expected an object mapping table names to rows"))?;

        let mut tables = RawTables::new();
        for (name, rows) in object {
            let rows = rows.as_array().ok_or_else(|| {
                CoreError::MalformedInput(format!("Table {} is not an array of rows", name))
            })?;
            let mut table = RawTable::with_capacity(rows.len());
            for row in rows {
                let row = row.as_object().ok_or_else(|| {
                    CoreError::MalformedInput(format!("Row in table {} is not an object: {}", name, row))
                })?;
                table.push(RawRow::from_json_object(row)?);
            }
            tables.insert(name.clone(), table);
        }
        Ok(tables)
    }

    /// Parse tables from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }
}
