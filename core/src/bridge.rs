//! Query execution
//!
//! Renders queries for a flavor, runs them one after another on a single
//! engine and maps the raw result blocks back to labelled rows.

use log::debug;
use rusqlite::types::Value;
use serde_json::{Map, Number, Value as JsonValue};

use crate::engine::SqlEngine;
use crate::error::{to_query_error, Result};
use crate::query::{Sequelizable, SqlFlavor};

/// One result row, cells keyed by column name in engine order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    cells: Vec<(String, Value)>,
}

/// Rows returned by one query
pub type RowSet = Vec<ResultRow>;

impl ResultRow {
    /// Build a row from column names and aligned values
    pub fn new(columns: &[String], values: Vec<Value>) -> Self {
        Self {
            cells: columns.iter().cloned().zip(values).collect(),
        }
    }

    /// Value of the named column
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Column names
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    /// Cells in engine order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Render as a JSON object, keeping column order
    pub fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        for (column, value) in &self.cells {
            object.insert(column.clone(), value_to_json(value));
        }
        JsonValue::Object(object)
    }
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(*i),
        Value::Real(f) => Number::from_f64(*f).map(JsonValue::Number).unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Blob(b) => JsonValue::Array(b.iter().map(|byte| JsonValue::from(*byte)).collect()),
    }
}

/// Run `queries` in order, returning one row set per query
pub fn execute_queries(
    engine: &dyn SqlEngine,
    flavor: &dyn SqlFlavor,
    queries: &[&dyn Sequelizable],
) -> Result<Vec<RowSet>> {
    queries
        .iter()
        .map(|query| execute_query(engine, flavor, *query))
        .collect()
}

/// Run a single query
pub fn execute_query(
    engine: &dyn SqlEngine,
    flavor: &dyn SqlFlavor,
    query: &dyn Sequelizable,
) -> Result<RowSet> {
    let sql = query.to_sql(flavor);
    debug!("Executing: {}", sql);

    let blocks = engine.query(&sql).map_err(|e| to_query_error(&sql, e))?;

    let rows = blocks
        .into_iter()
        .flat_map(|block| {
            let columns = block.columns;
            block
                .values
                .into_iter()
                .map(move |values| ResultRow::new(&columns, values))
        })
        .collect();
    Ok(rows)
}
