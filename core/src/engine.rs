//! Embedded SQL engine adapter
//!
//! The rest of the crate talks to the engine through [`SqlEngine`] so the
//! ingestion and query paths can be exercised against a mock. The default
//! implementation is an in-memory SQLite connection.

use std::sync::Mutex;

use log::debug;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use thiserror::Error;

use crate::error::{to_engine_init_error, Result};

/// Error raised by an engine, carrying the engine's own message
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError(err.to_string())
    }
}

/// Tabular result of one statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultBlock {
    /// Column labels in result order
    pub columns: Vec<String>,
    /// Row values, aligned with `columns`
    pub values: Vec<Vec<Value>>,
}

/// Operations the database needs from an embedded engine
#[cfg_attr(test, mockall::automock)]
pub trait SqlEngine: Send + Sync {
    /// Run a schema statement
    fn execute_ddl(&self, sql: &str) -> std::result::Result<(), EngineError>;

    /// Run a parameterized insert, returning the affected row count
    fn execute_insert(&self, sql: &str, params: &[Value]) -> std::result::Result<usize, EngineError>;

    /// Run a query. A statement that yields no rows yields no block.
    fn query(&self, sql: &str) -> std::result::Result<Vec<ResultBlock>, EngineError>;
}

/// In-memory SQLite engine
#[derive(Debug)]
pub struct SqliteEngine {
    conn: Mutex<Connection>,
}

impl SqliteEngine {
    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(to_engine_init_error)?;

        debug!("SQLite engine initialized (in-memory)");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Release the connection
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| to_engine_init_error("Engine lock poisoned"))?;
        conn.close()
            .map_err(|(_, e)| to_engine_init_error(e))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> std::result::Result<T, EngineError>,
    ) -> std::result::Result<T, EngineError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| EngineError("Engine lock poisoned".to_string()))?;
        f(&conn)
    }
}

impl SqlEngine for SqliteEngine {
    fn execute_ddl(&self, sql: &str) -> std::result::Result<(), EngineError> {
        self.with_conn(|conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
    }

    fn execute_insert(&self, sql: &str, params: &[Value]) -> std::result::Result<usize, EngineError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            Ok(stmt.execute(params_from_iter(params.iter()))?)
        })
    }

    fn query(&self, sql: &str) -> std::result::Result<Vec<ResultBlock>, EngineError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let column_count = columns.len();

            let mut values = Vec::new();
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut record = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    record.push(owned_value(row.get_ref(i)?));
                }
                values.push(record);
            }

            if values.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![ResultBlock { columns, values }])
        })
    }
}

fn owned_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_table() -> SqliteEngine {
        let engine = SqliteEngine::open_in_memory().unwrap();
        engine
            .execute_ddl("CREATE TABLE `t` (`id` INTEGER PRIMARY KEY AUTOINCREMENT, `name` TEXT)")
            .unwrap();
        engine
    }

    #[test]
    fn test_insert_and_query() {
        let engine = engine_with_table();
        let inserted = engine
            .execute_insert(
                "INSERT INTO `t` (`id`, `name`) VALUES (?, ?), (?, ?)",
                &[
                    Value::Integer(1),
                    Value::Text("a".into()),
                    Value::Integer(2),
                    Value::Null,
                ],
            )
            .unwrap();
        assert_eq!(inserted, 2);

        let blocks = engine.query("SELECT id, name FROM t ORDER BY id").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].columns, vec!["id", "name"]);
        assert_eq!(
            blocks[0].values,
            vec![
                vec![Value::Integer(1), Value::Text("a".into())],
                vec![Value::Integer(2), Value::Null],
            ]
        );
    }

    #[test]
    fn test_empty_result_has_no_block() {
        let engine = engine_with_table();
        assert!(engine.query("SELECT * FROM t").unwrap().is_empty());
    }

    #[test]
    fn test_engine_errors_carry_message() {
        let engine = engine_with_table();
        let err = engine.query("SELECT * FROM missing").unwrap_err();
        assert!(err.0.contains("no such table"));
        assert!(engine.execute_ddl("CREATE TABLE `t` (`x` TEXT)").is_err());
    }

    #[test]
    fn test_close() {
        let engine = engine_with_table();
        assert!(engine.close().is_ok());
    }
}
