//! Table materialization
//!
//! Creates a table from its metadata and bulk-loads raw rows into it with
//! chunked, multi-row parameterized inserts.

use log::{debug, info};
use rusqlite::types::Value;

use crate::coercion::coerce;
use crate::engine::{EngineError, SqlEngine};
use crate::error::{CoreError, Result};
use crate::models::{RawRow, TableMetadata};
use crate::utils::measure_time;

/// Rows per insert statement
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Highest number of bound parameters SQLite accepts in one statement
const MAX_BOUND_PARAMETERS: usize = 32766;

/// Create `table` and insert `rows`, returning the number of rows inserted.
///
/// Rows are aligned to the metadata by position. A row with fewer values
/// than columns is padded with NULL; a row with more is rejected before
/// anything is created.
pub fn materialize(
    engine: &dyn SqlEngine,
    table: &str,
    rows: &[RawRow],
    metadata: &TableMetadata,
    chunk_size: usize,
) -> Result<usize> {
    if rows.is_empty() {
        return Err(CoreError::MalformedInput(format!(
            "Table {} has no rows to insert",
            table
        )));
    }

    let column_count = metadata.column_count();
    if column_count == 0 {
        return Err(CoreError::MalformedInput(format!(
            "Table {} has no columns",
            table
        )));
    }

    if let Some(row) = rows.iter().find(|r| r.len() > column_count) {
        return Err(CoreError::MalformedInput(format!(
            "Row has more columns than expected: {} (expected: {})",
            row, column_count
        )));
    }

    let definitions = metadata.column_definitions().join(", ");
    let ingestion_error = |e: EngineError| CoreError::Ingestion {
        columns: definitions.clone(),
        message: e.0,
    };

    measure_time(&format!("Materializing table {}", table), || {
        let create = format!("CREATE TABLE {} ({})", quote(table), definitions);
        debug!("{}", create);
        engine.execute_ddl(&create).map_err(ingestion_error)?;

        let chunk_size = effective_chunk_size(chunk_size, column_count);
        let column_list = metadata
            .columns
            .iter()
            .map(|c| quote(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = format!("({})", vec!["?"; column_count].join(", "));

        let mut inserted = 0;
        for chunk in rows.chunks(chunk_size) {
            let params = chunk_params(chunk, metadata)?;
            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                quote(table),
                column_list,
                vec![placeholders.as_str(); chunk.len()].join(", ")
            );
            inserted += engine.execute_insert(&sql, &params).map_err(ingestion_error)?;
        }

        info!(
            "Inserted {} rows into {} ({} columns)",
            inserted, table, column_count
        );
        Ok(inserted)
    })
}

/// Coerced parameters of a chunk, row after row
fn chunk_params(chunk: &[RawRow], metadata: &TableMetadata) -> Result<Vec<Value>> {
    let column_count = metadata.column_count();
    let mut params = Vec::with_capacity(chunk.len() * column_count);

    for row in chunk {
        let mut values = row.values();
        for column in &metadata.columns {
            match values.next() {
                Some(value) => params.push(coerce(value, column.column_type)?),
                None => params.push(Value::Null),
            }
        }
    }

    Ok(params)
}

fn effective_chunk_size(chunk_size: usize, column_count: usize) -> usize {
    chunk_size.min(MAX_BOUND_PARAMETERS / column_count).max(1)
}

fn quote(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockSqlEngine, SqliteEngine};
    use crate::models::{ColumnMetadata, ColumnType};

    fn metadata() -> TableMetadata {
        TableMetadata::new(vec![
            ColumnMetadata::new("id", "id", ColumnType::IntegerPrimaryKey),
            ColumnMetadata::new("amount", "Amount", ColumnType::Real),
        ])
    }

    fn rows(n: usize) -> Vec<RawRow> {
        (1..=n)
            .map(|i| {
                RawRow::new()
                    .with("id", i as i64)
                    .with("Amount", format!("{},50", i))
            })
            .collect()
    }

    #[test]
    fn test_chunked_inserts() {
        let mut engine = MockSqlEngine::new();
        engine
            .expect_execute_ddl()
            .withf(|sql| {
                sql == "CREATE TABLE `sales` (`id` INTEGER PRIMARY KEY AUTOINCREMENT, `amount` REAL)"
            })
            .times(1)
            .returning(|_| Ok(()));
        engine
            .expect_execute_insert()
            .withf(|sql, params| sql.matches("(?, ?)").count() * 2 == params.len())
            .times(3)
            .returning(|_, params| Ok(params.len() / 2));

        let inserted = materialize(&engine, "sales", &rows(7), &metadata(), 3).unwrap();
        assert_eq!(inserted, 7);
    }

    #[test]
    fn test_coerces_values_per_column() {
        let mut engine = MockSqlEngine::new();
        engine.expect_execute_ddl().returning(|_| Ok(()));
        engine
            .expect_execute_insert()
            .withf(|_, params| {
                params == [Value::Integer(1), Value::Real(1.5), Value::Integer(2), Value::Real(2.5)]
            })
            .times(1)
            .returning(|_, _| Ok(2));

        assert_eq!(materialize(&engine, "sales", &rows(2), &metadata(), 300).unwrap(), 2);
    }

    #[test]
    fn test_rejects_excess_columns_before_create() {
        let mut engine = MockSqlEngine::new();
        engine.expect_execute_ddl().times(0);
        engine.expect_execute_insert().times(0);

        let mut input = rows(2);
        input.push(RawRow::new().with("id", 3i64).with("Amount", 1.0).with("extra", "x"));

        let err = materialize(&engine, "sales", &input, &metadata(), 300).unwrap_err();
        match err {
            CoreError::MalformedInput(msg) => {
                assert!(msg.contains("\"extra\":\"x\""));
                assert!(msg.contains("(expected: 2)"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_rows() {
        let engine = MockSqlEngine::new();
        assert!(matches!(
            materialize(&engine, "sales", &[], &metadata(), 300),
            Err(CoreError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_engine_failure_is_ingestion_error() {
        let mut engine = MockSqlEngine::new();
        engine.expect_execute_ddl().returning(|_| Ok(()));
        engine
            .expect_execute_insert()
            .returning(|_, _| Err(EngineError("constraint failed".to_string())));

        let err = materialize(&engine, "sales", &rows(1), &metadata(), 300).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error inserting row into table with columns [`id` INTEGER PRIMARY KEY AUTOINCREMENT, `amount` REAL], error: constraint failed"
        );
    }

    #[test]
    fn test_conversion_failure_propagates() {
        let mut engine = MockSqlEngine::new();
        engine.expect_execute_ddl().returning(|_| Ok(()));
        engine.expect_execute_insert().times(0);

        let input = vec![RawRow::new().with("id", 1i64).with("Amount", "n/a")];
        assert!(matches!(
            materialize(&engine, "sales", &input, &metadata(), 300),
            Err(CoreError::ValueConversion { .. })
        ));
    }

    #[test]
    fn test_materialize_into_sqlite() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let mut input = rows(2);
        input.push(RawRow::new().with("id", 3i64));

        assert_eq!(materialize(&engine, "sales", &input, &metadata(), 2).unwrap(), 3);

        let blocks = engine.query("SELECT id, amount FROM sales ORDER BY id").unwrap();
        assert_eq!(
            blocks[0].values,
            vec![
                vec![Value::Integer(1), Value::Real(1.5)],
                vec![Value::Integer(2), Value::Real(2.5)],
                vec![Value::Integer(3), Value::Null],
            ]
        );
    }

    #[test]
    fn test_chunk_size_respects_parameter_limit() {
        assert_eq!(effective_chunk_size(300, 2), 300);
        assert_eq!(effective_chunk_size(300, 1000), 32);
        assert_eq!(effective_chunk_size(0, 3), 1);
    }
}
