//! Static database
//!
//! Owns the raw tables, the engine they were materialized into and the
//! metadata inferred for them. Metadata is derived once for every table
//! before any table is created.

use log::{info, warn};

use crate::config::StaticDbConfig;
use crate::engine::{SqlEngine, SqliteEngine};
use crate::error::{CoreError, Result};
use crate::ingest::{materialize, DEFAULT_CHUNK_SIZE};
use crate::models::{DatabaseMetadata, RawTable, RawTables, TableMetadata};
use crate::schema::{ColumnTypeResolver, MetadataBuilder};

/// Options applied when building and importing tables
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// Resolver used for schema inference
    pub resolver: ColumnTypeResolver,
    /// Rows per insert statement
    pub chunk_size: usize,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            resolver: ColumnTypeResolver::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl From<&StaticDbConfig> for DatabaseOptions {
    fn from(config: &StaticDbConfig) -> Self {
        Self {
            resolver: config.inference.resolver(),
            chunk_size: config.ingestion.chunk_size,
        }
    }
}

/// Raw tables materialized into an embedded engine
#[derive(Debug)]
pub struct StaticDatabase<E: SqlEngine = SqliteEngine> {
    tables: RawTables,
    engine: E,
    metadata: DatabaseMetadata,
    options: DatabaseOptions,
}

impl StaticDatabase<SqliteEngine> {
    /// Build a database in a fresh in-memory SQLite engine
    pub fn create(tables: RawTables, options: DatabaseOptions) -> Result<Self> {
        let engine = SqliteEngine::open_in_memory()?;
        Self::create_with_engine(engine, tables, options)
    }

    /// Release the engine
    pub fn close(self) -> Result<()> {
        self.engine.close()
    }
}

impl<E: SqlEngine> StaticDatabase<E> {
    /// Build a database in the given engine.
    ///
    /// Empty tables are skipped: they get neither metadata nor a table.
    pub fn create_with_engine(engine: E, tables: RawTables, options: DatabaseOptions) -> Result<Self> {
        let builder = MetadataBuilder::with_resolver(options.resolver.clone());

        let mut metadata = DatabaseMetadata::new();
        for (name, rows) in tables.iter() {
            if rows.is_empty() {
                warn!("Skipping empty table {}", name);
                continue;
            }
            let table = builder.build_table(rows).map_err(|e| match e {
                CoreError::MalformedInput(msg) => {
                    CoreError::MalformedInput(format!("Table {}: {}", name, msg))
                }
                other => other,
            })?;
            metadata.insert_table(name, table);
        }

        for (name, rows) in tables.iter() {
            if let Some(table) = metadata.table(name) {
                materialize(&engine, name, rows, table, options.chunk_size)?;
            }
        }

        info!("Static database ready with {} tables", metadata.tables.len());

        Ok(Self {
            tables,
            engine,
            metadata,
            options,
        })
    }

    /// Add a table after construction, returning the number of rows inserted.
    ///
    /// Metadata is inferred from `rows` unless given explicitly;
    /// `enforce_primary_key` overrides the configured setting for this table.
    pub fn import_table(
        &mut self,
        name: &str,
        rows: RawTable,
        enforce_primary_key: Option<bool>,
        metadata: Option<TableMetadata>,
    ) -> Result<usize> {
        if self.metadata.has_table(name) {
            return Err(CoreError::MalformedInput(format!(
                "Table {} already exists",
                name
            )));
        }

        let table = match metadata {
            Some(table) => table,
            None => {
                let mut resolver = self.options.resolver.clone();
                if let Some(enforce) = enforce_primary_key {
                    resolver = resolver.with_primary_key(enforce);
                }
                MetadataBuilder::with_resolver(resolver).build_table(&rows)?
            }
        };

        let inserted = materialize(&self.engine, name, &rows, &table, self.options.chunk_size)?;
        self.metadata.insert_table(name, table);
        self.tables.insert(name, rows);
        Ok(inserted)
    }

    /// Inferred metadata of every materialized table
    pub fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    /// Raw tables the database was built from
    pub fn tables(&self) -> &RawTables {
        &self.tables
    }

    /// Underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnMetadata, ColumnType, RawRow};
    use crate::schema::TypeOverrides;
    use rusqlite::types::Value;
    use serde_json::json;

    fn tables() -> RawTables {
        RawTables::from_json_value(&json!({
            "users": [
                { "id": "1", "name": "John Doe", "birthdate": "1990-01-15", "salary": 60000 },
                { "id": "2", "name": "Jane Smith", "birthdate": "1985-03-22", "salary": 75000 }
            ],
            "empty": []
        }))
        .unwrap()
    }

    #[test]
    fn test_create_skips_empty_tables() {
        let db = StaticDatabase::create(tables(), DatabaseOptions::default()).unwrap();

        assert!(db.metadata().has_table("users"));
        assert!(!db.metadata().has_table("empty"));
        assert_eq!(db.tables().len(), 2);

        let blocks = db.engine().query("SELECT birthdate, salary FROM users WHERE id = 2").unwrap();
        assert_eq!(
            blocks[0].values[0],
            vec![
                Value::Text("1985-03-22T00:00:00.000Z".into()),
                Value::Integer(75000)
            ]
        );
        db.close().unwrap();
    }

    #[test]
    fn test_overrides_from_config() {
        let mut config = StaticDbConfig::default();
        config.inference.overrides = TypeOverrides::new().with(ColumnType::Integer, ColumnType::Real);

        let db = StaticDatabase::create(tables(), DatabaseOptions::from(&config)).unwrap();
        let users = db.metadata().table("users").unwrap();
        assert_eq!(users.column_by_name("salary").unwrap().column_type, ColumnType::Real);
    }

    #[test]
    fn test_import_table() {
        let mut db = StaticDatabase::create(tables(), DatabaseOptions::default()).unwrap();
        let rows = vec![
            RawRow::new().with("id", "a").with("Score", "1.5"),
            RawRow::new().with("id", "b").with("Score", "2"),
        ];

        let inserted = db.import_table("scores", rows, Some(false), None).unwrap();
        assert_eq!(inserted, 2);

        let scores = db.metadata().table("scores").unwrap();
        assert_eq!(scores.column_by_name("id").unwrap().column_type, ColumnType::Text);
        assert_eq!(scores.column_by_name("score").unwrap().column_type, ColumnType::Real);
        assert!(db.tables().get("scores").is_some());
    }

    #[test]
    fn test_import_with_explicit_metadata() {
        let mut db = StaticDatabase::create(RawTables::new(), DatabaseOptions::default()).unwrap();
        let metadata = TableMetadata::new(vec![ColumnMetadata::new("code", "Code", ColumnType::Text)]);

        db.import_table("codes", vec![RawRow::new().with("Code", 7i64)], None, Some(metadata.clone()))
            .unwrap();
        assert_eq!(db.metadata().table("codes"), Some(&metadata));
    }

    #[test]
    fn test_import_existing_table_fails() {
        let mut db = StaticDatabase::create(tables(), DatabaseOptions::default()).unwrap();
        let err = db
            .import_table("users", vec![RawRow::new().with("id", 3i64)], None, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput(_)));
        assert_eq!(db.metadata().table("users").unwrap().column_count(), 4);
    }

    #[test]
    fn test_import_empty_table_fails() {
        let mut db = StaticDatabase::create(RawTables::new(), DatabaseOptions::default()).unwrap();
        assert!(db.import_table("none", vec![], None, None).is_err());
        assert!(!db.metadata().has_table("none"));
    }
}
