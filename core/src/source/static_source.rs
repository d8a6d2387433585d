//! Data source over a static database

use log::debug;
use rusqlite::types::Value;

use super::page::{Page, PageRequest};
use super::DataSource;
use crate::bridge::{execute_queries, RowSet};
use crate::config::StaticDbConfig;
use crate::database::{DatabaseOptions, StaticDatabase};
use crate::engine::{SqlEngine, SqliteEngine};
use crate::error::{CoreError, Result};
use crate::models::{DatabaseMetadata, RawTables};
use crate::query::{SelectQuery, Sequelizable, SqlFlavor, SqliteFlavor};

/// Runs queries against raw tables loaded into an embedded engine
#[derive(Debug)]
pub struct StaticDataSource<E: SqlEngine = SqliteEngine> {
    db: StaticDatabase<E>,
    flavor: Box<dyn SqlFlavor>,
}

impl StaticDataSource<SqliteEngine> {
    /// Load `tables` into a fresh in-memory engine with default settings
    pub fn new(tables: RawTables) -> Result<Self> {
        Self::with_config(tables, &StaticDbConfig::default())
    }

    /// Load `tables` with the given configuration
    pub fn with_config(tables: RawTables, config: &StaticDbConfig) -> Result<Self> {
        let db = StaticDatabase::create(tables, DatabaseOptions::from(config))?;
        Ok(Self::from_database(db))
    }

    /// Release the engine
    pub fn close(self) -> Result<()> {
        self.db.close()
    }
}

impl<E: SqlEngine> StaticDataSource<E> {
    /// Wrap an existing database, rendering SQL for SQLite
    pub fn from_database(db: StaticDatabase<E>) -> Self {
        Self {
            db,
            flavor: Box::new(SqliteFlavor),
        }
    }

    /// Render SQL with another flavor
    pub fn with_flavor(mut self, flavor: Box<dyn SqlFlavor>) -> Self {
        self.flavor = flavor;
        self
    }

    /// Flavor queries are rendered with
    pub fn flavor(&self) -> &dyn SqlFlavor {
        self.flavor.as_ref()
    }

    /// Underlying database
    pub fn database(&self) -> &StaticDatabase<E> {
        &self.db
    }

    /// Underlying database, for imports
    pub fn database_mut(&mut self) -> &mut StaticDatabase<E> {
        &mut self.db
    }

    /// Inferred metadata
    pub fn metadata(&self) -> &DatabaseMetadata {
        self.db.metadata()
    }

    /// Fetch one page of `source` together with its total row count
    pub fn fetch_page(&self, source: SelectQuery, request: &PageRequest) -> Result<Page> {
        let (data, count) = request.queries(source);
        let mut results = self.execute_queries(&[&data, &count])?;

        let total = results
            .pop()
            .and_then(|rows| rows.into_iter().next())
            .and_then(|row| row.get("count").cloned());
        let total = match total {
            Some(Value::Integer(n)) if n >= 0 => n as u64,
            other => {
                return Err(CoreError::Query {
                    sql: count.to_sql(self.flavor()),
                    message: format!("Unexpected count result: {:?}", other),
                })
            }
        };
        let rows = results.pop().unwrap_or_default();

        debug!("Fetched page {} with {} of {} rows", request.page, rows.len(), total);
        Ok(Page { rows, total })
    }
}

impl<E: SqlEngine> DataSource for StaticDataSource<E> {
    fn execute_queries(&self, queries: &[&dyn Sequelizable]) -> Result<Vec<RowSet>> {
        execute_queries(self.db.engine(), self.flavor(), queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnType, RawRow};
    use crate::query::{Cond, Func, Order, RawQuery};
    use serde_json::json;

    fn users() -> RawTables {
        RawTables::from_json_value(&json!({
            "users": [
                { "id": "1", "name": "John Doe", "birthdate": "1990-01-15", "salary": 60000 },
                { "id": "2", "name": "Jane Smith", "birthdate": "1985-03-22", "salary": 75000 }
            ]
        }))
        .unwrap()
    }

    fn text(row: &crate::bridge::ResultRow, column: &str) -> String {
        match row.get(column) {
            Some(Value::Text(s)) => s.clone(),
            other => panic!("expected text in {}, got {:?}", column, other),
        }
    }

    #[test]
    fn test_users_scenario() {
        let _ = env_logger::builder().is_test(true).try_init();
        let source = StaticDataSource::new(users()).unwrap();

        let users = source.metadata().table("users").unwrap();
        let types: Vec<ColumnType> = users.columns.iter().map(|c| c.column_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::IntegerPrimaryKey,
                ColumnType::Text,
                ColumnType::DateTime,
                ColumnType::Integer
            ]
        );

        let page = source
            .fetch_page(
                SelectQuery::from_table("users"),
                &PageRequest::new().order_by("salary", Order::Asc),
            )
            .unwrap();
        assert_eq!(page.total, 2);
        let names: Vec<String> = page.rows.iter().map(|r| text(r, "name")).collect();
        assert_eq!(names, vec!["John Doe", "Jane Smith"]);

        let page = source
            .fetch_page(
                SelectQuery::from_table("users"),
                &PageRequest::new().order_by("salary", Order::Desc),
            )
            .unwrap();
        assert_eq!(text(&page.rows[0], "name"), "Jane Smith");
        source.close().unwrap();
    }

    #[test]
    fn test_execute_with_filters() {
        let source = StaticDataSource::new(users()).unwrap();

        let query = SelectQuery::from_table("users")
            .column("name")
            .filter(Cond::gt("salary", 70000i64));
        let rows = source.execute(&query).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(text(&rows[0], "name"), "Jane Smith");

        let total = SelectQuery::from_table("users").add_field(Func::sum("salary"), "total");
        let rows = source.execute(&total).unwrap();
        assert_eq!(rows[0].get("total"), Some(&Value::Integer(135000)));
    }

    #[test]
    fn test_raw_queries_and_empty_results() {
        let source = StaticDataSource::new(users()).unwrap();

        let raw = RawQuery::parse("SELECT name FROM users ORDER BY birthdate", source.flavor()).unwrap();
        let none = SelectQuery::from_table("users").filter(Cond::eq("name", "Nobody"));
        let results = source.execute_queries(&[&raw, &none]).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(text(&results[0][0], "name"), "Jane Smith");
        assert!(results[1].is_empty());
    }

    #[test]
    fn test_query_errors_propagate() {
        let source = StaticDataSource::new(users()).unwrap();
        let err = source.execute(&SelectQuery::from_table("missing")).unwrap_err();
        assert!(matches!(err, CoreError::Query { .. }));
    }

    #[test]
    fn test_excess_columns_fail_construction() {
        let tables = RawTables::new().with_table(
            "t",
            vec![
                RawRow::new().with("a", 1i64),
                RawRow::new().with("a", 2i64).with("b", 3i64),
            ],
        );
        let err = StaticDataSource::new(tables).unwrap_err();
        match err {
            CoreError::MalformedInput(msg) => assert!(msg.contains("(expected: 1)")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_two_digit_year_dates_load() {
        let tables = RawTables::from_json_value(&json!({
            "t": [{ "d": "90-01-15" }, { "d": "99-12-31" }]
        }))
        .unwrap();
        let source = StaticDataSource::new(tables).unwrap();
        assert_eq!(
            source.metadata().table("t").unwrap().columns[0].column_type,
            ColumnType::DateTime
        );

        let query = SelectQuery::from_table("t").order_by("d", Order::Desc);
        let rows = source.execute(&query).unwrap();
        assert_eq!(text(&rows[0], "d"), "1999-12-31T00:00:00.000Z");
        assert_eq!(text(&rows[1], "d"), "1990-01-15T00:00:00.000Z");
    }

    #[test]
    fn test_import_then_query() {
        let mut source = StaticDataSource::new(users()).unwrap();
        source
            .database_mut()
            .import_table("teams", vec![RawRow::new().with("Team Name", "Core")], None, None)
            .unwrap();

        let rows = source.execute(&SelectQuery::from_table("teams")).unwrap();
        assert_eq!(text(&rows[0], "team_name"), "Core");
    }
}
