//! Async data source
//!
//! Builds the static database on first use and serializes all later access
//! through one lock. Engine work runs on the blocking thread pool.

use std::sync::Arc;

use log::info;
use tokio::sync::{Mutex, OnceCell};

use super::page::{Page, PageRequest};
use super::static_source::StaticDataSource;
use super::DataSource;
use crate::bridge::RowSet;
use crate::config::StaticDbConfig;
use crate::error::{to_internal_error, CoreError, Result};
use crate::models::{DatabaseMetadata, RawTable, RawTables, TableMetadata};
use crate::query::{SelectQuery, Sequelizable};

/// Lazily initialized, shareable static data source
#[derive(Debug)]
pub struct SharedDataSource {
    tables: RawTables,
    config: StaticDbConfig,
    source: OnceCell<Arc<Mutex<StaticDataSource>>>,
}

impl SharedDataSource {
    /// Data source over `tables` with default settings
    pub fn new(tables: RawTables) -> Self {
        Self::with_config(tables, StaticDbConfig::default())
    }

    /// Data source over `tables` with the given configuration
    pub fn with_config(tables: RawTables, config: StaticDbConfig) -> Self {
        Self {
            tables,
            config,
            source: OnceCell::new(),
        }
    }

    /// Whether the database has been built
    pub fn is_initialized(&self) -> bool {
        self.source.initialized()
    }

    async fn source(&self) -> Result<Arc<Mutex<StaticDataSource>>> {
        let source = self
            .source
            .get_or_try_init(|| async {
                let tables = self.tables.clone();
                let config = self.config.clone();
                let source = tokio::task::spawn_blocking(move || {
                    StaticDataSource::with_config(tables, &config)
                })
                .await
                .map_err(to_internal_error)??;

                info!("Shared data source initialized");
                Ok::<_, CoreError>(Arc::new(Mutex::new(source)))
            })
            .await?;
        Ok(source.clone())
    }

    /// Run `queries` in order, one row set per query
    pub async fn execute_queries(&self, queries: Vec<Box<dyn Sequelizable>>) -> Result<Vec<RowSet>> {
        let source = self.source().await?;
        tokio::task::spawn_blocking(move || {
            let source = source.blocking_lock();
            let queries: Vec<&dyn Sequelizable> = queries.iter().map(|q| q.as_ref()).collect();
            source.execute_queries(&queries)
        })
        .await
        .map_err(to_internal_error)?
    }

    /// Run a single query
    pub async fn execute(&self, query: Box<dyn Sequelizable>) -> Result<RowSet> {
        let mut results = self.execute_queries(vec![query]).await?;
        Ok(results.pop().unwrap_or_default())
    }

    /// Fetch one page of `source` together with its total row count
    pub async fn fetch_page(&self, query: SelectQuery, request: PageRequest) -> Result<Page> {
        let source = self.source().await?;
        tokio::task::spawn_blocking(move || source.blocking_lock().fetch_page(query, &request))
            .await
            .map_err(to_internal_error)?
    }

    /// Add a table after construction
    pub async fn import_table(
        &self,
        name: impl Into<String>,
        rows: RawTable,
        enforce_primary_key: Option<bool>,
        metadata: Option<TableMetadata>,
    ) -> Result<usize> {
        let source = self.source().await?;
        let name = name.into();
        tokio::task::spawn_blocking(move || {
            source
                .blocking_lock()
                .database_mut()
                .import_table(&name, rows, enforce_primary_key, metadata)
        })
        .await
        .map_err(to_internal_error)?
    }

    /// Snapshot of the inferred metadata
    pub async fn metadata(&self) -> Result<DatabaseMetadata> {
        let source = self.source().await?;
        let metadata = source.lock().await.metadata().clone();
        Ok(metadata)
    }

    /// Release the engine if it was built
    pub async fn close(self) -> Result<()> {
        let source = match self.source.into_inner() {
            Some(source) => source,
            None => return Ok(()),
        };
        match Arc::try_unwrap(source) {
            Ok(source) => source.into_inner().close(),
            // Still borrowed by a running task; dropping the last handle closes it
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;
    use crate::query::{Order, RawQuery, SqliteFlavor};
    use rusqlite::types::Value;

    fn tables() -> RawTables {
        RawTables::new().with_table(
            "items",
            (1..=45i64)
                .map(|i| RawRow::new().with("id", i).with("price", format!("{}.5", i)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_lazy_initialization() {
        let source = SharedDataSource::new(tables());
        assert!(!source.is_initialized());

        let metadata = source.metadata().await.unwrap();
        assert!(metadata.has_table("items"));
        assert!(source.is_initialized());
        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_paged_fetch() {
        let source = SharedDataSource::new(tables());
        let page = source
            .fetch_page(
                SelectQuery::from_table("items"),
                PageRequest::new().page(2).order_by("id", Order::Desc),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 45);
        assert_eq!(page.rows.len(), 15);
        assert_eq!(page.rows[0].get("id"), Some(&Value::Integer(15)));
        assert_eq!(page.page_count(30), 2);
    }

    #[tokio::test]
    async fn test_concurrent_queries() {
        let source = Arc::new(SharedDataSource::new(tables()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let source = source.clone();
                tokio::spawn(async move {
                    let query = RawQuery::parse("SELECT COUNT(*) AS n FROM items", &SqliteFlavor)?;
                    source.execute(Box::new(query)).await
                })
            })
            .collect();

        for handle in handles {
            let rows = handle.await.unwrap().unwrap();
            assert_eq!(rows[0].get("n"), Some(&Value::Integer(45)));
        }
    }

    #[tokio::test]
    async fn test_initialization_failure_is_retried() {
        let tables = RawTables::new().with_table(
            "bad",
            vec![RawRow::new().with("a", 1i64), RawRow::new().with("a", 2i64).with("b", 1i64)],
        );
        let source = SharedDataSource::new(tables);

        for _ in 0..2 {
            let err = source.metadata().await.unwrap_err();
            assert!(matches!(err, CoreError::MalformedInput(_)));
            assert!(!source.is_initialized());
        }
    }

    #[tokio::test]
    async fn test_import_table() {
        let source = SharedDataSource::new(tables());
        let inserted = source
            .import_table("tags", vec![RawRow::new().with("tag", "new")], None, None)
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let rows = source
            .execute(Box::new(SelectQuery::from_table("tags")))
            .await
            .unwrap();
        assert_eq!(rows[0].get("tag"), Some(&Value::Text("new".into())));
    }
}
