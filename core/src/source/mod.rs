//! Data sources
//!
//! The contract exposed to callers that render tables and selects: run one
//! query, or several in one round trip with results in input order.

mod page;
mod shared;
mod static_source;

pub use page::{Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use shared::SharedDataSource;
pub use static_source::StaticDataSource;

use crate::bridge::RowSet;
use crate::error::Result;
use crate::query::Sequelizable;

/// Executes queries and returns labelled rows
pub trait DataSource {
    /// Run `queries` in order, one row set per query
    fn execute_queries(&self, queries: &[&dyn Sequelizable]) -> Result<Vec<RowSet>>;

    /// Run a single query
    fn execute(&self, query: &dyn Sequelizable) -> Result<RowSet> {
        let mut results = self.execute_queries(&[query])?;
        Ok(results.pop().unwrap_or_default())
    }
}
