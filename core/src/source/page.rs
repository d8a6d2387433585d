//! Paged fetches
//!
//! A page is fetched with two queries run together: the sorted, limited
//! data query and a count over the same sorted source.

use crate::bridge::RowSet;
use crate::query::{Func, Order, SelectQuery};

/// Rows per page unless requested otherwise
pub const DEFAULT_PAGE_SIZE: u64 = 30;

/// Which page to fetch and how to sort
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    /// Rows per page
    pub page_size: u64,
    /// Sort columns, applied in order
    pub order_by: Vec<(String, Order)>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            order_by: Vec::new(),
        }
    }
}

impl PageRequest {
    /// First page with the default size
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number. Page 0 is treated as page 1.
    pub fn page(mut self, page: u64) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add a sort column
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Data query and paired count query for `source`
    pub fn queries(&self, source: SelectQuery) -> (SelectQuery, SelectQuery) {
        let sorted = self
            .order_by
            .iter()
            .fold(source, |query, (column, order)| query.order_by(column.clone(), *order));

        let count = SelectQuery::new()
            .add_field(Func::count_all(), "count")
            .from_query(sorted.clone());
        let data = sorted.limit(self.page_size).offset(self.offset());

        (data, count)
    }
}

/// One page of rows with the total row count of the source
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    /// Rows of this page
    pub rows: RowSet,
    /// Rows in the whole source
    pub total: u64,
}

impl Page {
    /// Number of pages needed for `total` rows
    pub fn page_count(&self, page_size: u64) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.total.div_ceil(page_size)
    }
}
