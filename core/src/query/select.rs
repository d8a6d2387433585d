//! Composable SELECT queries
//!
//! A [`SelectQuery`] is built without string concatenation and rendered per
//! flavor. Queries can be used as the source of other queries, which is how
//! a paired count query wraps a data query.

use super::expr::{Cond, Expr, Order};
use super::flavor::SqlFlavor;
use super::Sequelizable;

/// Alias given to sub-query sources that were not aliased explicitly
const DEFAULT_SUBQUERY_ALIAS: &str = "source";

/// Source of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Named table
    Table(String),
    /// Nested query with its alias
    Query(Box<SelectQuery>, String),
}

/// Structured SELECT query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQuery {
    fields: Vec<(Expr, Option<String>)>,
    source: Option<Source>,
    conditions: Vec<Cond>,
    group_by: Vec<String>,
    order_by: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQuery {
    /// Empty query selecting `*`
    pub fn new() -> Self {
        Self::default()
    }

    /// `SELECT * FROM table`
    pub fn from_table(table: impl Into<String>) -> Self {
        Self::new().from(table)
    }

    /// Select from a table
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.source = Some(Source::Table(table.into()));
        self
    }

    /// Select from another query
    pub fn from_query(self, query: SelectQuery) -> Self {
        self.from_query_as(query, DEFAULT_SUBQUERY_ALIAS)
    }

    /// Select from another query under an explicit alias
    pub fn from_query_as(mut self, query: SelectQuery, alias: impl Into<String>) -> Self {
        self.source = Some(Source::Query(Box::new(query), alias.into()));
        self
    }

    /// Add a column
    pub fn column(self, name: &str) -> Self {
        self.field(Expr::column(name), None::<String>)
    }

    /// Add an expression with an optional alias
    pub fn field(mut self, expr: Expr, alias: Option<impl Into<String>>) -> Self {
        self.fields.push((expr, alias.map(Into::into)));
        self
    }

    /// Add an expression under an alias
    pub fn add_field(self, expr: Expr, alias: impl Into<String>) -> Self {
        self.field(expr, Some(alias))
    }

    /// Add a WHERE condition; multiple conditions are AND-ed
    pub fn filter(mut self, cond: Cond) -> Self {
        self.conditions.push(cond);
        self
    }

    /// Add a GROUP BY column
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Add an ORDER BY column
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    /// Set LIMIT
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The query source, if set
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }
}

impl Sequelizable for SelectQuery {
    fn to_sql(&self, flavor: &dyn SqlFlavor) -> String {
        let mut sql = String::from("SELECT ");

        if self.fields.is_empty() {
            sql.push('*');
        } else {
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(expr, alias)| match alias {
                    Some(alias) => format!("{} AS {}", expr.to_sql(flavor), flavor.quote_identifier(alias)),
                    None => expr.to_sql(flavor),
                })
                .collect();
            sql.push_str(&fields.join(", "));
        }

        match &self.source {
            Some(Source::Table(table)) => {
                sql.push_str(" FROM ");
                sql.push_str(&flavor.quote_identifier(table));
            }
            Some(Source::Query(query, alias)) => {
                sql.push_str(&format!(
                    " FROM ({}) AS {}",
                    query.to_sql(flavor),
                    flavor.quote_identifier(alias)
                ));
            }
            None => {}
        }

        if !self.conditions.is_empty() {
            let conditions: Vec<String> = self
                .conditions
                .iter()
                .map(|c| format!("({})", c.to_sql(flavor)))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.group_by.is_empty() {
            let columns: Vec<String> = self.group_by.iter().map(|c| flavor.quote_column(c)).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&columns.join(", "));
        }

        if !self.order_by.is_empty() {
            let columns: Vec<String> = self
                .order_by
                .iter()
                .map(|(c, order)| format!("{} {}", flavor.quote_column(c), order.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&columns.join(", "));
        }

        sql.push_str(&flavor.limit_offset(self.limit, self.offset));
        sql
    }
}
