//! SQL dialect flavors
//!
//! A flavor decides how identifiers and literals are written when a
//! structured query is rendered to SQL text.

use std::fmt::Debug;

use sqlparser::dialect::{Dialect, PostgreSqlDialect, SQLiteDialect};

/// Dialect-specific rendering rules
pub trait SqlFlavor: Debug + Send + Sync {
    /// Flavor name
    fn name(&self) -> &'static str;

    /// Quote a single identifier
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Render a possibly qualified column reference such as `users.name`
    fn quote_column(&self, column: &str) -> String {
        column
            .split('.')
            .map(|part| if part == "*" { part.to_string() } else { self.quote_identifier(part) })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render the LIMIT/OFFSET tail of a query, empty if neither is set
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(l), Some(o)) => format!(" LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!(" LIMIT {}", l),
            (None, Some(o)) => format!(" OFFSET {}", o),
            (None, None) => String::new(),
        }
    }

    /// Parser dialect used to validate hand-written SQL
    fn parser_dialect(&self) -> Box<dyn Dialect>;
}

/// SQLite rendering: backtick identifiers, OFFSET needs a LIMIT
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteFlavor;

impl SqlFlavor for SqliteFlavor {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(l), Some(o)) => format!(" LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!(" LIMIT {}", l),
            (None, Some(o)) => format!(" LIMIT -1 OFFSET {}", o),
            (None, None) => String::new(),
        }
    }

    fn parser_dialect(&self) -> Box<dyn Dialect> {
        Box::new(SQLiteDialect {})
    }
}

/// PostgreSQL rendering: double-quoted identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresFlavor;

impl SqlFlavor for PostgresFlavor {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn parser_dialect(&self) -> Box<dyn Dialect> {
        Box::new(PostgreSqlDialect {})
    }
}
