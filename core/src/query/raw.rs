//! Hand-written SQL queries
//!
//! Raw SQL is parsed once with the flavor's dialect so malformed text is
//! rejected before it reaches the engine.

use sqlparser::ast::Statement;
use sqlparser::parser::Parser;

use super::flavor::SqlFlavor;
use super::Sequelizable;
use crate::error::{CoreError, Result};

/// A validated, single read-only statement
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuery {
    statement: Statement,
}

impl RawQuery {
    /// Parse `sql` with the dialect of `flavor`
    ///
    /// Exactly one query statement is accepted. DDL and DML are rejected.
    pub fn parse(sql: &str, flavor: &dyn SqlFlavor) -> Result<Self> {
        let dialect = flavor.parser_dialect();
        let mut statements =
            Parser::parse_sql(&*dialect, sql).map_err(|e| CoreError::Query {
                sql: sql.to_string(),
                message: e.to_string(),
            })?;

        if statements.len() != 1 {
            return Err(CoreError::Query {
                sql: sql.to_string(),
                message: format!("Expected a single statement, found {}", statements.len()),
            });
        }

        match statements.remove(0) {
            statement @ Statement::Query(_) => Ok(Self { statement }),
            _ => Err(CoreError::Query {
                sql: sql.to_string(),
                message: "Only SELECT queries are allowed".to_string(),
            }),
        }
    }
}

impl Sequelizable for RawQuery {
    fn to_sql(&self, _flavor: &dyn SqlFlavor) -> String {
        self.statement.to_string()
    }
}
