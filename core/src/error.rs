//! Error types for the core crate
//!
//! This module provides a consolidated error type for the core crate,
//! covering schema inference, value coercion, ingestion and query execution.

use thiserror::Error;
use std::io;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input data does not have the expected shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A raw value could not be converted to its resolved column type
    #[error("Cannot convert value {value} to {target}")]
    ValueConversion {
        /// The offending raw value, rendered for display
        value: String,
        /// The SQL type the value was converted to
        target: String,
    },

    /// The engine rejected table creation or insertion
    #[error("Error inserting row into table with columns [{columns}], error: {message}")]
    Ingestion {
        /// Column definitions of the target table
        columns: String,
        /// Underlying engine message
        message: String,
    },

    /// The embedded engine could not be opened
    #[error("Engine initialization error: {0}")]
    EngineInitialization(String),

    /// The engine rejected a query
    #[error("Query error: {message} (sql: {sql})")]
    Query {
        /// SQL text that was executed
        sql: String,
        /// Underlying engine message
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Convert a string error to a MalformedInput error
pub fn to_malformed_input_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::MalformedInput(err.to_string())
}

/// Convert an engine error to an EngineInitialization error
pub fn to_engine_init_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::EngineInitialization(err.to_string())
}

/// Convert a string error to a ConfigError
pub fn to_config_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::Config(err.to_string())
}

/// Convert a task join error to an Internal error
pub fn to_internal_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::Internal(format!("Task join error: {}", err))
}

/// Build a query error for the given SQL text
pub fn to_query_error<E: std::fmt::Display>(sql: &str, err: E) -> CoreError {
    CoreError::Query {
        sql: sql.to_string(),
        message: err.to_string(),
    }
}
