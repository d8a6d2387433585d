//! Configuration for the core crate
//!
//! This module provides configuration options for schema inference and
//! ingestion, loadable from and savable to JSON files.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ingest::DEFAULT_CHUNK_SIZE;
use crate::schema::{ColumnTypeResolver, TypeOverrides, DEFAULT_SAMPLE_SIZE};

/// Schema inference configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Number of leading rows sampled per column
    pub sample_size: usize,

    /// Whether a column labelled `id` becomes the primary key
    pub enforce_primary_key: bool,

    /// Remapping of resolved types
    pub overrides: TypeOverrides,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        InferenceConfig {
            sample_size: DEFAULT_SAMPLE_SIZE,
            enforce_primary_key: true,
            overrides: TypeOverrides::default(),
        }
    }
}

impl InferenceConfig {
    /// Resolver configured with these settings
    pub fn resolver(&self) -> ColumnTypeResolver {
        ColumnTypeResolver::new()
            .with_sample_size(self.sample_size)
            .with_primary_key(self.enforce_primary_key)
            .with_overrides(self.overrides.clone())
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Rows per insert statement
    pub chunk_size: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        IngestionConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Static database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticDbConfig {
    /// Schema inference configuration
    pub inference: InferenceConfig,

    /// Ingestion configuration
    pub ingestion: IngestionConfig,

    /// Log level
    pub log_level: String,

    /// Whether to enable debug mode
    pub debug_mode: bool,
}

impl Default for StaticDbConfig {
    fn default() -> Self {
        StaticDbConfig {
            inference: InferenceConfig::default(),
            ingestion: IngestionConfig::default(),
            log_level: "info".to_string(),
            debug_mode: false,
        }
    }
}

impl StaticDbConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self, CoreError> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<(), CoreError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config
    }

    /// Create a testing configuration
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config.inference.sample_size = 50;
        config.ingestion.chunk_size = 10;
        config
    }
}
