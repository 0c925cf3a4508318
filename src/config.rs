//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the filter/search core: query-compilation
//! tuning, index naming/mapping parameters, embedding dimensionality and
//! logging, with type-safe access and validation.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Range checks with detailed error messages
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables
//! 2. Configuration files
//! 3. Default values
//!
//! ## Usage
//! ```rust,no_run
//! use filter_semantic_search::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! assert!(config.search.aggregation_size > 0);
//! ```

use crate::errors::{FilterSearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all core settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Query compilation behavior
    pub search: SearchConfig,
    /// Index naming and mapping parameters
    pub index: IndexConfig,
    /// Image embedding parameters
    pub embeddings: EmbeddingsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Query compilation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default page size when a request specifies none
    pub default_limit: u64,
    /// Number of buckets requested per facet aggregation
    pub aggregation_size: u32,
    /// Edit distance for the fuzzy description clause
    pub fuzziness: u8,
    /// `more_like_this` minimum term frequency
    pub mlt_min_term_freq: u32,
    /// `more_like_this` maximum query terms
    pub mlt_max_query_terms: u32,
    /// Cosine similarity above which a matching image is deactivated as junk
    pub deactivation_min_score: f64,
    /// Inner hits fetched per document when matching junk images
    pub deactivation_inner_hits: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            aggregation_size: 10,
            fuzziness: 2,
            mlt_min_term_freq: 1,
            mlt_max_query_terms: 12,
            deactivation_min_score: 0.95,
            deactivation_inner_hits: 100,
        }
    }
}

/// Index naming and mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Suffix appended to a category id to form its index name
    pub suffix: String,
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            suffix: "_index".to_string(),
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

/// Image embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// Vector dimensionality (must match the inference endpoint's output)
    pub dimensions: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self { dimensions: 512 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| FilterSearchError::Config {
            message: format!("failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|e| FilterSearchError::Config {
                message: format!("failed to parse config file {:?}: {}", path, e),
            })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("FILTER_SEARCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(suffix) = std::env::var("FILTER_SEARCH_INDEX_SUFFIX") {
            self.index.suffix = suffix;
        }
        if let Ok(dims) = std::env::var("FILTER_SEARCH_EMBEDDING_DIMENSIONS") {
            self.embeddings.dimensions =
                dims.parse().map_err(|_| FilterSearchError::Config {
                    message: "invalid FILTER_SEARCH_EMBEDDING_DIMENSIONS".to_string(),
                })?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.aggregation_size == 0 {
            return Err(FilterSearchError::Config {
                message: "search.aggregation_size must be greater than zero".to_string(),
            });
        }
        if self.embeddings.dimensions == 0 {
            return Err(FilterSearchError::Config {
                message: "embeddings.dimensions must be greater than zero".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.search.deactivation_min_score) {
            return Err(FilterSearchError::Config {
                message: "search.deactivation_min_score must be within [0, 1]".to_string(),
            });
        }
        if self.index.suffix.is_empty() {
            return Err(FilterSearchError::Config {
                message: "index.suffix must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Initialize the global tracing subscriber from the logging configuration.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
