//! # Filter-Driven Semantic Document Search Core
//!
//! ## Overview
//! This library implements the filter and search core of a document
//! management system: typed polymorphic filter values, a denormalized
//! persistence row shape, and a compiler from search requests to the search
//! engine's boolean query DSL with image-embedding similarity clauses.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `value`: Typed filter-value unions for the search and document alphabets
//! - `row`: Bidirectional normalizer between typed values and flat rows
//! - `registry`: Read-only catalog of filter definitions and groupings
//! - `compiler`: Search-request to engine-query compilation
//! - `facets`: Refinement filters derived from aggregation buckets
//! - `results`: Engine-response parsing, score normalization, image filtering
//! - `indexing`: Document-body and index-mapping builders
//! - `monitor`: Saved-search monitoring windows
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Filter definitions, raw filter-value payloads, search requests,
//!   image embedding vectors, engine response JSON
//! - **Output**: Engine query/aggregation/mapping bodies, normalized results,
//!   refinement filters
//! - **Boundaries**: The engine client, persistence, inference and delivery
//!   stay with the surrounding services; this crate only transforms data
//!
//! ## Usage
//! ```rust,no_run
//! use filter_semantic_search::{Config, FilterRegistry, QueryCompiler, SearchRequest};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let registry = FilterRegistry::build([])?;
//!     let compiler = QueryCompiler::new(&registry, &config);
//!
//!     let request: SearchRequest = serde_json::from_str(r#"{"text": "montre"}"#)?;
//!     let query = compiler.compile_query(&request, &[])?;
//!     println!("{}", serde_json::to_string_pretty(&query)?);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod value;
pub mod row;
pub mod registry;
pub mod compiler;
pub mod facets;
pub mod results;
pub mod indexing;
pub mod monitor;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use compiler::{QueryCompiler, SearchRequest};
pub use config::{init_logging, Config};
pub use errors::{FilterSearchError, Result};
pub use facets::{RefinementFilter, ValueCount};
pub use indexing::{IndexableDocument, IndexedEmbedding};
pub use monitor::MonitoringFrequency;
pub use registry::{FilterDefinition, FilterKind, FilterRegistry};
pub use results::{SearchOutcome, SearchResult};
pub use row::FlatFilterValueRow;
pub use value::{
    DateSearchMode, DocumentFilterValue, DocumentValue, FilterType, SearchFilterValue,
    SearchValue, TextSearchMode,
};
