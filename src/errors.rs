//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the filter/search core, providing structured
//! error types shared by the registry, normalizer and query compiler.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from filter parsing, validation and compilation
//! - **Output**: Structured error types with context, suitable for mapping to
//!   client-facing responses by the surrounding request layer
//! - **Error Categories**: Normalizer, Registry, Validation, Configuration
//!
//! ## Propagation policy
//! The normalizer and compiler raise synchronously and never return partial
//! results: either a complete row/query is produced or an error is raised.
//! Errors flagged by [`FilterSearchError::is_client_error`] indicate a bad
//! request payload (unknown filter, inverted range); everything else is a
//! server-side fault.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, FilterSearchError>;

/// Error types for the filter/search query core
#[derive(Debug, Error)]
pub enum FilterSearchError {
    /// A `type` discriminator outside the six known filter variants.
    /// Always fatal: it indicates a schema mismatch between the registry
    /// and the payload, never a user mistake to be silently dropped.
    #[error("filter type not recognized: {type_tag}")]
    UnrecognizedFilterType { type_tag: String },

    /// A filter id that is not present in the registry snapshot
    #[error("filter '{filter_id}' not found in registry")]
    UnknownFilter { filter_id: String },

    /// A range filter value where the second endpoint precedes the first
    #[error("invalid range for filter '{filter_id}': {details}")]
    InvalidRange { filter_id: String, details: String },

    /// A persisted flat row missing the field its type requires
    #[error("malformed row for filter '{filter_id}': {details}")]
    MalformedRow { filter_id: String, details: String },

    /// Validation errors on request payloads or filter definitions
    #[error("validation failed for '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterSearchError {
    /// Whether the error should surface as a client error (bad request)
    /// rather than an internal fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FilterSearchError::UnknownFilter { .. }
                | FilterSearchError::InvalidRange { .. }
                | FilterSearchError::ValidationFailed { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            FilterSearchError::UnrecognizedFilterType { .. }
            | FilterSearchError::MalformedRow { .. } => "normalizer",
            FilterSearchError::UnknownFilter { .. } => "registry",
            FilterSearchError::InvalidRange { .. }
            | FilterSearchError::ValidationFailed { .. } => "validation",
            FilterSearchError::Config { .. } | FilterSearchError::Toml(_) => "configuration",
            FilterSearchError::Json(_) | FilterSearchError::Io(_) => "generic",
        }
    }
}
