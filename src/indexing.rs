//! # Index Projection Builders
//!
//! ## Purpose
//! Pure builders for the write side of the search engine: the per-document
//! body projected from stored filter-value rows, the per-category field
//! mapping derived from the filter registry, and the index settings.
//!
//! ## Input/Output Specification
//! - **Input**: An [`IndexableDocument`] (stored rows plus file metadata and
//!   image embeddings), the [`FilterRegistry`] and [`Config`]
//! - **Output**: `serde_json::Value` bodies the surrounding service ships to
//!   the engine verbatim
//! - **Failure**: A stored row missing its type or its typed value is
//!   rejected with [`FilterSearchError::MalformedRow`]

use crate::config::Config;
use crate::errors::{FilterSearchError, Result};
use crate::registry::{base_filter_ids, FilterRegistry};
use crate::row::FlatFilterValueRow;
use crate::value::FilterType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// One image embedding as stored in the index's nested `embeddings` field.
/// Importance 1 marks an active image; 0 marks one deactivated as junk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedEmbedding {
    pub embedding: Vec<f32>,
    /// Object key of the source image, matched against image URLs by their
    /// last path segment
    pub key: String,
    pub importance: i32,
}

impl IndexedEmbedding {
    /// A freshly indexed embedding starts active
    pub fn active(embedding: Vec<f32>, key: impl Into<String>) -> Self {
        Self {
            embedding,
            key: key.into(),
            importance: 1,
        }
    }
}

/// Generated object key for a newly stored document or image
pub fn new_object_key() -> String {
    Uuid::new_v4().to_string()
}

/// Everything needed to project one document into its index body
#[derive(Debug, Clone)]
pub struct IndexableDocument {
    pub filename: String,
    pub file_url: String,
    /// Extracted full text of the document
    pub full_text: String,
    pub created_at: NaiveDate,
    pub filter_values: Vec<FlatFilterValueRow>,
    pub embeddings: Vec<IndexedEmbedding>,
}

/// Build the engine document body.
///
/// Each stored row projects to one flat field keyed by its filter id.
/// A synthetic `creation-date` value is injected from the creation
/// timestamp, and the description concatenates the full text with the
/// names and values of every choice filter so free-text search reaches
/// choice assignments too.
pub fn document_body(document: &IndexableDocument, registry: &FilterRegistry) -> Result<Value> {
    let mut body = Map::new();

    let mut description = document.full_text.clone();

    for row in &document.filter_values {
        let value = engine_value(row)?;
        body.insert(row.filter_id.clone(), value);

        if !row.choice_ids.is_empty() {
            match registry.get_name(&row.filter_id) {
                Ok(name) => {
                    description.push(' ');
                    description.push_str(name);
                    for choice in &row.choice_ids {
                        description.push(' ');
                        description.push_str(choice);
                    }
                }
                Err(_) => {
                    tracing::warn!(filter_id = %row.filter_id, "stored row for unknown filter");
                }
            }
        }
    }

    body.insert(
        base_filter_ids::CREATION_DATE.to_string(),
        json!(document.created_at.format("%Y-%m-%d").to_string()),
    );
    body.insert("description".to_string(), json!(description));
    body.insert("filename".to_string(), json!(document.filename));
    body.insert("fileUrl".to_string(), json!(document.file_url));
    body.insert("embeddings".to_string(), json!(document.embeddings));

    Ok(Value::Object(body))
}

/// The engine value for one stored row, per variant
fn engine_value(row: &FlatFilterValueRow) -> Result<Value> {
    let malformed = |field: &str| FilterSearchError::MalformedRow {
        filter_id: row.filter_id.clone(),
        details: format!("missing {}", field),
    };

    let filter_type = row.filter_type.ok_or_else(|| malformed("type"))?;

    Ok(match filter_type {
        FilterType::Year | FilterType::Integer => {
            json!(row.integer_value.ok_or_else(|| malformed("integerValue"))?)
        }
        FilterType::Date | FilterType::Text => {
            json!(row
                .string_value
                .as_ref()
                .ok_or_else(|| malformed("stringValue"))?)
        }
        FilterType::SingleChoice | FilterType::MultiChoice => json!(row.choice_ids),
    })
}

/// The engine field mapping for every filter the registry knows, plus the
/// fixed document fields and the nested dense-vector embeddings mapping.
pub fn mapping_properties(registry: &FilterRegistry, config: &Config) -> Value {
    let mut properties = Map::new();

    for def in registry.filters() {
        let field_type = match def.filter_type {
            Some(FilterType::Date) => "date",
            Some(FilterType::Year) | Some(FilterType::Integer) => "integer",
            _ => "keyword",
        };
        properties.insert(def.id.clone(), json!({ "type": field_type }));
    }

    properties.insert("description".to_string(), json!({ "type": "text" }));
    properties.insert("filename".to_string(), json!({ "type": "keyword" }));
    properties.insert(
        "embeddings".to_string(),
        json!({
            "type": "nested",
            "properties": {
                "embedding": {
                    "type": "dense_vector",
                    "dims": config.embeddings.dimensions,
                    "index": true,
                    "similarity": "cosine"
                },
                "importance": { "type": "integer" },
                "key": { "type": "text", "index": false }
            }
        }),
    );

    json!({ "properties": Value::Object(properties) })
}

/// Index creation settings from the configured shard layout
pub fn index_settings(config: &Config) -> Value {
    json!({
        "settings": {
            "number_of_shards": config.index.number_of_shards,
            "number_of_replicas": config.index.number_of_replicas
        }
    })
}
