//! # Search Query Compiler
//!
//! ## Purpose
//! Compiles a search request (free text, category scope, normalized filter
//! values, image embeddings) into the search engine's boolean query JSON,
//! plus the companion aggregation request used for facet counts.
//!
//! ## Input/Output Specification
//! - **Input**: [`SearchRequest`] and pre-computed image embedding vectors
//! - **Output**: `serde_json::Value` query/aggregation bodies for the
//!   search-engine collaborator
//! - **Semantics**: every clause is ANDed at the top level (`bool.must`);
//!   alternatives only exist inside a single clause (`bool.should`)
//!
//! ## Clause order
//! 1. Nested image-similarity clause (best-matching active embedding)
//! 2. Free-text clause (filename short-circuit or description alternatives)
//! 3. One clause per filter value, dispatched on the filter type

use crate::config::Config;
use crate::errors::{FilterSearchError, Result};
use crate::registry::{FilterRegistry, GENERIC_CATEGORY_ID};
use crate::utils::format_search_text;
use crate::value::{DateSearchMode, FilterType, SearchFilterValue, SearchValue, TextSearchMode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A search request as received from the API layer, after the raw filter
/// payloads have been parsed into typed values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub text: Option<String>,
    /// None or `generic` targets every category's index
    pub category_id: Option<String>,
    pub filter_values: Vec<SearchFilterValue>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Compiles requests against a registry snapshot
pub struct QueryCompiler<'a> {
    registry: &'a FilterRegistry,
    config: &'a Config,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(registry: &'a FilterRegistry, config: &'a Config) -> Self {
        Self { registry, config }
    }

    /// Index scope for a category. Generic filters are mapped into every
    /// category's index, so the generic scope is simply the wildcard.
    pub fn index_name(&self, category_id: Option<&str>) -> String {
        match category_id {
            Some(id) if !id.is_empty() && id != GENERIC_CATEGORY_ID => {
                format!("{}{}", id, self.config.index.suffix)
            }
            _ => format!("*{}", self.config.index.suffix),
        }
    }

    /// Compile the boolean query for a request. Either a complete query is
    /// produced or an error is raised; there is no best-effort mode.
    pub fn compile_query(
        &self,
        request: &SearchRequest,
        embeddings: &[Vec<f32>],
    ) -> Result<Value> {
        let mut must_clauses: Vec<Value> = Vec::new();

        if !embeddings.is_empty() {
            must_clauses.push(self.image_similarity_clause(embeddings));
        }

        if let Some(text) = request.text.as_deref() {
            if !text.trim().is_empty() {
                must_clauses.push(self.free_text_clause(text));
            }
        }

        for fv in &request.filter_values {
            if self.registry.get(&fv.filter_id).is_none() {
                return Err(FilterSearchError::UnknownFilter {
                    filter_id: fv.filter_id.clone(),
                });
            }
            fv.validate()?;
            must_clauses.push(self.filter_clause(fv)?);
        }

        tracing::debug!(clauses = must_clauses.len(), "compiled search query");

        Ok(json!({ "bool": { "must": must_clauses } }))
    }

    /// Full engine request body: the compiled query, the facet aggregations
    /// and pagination, with the configured default page size.
    pub fn compile_body(&self, request: &SearchRequest, embeddings: &[Vec<f32>]) -> Result<Value> {
        Ok(json!({
            "query": self.compile_query(request, embeddings)?,
            "aggs": self.aggregation_request(),
            "from": request.offset.unwrap_or(0),
            "size": request.limit.unwrap_or(self.config.search.default_limit)
        }))
    }

    /// Nested similarity clause over the `embeddings` sub-collection,
    /// restricted to active images and OR-combined across the supplied
    /// vectors with best-match scoring.
    fn image_similarity_clause(&self, embeddings: &[Vec<f32>]) -> Value {
        let should: Vec<Value> = embeddings
            .iter()
            .map(|embedding| {
                json!({
                    "script_score": {
                        "query": {
                            "bool": {
                                "must": [{ "term": { "embeddings.importance": 1 } }]
                            }
                        },
                        "script": {
                            "source": "cosineSimilarity(params.embedding, 'embeddings.embedding')",
                            "params": { "embedding": embedding }
                        }
                    }
                })
            })
            .collect();

        json!({
            "nested": {
                "path": "embeddings",
                "score_mode": "max",
                "query": { "bool": { "should": should } }
            }
        })
    }

    /// Free-text clause. A query ending in `.pdf` is an exact filename
    /// lookup; anything else matches the description by phrase, by fuzzy
    /// match and by more-like-this relevance, requiring at least one.
    fn free_text_clause(&self, raw_text: &str) -> Value {
        let text = format_search_text(raw_text);

        let should: Vec<Value> = if raw_text.ends_with(".pdf") {
            vec![json!({ "term": { "filename": { "value": text } } })]
        } else {
            vec![
                json!({ "match": { "description": text } }),
                json!({
                    "match": {
                        "description": {
                            "query": text,
                            "fuzziness": self.config.search.fuzziness
                        }
                    }
                }),
                json!({
                    "more_like_this": {
                        "fields": ["description"],
                        "like": text,
                        "min_term_freq": self.config.search.mlt_min_term_freq,
                        "max_query_terms": self.config.search.mlt_max_query_terms
                    }
                }),
            ]
        };

        json!({
            "bool": {
                "minimum_should_match": 1,
                "should": should
            }
        })
    }

    fn filter_clause(&self, fv: &SearchFilterValue) -> Result<Value> {
        let id = fv.filter_id.as_str();

        let clause = match &fv.value {
            SearchValue::Date {
                first_date,
                second_date,
                mode,
            } => numeric_clause(id, json!(first_date), second_date.as_ref().map(|d| json!(d)), *mode, ExactKind::Match),
            SearchValue::Year {
                first_year,
                second_year,
                mode,
            } => numeric_clause(id, json!(first_year), second_year.map(|y| json!(y)), *mode, ExactKind::Match),
            SearchValue::Integer {
                first_integer,
                second_integer,
                mode,
            } => numeric_clause(id, json!(first_integer), second_integer.map(|i| json!(i)), *mode, ExactKind::Term),
            SearchValue::SingleChoice { choice_id } => {
                json!({ "match": { id: choice_id } })
            }
            SearchValue::MultiChoice { choice_ids } => {
                json!({ "terms": { id: choice_ids } })
            }
            SearchValue::Text { text, mode, negate } => {
                return self.text_clause(id, text.as_deref(), *mode, *negate)
            }
        };

        Ok(clause)
    }

    /// Per-mode clause shapes for text filters. Text fields are keyword-
    /// mapped in the index, so term/prefix/wildcard all apply to the whole
    /// stored value.
    fn text_clause(
        &self,
        id: &str,
        text: Option<&str>,
        mode: TextSearchMode,
        negate: bool,
    ) -> Result<Value> {
        let clause = match (mode, text) {
            (TextSearchMode::IsNull, _) => {
                // ISNULL asks for documents where the field is absent;
                // negation flips it into a plain existence check.
                let exists = json!({ "exists": { "field": id } });
                return Ok(if negate {
                    exists
                } else {
                    json!({ "bool": { "must_not": [exists] } })
                });
            }
            (_, None) => {
                return Err(FilterSearchError::ValidationFailed {
                    field: id.to_string(),
                    reason: format!("text is required for mode {:?}", mode),
                })
            }
            (TextSearchMode::Equal | TextSearchMode::IsIn, Some(text)) => {
                json!({ "term": { id: { "value": text } } })
            }
            (TextSearchMode::Contains, Some(text)) => {
                json!({ "wildcard": { id: { "value": format!("*{}*", text) } } })
            }
            (TextSearchMode::StartsWith, Some(text)) => {
                json!({ "prefix": { id: { "value": text } } })
            }
            (TextSearchMode::EndsWith, Some(text)) => {
                json!({ "wildcard": { id: { "value": format!("*{}", text) } } })
            }
        };

        Ok(if negate {
            json!({ "bool": { "must_not": [clause] } })
        } else {
            clause
        })
    }

    /// Terms aggregation per known filter, used to derive refinement
    /// filters. Text-backed fields aggregate on their keyword subfield.
    pub fn aggregation_request(&self) -> Value {
        let mut aggs = serde_json::Map::new();

        for def in self.registry.filters() {
            let field = if def.filter_type == Some(FilterType::Text) {
                format!("{}.keyword", def.id)
            } else {
                def.id.clone()
            };

            aggs.insert(
                def.id.clone(),
                json!({
                    "terms": {
                        "field": field,
                        "size": self.config.search.aggregation_size
                    }
                }),
            );
        }

        Value::Object(aggs)
    }

    /// Query matching documents that have at least one image closely similar
    /// to the supplied embedding, used to mark junk images as inactive. The
    /// caller applies [`crate::config::SearchConfig::deactivation_min_score`]
    /// as `min_score`.
    pub fn deactivation_query(&self, embedding: &[f32]) -> Value {
        json!({
            "bool": {
                "must": [{
                    "nested": {
                        "inner_hits": { "size": self.config.search.deactivation_inner_hits },
                        "path": "embeddings",
                        "score_mode": "max",
                        "query": {
                            "bool": {
                                "must": {
                                    "script_score": {
                                        "query": { "match_all": {} },
                                        "script": {
                                            "source": "cosineSimilarity(params.embedding, 'embeddings.embedding')",
                                            "params": { "embedding": embedding }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }]
            }
        })
    }
}

/// Which exact-match clause a point comparison compiles to
#[derive(Clone, Copy)]
enum ExactKind {
    Match,
    Term,
}

/// Shared range/point logic for date, year and integer filters: a present
/// second endpoint always wins and compiles to a closed range, with the
/// mode ignored; otherwise the mode picks the bound (absent mode means
/// EQUAL).
fn numeric_clause(
    id: &str,
    first: Value,
    second: Option<Value>,
    mode: Option<DateSearchMode>,
    exact: ExactKind,
) -> Value {
    if let Some(second) = second {
        return json!({ "range": { id: { "gte": first, "lte": second } } });
    }

    match mode.unwrap_or(DateSearchMode::Equal) {
        DateSearchMode::Equal => match exact {
            ExactKind::Match => json!({ "match": { id: first } }),
            ExactKind::Term => json!({ "term": { id: first } }),
        },
        DateSearchMode::Before => json!({ "range": { id: { "lt": first } } }),
        DateSearchMode::After => json!({ "range": { id: { "gt": first } } }),
        DateSearchMode::BeforeOrEqual => json!({ "range": { id: { "lte": first } } }),
        DateSearchMode::AfterOrEqual => json!({ "range": { id: { "gte": first } } }),
    }
}
