//! # Search Result Formatting
//!
//! ## Purpose
//! Turns the search engine's native response JSON into the API result shape:
//! normalized relevance scores, extracted totals with the "more than"
//! marker, and document images restricted to the active (importance 1)
//! embeddings the engine actually matched.
//!
//! ## Input/Output Specification
//! - **Input**: The raw engine response (`hits`, `aggregations`), the filter
//!   registry and a document's stored image list
//! - **Output**: [`SearchOutcome`] with scores in `[0, 1]` and refinement
//!   filters attached

use crate::errors::Result;
use crate::facets::{refinement_filters_from_aggregations, RefinementFilter};
use crate::indexing::IndexedEmbedding;
use crate::registry::FilterRegistry;
use crate::row::FlatFilterValueRow;
use crate::utils::filename_key;
use crate::value::SearchFilterValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// One formatted hit: the indexed source plus a normalized score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    /// Relevance relative to the best hit of this response, in `[0, 1]`
    pub score: f64,
    pub source: Value,
}

/// The complete formatted response for one search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub total: u64,
    /// True when the engine reports the total as a lower bound
    pub more_than: bool,
    pub refinement_filters: Vec<RefinementFilter>,
}

/// Parse an engine response into the API result shape.
///
/// Scores are divided by the response's `max_score` so the best hit is
/// always 1.0; an absent or zero `max_score` divides by 1 instead, leaving
/// raw scores untouched rather than producing NaN on empty or unscored
/// responses.
pub fn parse_response(response: &Value, registry: &FilterRegistry) -> Result<SearchOutcome> {
    let hits = &response["hits"];

    let max_score = match hits["max_score"].as_f64() {
        Some(s) if s > 0.0 => s,
        _ => 1.0,
    };

    let results: Vec<SearchResult> = hits["hits"]
        .as_array()
        .map(|raw_hits| {
            raw_hits
                .iter()
                .map(|hit| SearchResult {
                    id: hit["_id"].as_str().unwrap_or_default().to_string(),
                    score: hit["_score"].as_f64().unwrap_or(0.0) / max_score,
                    source: hit["_source"].clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let (total, more_than) = extract_total(&hits["total"]);

    let refinement_filters =
        refinement_filters_from_aggregations(&response["aggregations"], registry);

    tracing::debug!(
        results = results.len(),
        total,
        more_than,
        facets = refinement_filters.len(),
        "parsed engine response"
    );

    Ok(SearchOutcome {
        results,
        total,
        more_than,
        refinement_filters,
    })
}

/// The engine reports `total` either as a bare number or as
/// `{value, relation}` where relation `gte` marks a truncated count.
fn extract_total(total: &Value) -> (u64, bool) {
    if let Some(n) = total.as_u64() {
        return (n, false);
    }
    let value = total["value"].as_u64().unwrap_or(0);
    let more_than = total["relation"].as_str() == Some("gte");
    (value, more_than)
}

/// Keep only the images whose embedding is still active in the index.
///
/// The index stores one embedding per image under the image's object key;
/// importance 0 marks an image deactivated as junk. Stored image URLs are
/// matched against active keys by their last path segment.
pub fn active_images<'a, T>(
    images: &'a [T],
    embeddings: &[IndexedEmbedding],
    image_url: impl Fn(&T) -> &str,
) -> Vec<&'a T> {
    let active_keys: HashSet<&str> = embeddings
        .iter()
        .filter(|e| e.importance == 1)
        .map(|e| e.key.as_str())
        .collect();

    images
        .iter()
        .filter(|image| active_keys.contains(filename_key(image_url(image))))
        .collect()
}

/// Read persisted flat rows back into typed search filter values, e.g. when
/// loading a saved search for re-execution or editing.
pub fn denormalize_rows(rows: &[FlatFilterValueRow]) -> Result<Vec<SearchFilterValue>> {
    rows.iter().map(FlatFilterValueRow::to_search_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> FilterRegistry {
        FilterRegistry::build([]).unwrap()
    }

    fn response_with_scores(max_score: Value, scores: &[f64]) -> Value {
        let hits: Vec<Value> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| json!({ "_id": format!("doc-{}", i), "_score": s, "_source": {} }))
            .collect();

        json!({
            "hits": {
                "total": { "value": scores.len(), "relation": "eq" },
                "max_score": max_score,
                "hits": hits
            }
        })
    }

    #[test]
    fn scores_normalize_to_best_hit() {
        let response = response_with_scores(json!(10.0), &[10.0, 5.0, 2.0]);
        let outcome = parse_response(&response, &registry()).unwrap();

        let scores: Vec<f64> = outcome.results.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1.0, 0.5, 0.2]);
    }

    #[test]
    fn missing_max_score_leaves_raw_scores() {
        let response = response_with_scores(Value::Null, &[3.0]);
        let outcome = parse_response(&response, &registry()).unwrap();
        assert_eq!(outcome.results[0].score, 3.0);

        let response = response_with_scores(json!(0.0), &[0.0]);
        let outcome = parse_response(&response, &registry()).unwrap();
        assert_eq!(outcome.results[0].score, 0.0);
    }

    #[test]
    fn total_relation_gte_sets_more_than() {
        let response = json!({
            "hits": {
                "total": { "value": 10000, "relation": "gte" },
                "max_score": 1.0,
                "hits": []
            }
        });

        let outcome = parse_response(&response, &registry()).unwrap();
        assert_eq!(outcome.total, 10000);
        assert!(outcome.more_than);

        // bare-number totals never mark a lower bound
        let response = json!({ "hits": { "total": 42, "hits": [] } });
        let outcome = parse_response(&response, &registry()).unwrap();
        assert_eq!(outcome.total, 42);
        assert!(!outcome.more_than);
    }

    #[test]
    fn aggregations_flow_into_refinement_filters() {
        let response = json!({
            "hits": { "total": 2, "max_score": 1.0, "hits": [] },
            "aggregations": {
                "region": {
                    "buckets": [
                        { "key": "France", "doc_count": 1 },
                        { "key": "USA", "doc_count": 1 }
                    ]
                }
            }
        });

        let outcome = parse_response(&response, &registry()).unwrap();
        assert_eq!(outcome.refinement_filters.len(), 1);
        assert_eq!(outcome.refinement_filters[0].filter.id, "region");
    }

    #[test]
    fn inactive_images_are_filtered_out() {
        struct Image {
            url: String,
        }
        let images = vec![
            Image { url: "https://cdn.example.com/docs/a".to_string() },
            Image { url: "https://cdn.example.com/docs/b".to_string() },
        ];
        let embeddings = vec![
            IndexedEmbedding {
                embedding: vec![0.0; 4],
                key: "a".to_string(),
                importance: 1,
            },
            IndexedEmbedding {
                embedding: vec![0.0; 4],
                key: "b".to_string(),
                importance: 0,
            },
        ];

        let kept = active_images(&images, &embeddings, |i| i.url.as_str());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://cdn.example.com/docs/a");
    }

    #[test]
    fn rows_denormalize_back_to_search_values() {
        use crate::value::{SearchValue, TextSearchMode};

        let value = SearchFilterValue {
            filter_id: "reference".to_string(),
            value: SearchValue::Text {
                text: Some("W-1042".to_string()),
                mode: TextSearchMode::Equal,
                negate: false,
            },
        };
        let rows = vec![FlatFilterValueRow::from_search_value(&value)];

        assert_eq!(denormalize_rows(&rows).unwrap(), vec![value]);
    }
}
