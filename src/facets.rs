//! # Refinement Filters
//!
//! ## Purpose
//! Derives refinement (facet) filters from the search engine's terms
//! aggregations: for each known filter with more than one observed value in
//! the current result set, a selectable multi-choice filter whose options
//! are the observed bucket keys.

use crate::registry::{base_filter_ids, FilterDefinition, FilterRegistry};
use crate::value::FilterType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One aggregation bucket: an observed value and its document count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// A facet offered for result refinement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementFilter {
    pub filter: FilterDefinition,
    pub counts: Vec<ValueCount>,
}

/// Filters whose facets carry no refinement value and are never offered.
/// Filenames are unique per document and the creation date is served by the
/// monitoring window instead.
const SUPPRESSED_FACETS: [&str; 2] = [base_filter_ids::FILENAME, base_filter_ids::CREATION_DATE];

/// Turn a terms-aggregation response into refinement filters.
///
/// Facets with at most one bucket are dropped: a single observed value
/// cannot narrow the result set. Every emitted facet is forced to
/// MULTI_CHOICE regardless of the underlying filter type, with options
/// replaced by the observed bucket keys, so the caller can always render a
/// checkbox list.
pub fn refinement_filters_from_aggregations(
    aggregations: &Value,
    registry: &FilterRegistry,
) -> Vec<RefinementFilter> {
    let aggregations = match aggregations.as_object() {
        Some(map) => map,
        None => return Vec::new(),
    };

    let mut refinements = Vec::new();

    for (filter_id, agg) in aggregations {
        if SUPPRESSED_FACETS.contains(&filter_id.as_str()) {
            continue;
        }
        let definition = match registry.get(filter_id) {
            Some(def) => def,
            None => {
                tracing::warn!(%filter_id, "aggregation for unknown filter ignored");
                continue;
            }
        };

        let counts = bucket_counts(agg);
        if counts.len() <= 1 {
            continue;
        }

        let mut filter = definition.clone();
        filter.filter_type = Some(FilterType::MultiChoice);
        filter.options = counts.iter().map(|c| c.value.clone()).collect();

        refinements.push(RefinementFilter { filter, counts });
    }

    refinements.sort_by(|a, b| a.filter.id.cmp(&b.filter.id));
    refinements
}

/// Bucket keys arrive as strings or numbers depending on the field mapping;
/// both stringify to a choice id.
fn bucket_counts(aggregation: &Value) -> Vec<ValueCount> {
    aggregation["buckets"]
        .as_array()
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| {
                    let value = match &bucket["key"] {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        _ => return None,
                    };
                    Some(ValueCount {
                        value,
                        count: bucket["doc_count"].as_u64().unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> FilterRegistry {
        FilterRegistry::build([FilterDefinition {
            category_id: Some("watches".to_string()),
            ..FilterDefinition::filter("reference", "Reference", FilterType::Text)
        }])
        .unwrap()
    }

    #[test]
    fn single_bucket_facets_are_suppressed() {
        let aggs = json!({
            "region": { "buckets": [ { "key": "France", "doc_count": 5 } ] }
        });

        assert!(refinement_filters_from_aggregations(&aggs, &registry()).is_empty());
    }

    #[test]
    fn multi_bucket_facets_become_multi_choice() {
        let aggs = json!({
            "region": {
                "buckets": [
                    { "key": "France", "doc_count": 5 },
                    { "key": "Suisse", "doc_count": 2 }
                ]
            }
        });

        let refinements = refinement_filters_from_aggregations(&aggs, &registry());
        assert_eq!(refinements.len(), 1);

        let facet = &refinements[0];
        assert_eq!(facet.filter.id, "region");
        // forced regardless of the registry type (region is SINGLE_CHOICE)
        assert_eq!(facet.filter.filter_type, Some(FilterType::MultiChoice));
        assert_eq!(facet.filter.options, vec!["France", "Suisse"]);
        assert_eq!(
            facet.counts,
            vec![
                ValueCount { value: "France".to_string(), count: 5 },
                ValueCount { value: "Suisse".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn filename_and_creation_date_never_facet() {
        let aggs = json!({
            "filename": {
                "buckets": [
                    { "key": "a.pdf", "doc_count": 1 },
                    { "key": "b.pdf", "doc_count": 1 }
                ]
            },
            "creation-date": {
                "buckets": [
                    { "key": 1700000000000_i64, "doc_count": 3 },
                    { "key": 1710000000000_i64, "doc_count": 4 }
                ]
            }
        });

        assert!(refinement_filters_from_aggregations(&aggs, &registry()).is_empty());
    }

    #[test]
    fn numeric_bucket_keys_are_stringified() {
        let aggs = json!({
            "year": {
                "buckets": [
                    { "key": 1930, "doc_count": 2 },
                    { "key": 1954, "doc_count": 7 }
                ]
            }
        });

        let refinements = refinement_filters_from_aggregations(&aggs, &registry());
        assert_eq!(refinements[0].filter.options, vec!["1930", "1954"]);
    }

    #[test]
    fn unknown_filter_aggregations_are_ignored() {
        let aggs = json!({
            "ghost": {
                "buckets": [
                    { "key": "x", "doc_count": 1 },
                    { "key": "y", "doc_count": 1 }
                ]
            }
        });

        assert!(refinement_filters_from_aggregations(&aggs, &registry()).is_empty());
    }
}
