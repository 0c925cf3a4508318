//! # Filter Value Types
//!
//! ## Purpose
//! Typed, discriminated unions for the two filter-value input alphabets:
//! search-query filter values (which carry comparison modes and optional
//! range endpoints) and document filter values (assigned values only).
//!
//! ## Input/Output Specification
//! - **Input**: Raw JSON payloads shaped `{filterId, type, ...}` (search) or
//!   `{filterId, type, value: {...}}` (document creation)
//! - **Output**: Exhaustively-matchable sum types over the six filter variants
//! - **Failure**: Any `type` discriminator outside the six known variants is
//!   rejected with [`FilterSearchError::UnrecognizedFilterType`]
//!
//! The wire field names (`filterId`, `firstYear`, `choiceIds`, ...) match the
//! stored/API representation and must not change.

use crate::errors::{FilterSearchError, Result};
use serde::{Deserialize, Serialize};

/// The six semantic filter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    Year,
    Date,
    Text,
    Integer,
    SingleChoice,
    MultiChoice,
}

impl FilterType {
    /// Parse a raw discriminator tag, rejecting anything outside the six
    /// known variants.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "YEAR" => Ok(FilterType::Year),
            "DATE" => Ok(FilterType::Date),
            "TEXT" => Ok(FilterType::Text),
            "INTEGER" => Ok(FilterType::Integer),
            "SINGLE_CHOICE" => Ok(FilterType::SingleChoice),
            "MULTI_CHOICE" => Ok(FilterType::MultiChoice),
            other => Err(FilterSearchError::UnrecognizedFilterType {
                type_tag: other.to_string(),
            }),
        }
    }
}

/// Comparison mode for date, year and integer filters.
/// Ignored whenever a second range endpoint is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateSearchMode {
    Before,
    After,
    Equal,
    BeforeOrEqual,
    AfterOrEqual,
}

/// Comparison mode for text filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSearchMode {
    #[serde(rename = "EQUAL")]
    Equal,
    #[serde(rename = "CONTAINS")]
    Contains,
    #[serde(rename = "ISIN")]
    IsIn,
    #[serde(rename = "STARTSWITH")]
    StartsWith,
    #[serde(rename = "ENDSWITH")]
    EndsWith,
    #[serde(rename = "ISNULL")]
    IsNull,
}

/// A normalized search-query filter value: one criterion against one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilterValue {
    pub filter_id: String,
    #[serde(flatten)]
    pub value: SearchValue,
}

/// The type-specific payload of a search filter value.
///
/// Presence of a `second*` endpoint always means "closed range, mode is
/// ignored"; absence means a point comparison using `mode`. For TEXT, the
/// text payload is absent only in `ISNULL` mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SearchValue {
    #[serde(rename = "YEAR", rename_all = "camelCase")]
    Year {
        first_year: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_year: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<DateSearchMode>,
    },
    #[serde(rename = "DATE", rename_all = "camelCase")]
    Date {
        /// ISO date (`YYYY-MM-DD`) or full ISO timestamp
        first_date: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<DateSearchMode>,
    },
    #[serde(rename = "TEXT", rename_all = "camelCase")]
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        mode: TextSearchMode,
        #[serde(default)]
        negate: bool,
    },
    #[serde(rename = "INTEGER", rename_all = "camelCase")]
    Integer {
        first_integer: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_integer: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<DateSearchMode>,
    },
    #[serde(rename = "SINGLE_CHOICE", rename_all = "camelCase")]
    SingleChoice { choice_id: String },
    #[serde(rename = "MULTI_CHOICE", rename_all = "camelCase")]
    MultiChoice { choice_ids: Vec<String> },
}

impl SearchFilterValue {
    /// Parse a raw search filter value payload.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self> {
        let tag = raw.get("type").and_then(serde_json::Value::as_str);
        FilterType::parse(tag.unwrap_or_default())?;
        Ok(serde_json::from_value(raw.clone())?)
    }

    /// The semantic type of this value
    pub fn filter_type(&self) -> FilterType {
        match self.value {
            SearchValue::Year { .. } => FilterType::Year,
            SearchValue::Date { .. } => FilterType::Date,
            SearchValue::Text { .. } => FilterType::Text,
            SearchValue::Integer { .. } => FilterType::Integer,
            SearchValue::SingleChoice { .. } => FilterType::SingleChoice,
            SearchValue::MultiChoice { .. } => FilterType::MultiChoice,
        }
    }

    /// Reject values that cannot compile into a meaningful query: inverted
    /// ranges, empty choice sets, and text modes missing their payload.
    pub fn validate(&self) -> Result<()> {
        match &self.value {
            SearchValue::Year {
                first_year,
                second_year: Some(second),
                ..
            } if second < first_year => Err(FilterSearchError::InvalidRange {
                filter_id: self.filter_id.clone(),
                details: format!("secondYear {} < firstYear {}", second, first_year),
            }),
            SearchValue::Integer {
                first_integer,
                second_integer: Some(second),
                ..
            } if second < first_integer => Err(FilterSearchError::InvalidRange {
                filter_id: self.filter_id.clone(),
                details: format!("secondInteger {} < firstInteger {}", second, first_integer),
            }),
            // ISO dates compare correctly as strings
            SearchValue::Date {
                first_date,
                second_date: Some(second),
                ..
            } if second < first_date => Err(FilterSearchError::InvalidRange {
                filter_id: self.filter_id.clone(),
                details: format!("secondDate {} < firstDate {}", second, first_date),
            }),
            SearchValue::Text {
                text: None, mode, ..
            } if *mode != TextSearchMode::IsNull => Err(FilterSearchError::ValidationFailed {
                field: self.filter_id.clone(),
                reason: format!("text is required for mode {:?}", mode),
            }),
            SearchValue::MultiChoice { choice_ids } if choice_ids.is_empty() => {
                Err(FilterSearchError::ValidationFailed {
                    field: self.filter_id.clone(),
                    reason: "choiceIds must not be empty".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// A document filter value: a value assigned to a document at creation time.
/// Documents carry assigned values, not range queries, so there are no
/// `second*` fields or comparison modes in this alphabet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilterValue {
    pub filter_id: String,
    #[serde(flatten)]
    pub value: DocumentValue,
}

/// Type-specific payload of a document filter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DocumentValue {
    #[serde(rename = "YEAR")]
    Year { year: i64 },
    #[serde(rename = "DATE")]
    Date { date: String },
    #[serde(rename = "TEXT")]
    Text { text: String },
    #[serde(rename = "INTEGER")]
    Integer { integer: i64 },
    #[serde(rename = "SINGLE_CHOICE", rename_all = "camelCase")]
    SingleChoice { choice_id: String },
    #[serde(rename = "MULTI_CHOICE", rename_all = "camelCase")]
    MultiChoice { choice_ids: Vec<String> },
}

impl DocumentFilterValue {
    /// Parse a raw document filter value payload.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self> {
        let tag = raw.get("type").and_then(serde_json::Value::as_str);
        FilterType::parse(tag.unwrap_or_default())?;
        Ok(serde_json::from_value(raw.clone())?)
    }

    /// The semantic type of this value
    pub fn filter_type(&self) -> FilterType {
        match self.value {
            DocumentValue::Year { .. } => FilterType::Year,
            DocumentValue::Date { .. } => FilterType::Date,
            DocumentValue::Text { .. } => FilterType::Text,
            DocumentValue::Integer { .. } => FilterType::Integer,
            DocumentValue::SingleChoice { .. } => FilterType::SingleChoice,
            DocumentValue::MultiChoice { .. } => FilterType::MultiChoice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_value_round_trips_through_json() {
        let raw = json!({
            "filterId": "year",
            "type": "YEAR",
            "firstYear": 2000,
            "secondYear": 2010
        });

        let parsed = SearchFilterValue::from_json(&raw).unwrap();
        assert_eq!(parsed.filter_type(), FilterType::Year);
        assert_eq!(
            parsed.value,
            SearchValue::Year {
                first_year: 2000,
                second_year: Some(2010),
                mode: None
            }
        );

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let raw = json!({ "filterId": "f", "type": "BOGUS", "value": {} });

        let err = DocumentFilterValue::from_json(&raw).unwrap_err();
        assert!(matches!(
            err,
            FilterSearchError::UnrecognizedFilterType { ref type_tag } if type_tag == "BOGUS"
        ));

        let err = SearchFilterValue::from_json(&raw).unwrap_err();
        assert!(matches!(
            err,
            FilterSearchError::UnrecognizedFilterType { .. }
        ));
    }

    #[test]
    fn document_value_parses_nested_shape() {
        let raw = json!({
            "filterId": "depot",
            "type": "SINGLE_CHOICE",
            "value": { "choiceId": "INPI" }
        });

        let parsed = DocumentFilterValue::from_json(&raw).unwrap();
        assert_eq!(
            parsed.value,
            DocumentValue::SingleChoice {
                choice_id: "INPI".to_string()
            }
        );
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let value = SearchFilterValue {
            filter_id: "year".to_string(),
            value: SearchValue::Year {
                first_year: 2010,
                second_year: Some(2000),
                mode: None,
            },
        };
        assert!(matches!(
            value.validate(),
            Err(FilterSearchError::InvalidRange { .. })
        ));

        let value = SearchFilterValue {
            filter_id: "creation-date".to_string(),
            value: SearchValue::Date {
                first_date: "2024-05-01".to_string(),
                second_date: Some("2024-01-01".to_string()),
                mode: None,
            },
        };
        assert!(matches!(
            value.validate(),
            Err(FilterSearchError::InvalidRange { .. })
        ));
    }

    #[test]
    fn text_without_payload_is_only_valid_for_isnull() {
        let isnull = SearchFilterValue {
            filter_id: "reference".to_string(),
            value: SearchValue::Text {
                text: None,
                mode: TextSearchMode::IsNull,
                negate: false,
            },
        };
        assert!(isnull.validate().is_ok());

        let contains = SearchFilterValue {
            filter_id: "reference".to_string(),
            value: SearchValue::Text {
                text: None,
                mode: TextSearchMode::Contains,
                negate: false,
            },
        };
        assert!(matches!(
            contains.validate(),
            Err(FilterSearchError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn text_mode_tags_match_wire_format() {
        assert_eq!(
            serde_json::to_value(TextSearchMode::StartsWith).unwrap(),
            json!("STARTSWITH")
        );
        assert_eq!(
            serde_json::to_value(TextSearchMode::IsIn).unwrap(),
            json!("ISIN")
        );
        assert_eq!(
            serde_json::to_value(DateSearchMode::AfterOrEqual).unwrap(),
            json!("AFTER_OR_EQUAL")
        );
    }
}
