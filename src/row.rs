//! # Flat Row Normalizer
//!
//! ## Purpose
//! Bidirectional mapping between the typed filter-value unions and the single
//! denormalized row shape used for persistence. One row per (document-or-
//! search, filterId) pair; the same flat schema backs both input alphabets.
//!
//! ## Input/Output Specification
//! - **Input**: [`DocumentFilterValue`] / [`SearchFilterValue`] (write side),
//!   or a persisted [`FlatFilterValueRow`] (read side)
//! - **Output**: The opposite representation
//! - **Round-trip**: identity for YEAR/DATE/TEXT/INTEGER/MULTI_CHOICE; a
//!   SINGLE_CHOICE value reads back as MULTI_CHOICE (see
//!   [`FlatFilterValueRow::to_search_value`])
//!
//! Exactly one of `{stringValue, integerValue, choiceIds}` is semantically
//! populated per type; the others stay null/empty. This is a deliberate
//! denormalization kept bit-compatible with existing stored rows.

use crate::errors::{FilterSearchError, Result};
use crate::value::{
    DateSearchMode, DocumentFilterValue, DocumentValue, FilterType, SearchFilterValue,
    SearchValue, TextSearchMode,
};
use serde::{Deserialize, Serialize};

/// The denormalized persistence shape shared by document filter values and
/// saved-search filter values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatFilterValueRow {
    pub filter_id: String,
    #[serde(rename = "type")]
    pub filter_type: Option<FilterType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_integer_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choice_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_mode: Option<TextSearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_mode: Option<DateSearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negate: Option<bool>,
}

/// Filter ids must not contain literal dots in storage (legacy requirement:
/// dotted ids collide with object-path notation in the search engine).
fn sanitize_filter_id(filter_id: &str) -> String {
    filter_id.replace('.', "_")
}

impl FlatFilterValueRow {
    fn empty(filter_id: String, filter_type: FilterType) -> Self {
        Self {
            filter_id,
            filter_type: Some(filter_type),
            ..Self::default()
        }
    }

    /// Normalize a document filter value into the flat row shape.
    ///
    /// Document values are assigned, not queried, so comparison modes default
    /// to EQUAL where the schema stores one.
    pub fn from_document_value(value: &DocumentFilterValue) -> Self {
        let mut row = Self::empty(sanitize_filter_id(&value.filter_id), value.filter_type());

        match &value.value {
            DocumentValue::Date { date } => {
                row.string_value = Some(date.clone());
                row.date_mode = Some(DateSearchMode::Equal);
            }
            DocumentValue::Year { year } => {
                row.integer_value = Some(*year);
                row.date_mode = Some(DateSearchMode::Equal);
            }
            DocumentValue::Text { text } => {
                row.string_value = Some(text.clone());
                row.text_mode = Some(TextSearchMode::Equal);
            }
            DocumentValue::Integer { integer } => {
                row.integer_value = Some(*integer);
            }
            DocumentValue::MultiChoice { choice_ids } => {
                row.choice_ids = choice_ids.clone();
            }
            DocumentValue::SingleChoice { choice_id } => {
                row.choice_ids = vec![choice_id.clone()];
            }
        }

        row
    }

    /// Normalize a search-query filter value into the flat row shape,
    /// carrying modes, range endpoints and negation.
    pub fn from_search_value(value: &SearchFilterValue) -> Self {
        let mut row = Self::empty(value.filter_id.clone(), value.filter_type());

        match &value.value {
            SearchValue::Date {
                first_date,
                second_date,
                mode,
            } => {
                row.string_value = Some(first_date.clone());
                row.second_string_value = second_date.clone();
                row.date_mode = *mode;
            }
            SearchValue::Year {
                first_year,
                second_year,
                mode,
            } => {
                row.integer_value = Some(*first_year);
                row.second_integer_value = *second_year;
                row.date_mode = *mode;
            }
            SearchValue::Text { text, mode, negate } => {
                row.string_value = text.clone();
                row.text_mode = Some(*mode);
                row.negate = Some(*negate);
            }
            SearchValue::Integer {
                first_integer,
                second_integer,
                mode,
            } => {
                row.integer_value = Some(*first_integer);
                row.second_integer_value = *second_integer;
                // the date mode column doubles as the integer mode column
                row.date_mode = *mode;
            }
            SearchValue::MultiChoice { choice_ids } => {
                row.choice_ids = choice_ids.clone();
            }
            SearchValue::SingleChoice { choice_id } => {
                row.choice_ids = vec![choice_id.clone()];
            }
        }

        row
    }

    /// Reconstruct the search-query union from a persisted row.
    ///
    /// SINGLE_CHOICE and MULTI_CHOICE both denormalize through `choiceIds`,
    /// so a value saved as SINGLE_CHOICE reads back as MULTI_CHOICE. This
    /// asymmetry is inherited from the stored schema and must be preserved:
    /// the read-back representation is what the UI edits and re-saves.
    pub fn to_search_value(&self) -> Result<SearchFilterValue> {
        let filter_type = self.filter_type.ok_or_else(|| self.malformed("type"))?;

        let value = match filter_type {
            FilterType::Date => SearchValue::Date {
                first_date: self
                    .string_value
                    .clone()
                    .ok_or_else(|| self.malformed("stringValue"))?,
                second_date: self.second_string_value.clone(),
                mode: self.date_mode,
            },
            FilterType::Year => SearchValue::Year {
                first_year: self
                    .integer_value
                    .ok_or_else(|| self.malformed("integerValue"))?,
                second_year: self.second_integer_value,
                mode: self.date_mode,
            },
            FilterType::Text => SearchValue::Text {
                text: self.string_value.clone(),
                mode: self.text_mode.ok_or_else(|| self.malformed("textMode"))?,
                negate: self.negate.unwrap_or(false),
            },
            FilterType::Integer => SearchValue::Integer {
                first_integer: self
                    .integer_value
                    .ok_or_else(|| self.malformed("integerValue"))?,
                second_integer: self.second_integer_value,
                mode: self.date_mode,
            },
            FilterType::MultiChoice | FilterType::SingleChoice => SearchValue::MultiChoice {
                choice_ids: self.choice_ids.clone(),
            },
        };

        Ok(SearchFilterValue {
            filter_id: self.filter_id.clone(),
            value,
        })
    }

    fn malformed(&self, field: &str) -> FilterSearchError {
        FilterSearchError::MalformedRow {
            filter_id: self.filter_id.clone(),
            details: format!("missing {}", field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_value(filter_id: &str, value: SearchValue) -> SearchFilterValue {
        SearchFilterValue {
            filter_id: filter_id.to_string(),
            value,
        }
    }

    #[test]
    fn search_round_trip_is_identity_for_non_choice_variants() {
        let values = vec![
            search_value(
                "year",
                SearchValue::Year {
                    first_year: 1999,
                    second_year: None,
                    mode: Some(DateSearchMode::BeforeOrEqual),
                },
            ),
            search_value(
                "creation-date",
                SearchValue::Date {
                    first_date: "2023-04-01".to_string(),
                    second_date: Some("2023-06-30".to_string()),
                    mode: None,
                },
            ),
            search_value(
                "reference",
                SearchValue::Text {
                    text: Some("W-1042".to_string()),
                    mode: TextSearchMode::StartsWith,
                    negate: true,
                },
            ),
            search_value(
                "pages",
                SearchValue::Integer {
                    first_integer: 4,
                    second_integer: Some(12),
                    mode: None,
                },
            ),
            search_value(
                "region",
                SearchValue::MultiChoice {
                    choice_ids: vec!["France".to_string(), "Suisse".to_string()],
                },
            ),
        ];

        for value in values {
            let row = FlatFilterValueRow::from_search_value(&value);
            assert_eq!(row.to_search_value().unwrap(), value);
        }
    }

    #[test]
    fn single_choice_becomes_multi_choice_after_one_round_trip() {
        let value = search_value(
            "depot",
            SearchValue::SingleChoice {
                choice_id: "INPI".to_string(),
            },
        );

        let read_back = FlatFilterValueRow::from_search_value(&value)
            .to_search_value()
            .unwrap();

        assert_eq!(
            read_back,
            search_value(
                "depot",
                SearchValue::MultiChoice {
                    choice_ids: vec!["INPI".to_string()],
                }
            )
        );

        // idempotent from the second trip onwards
        let again = FlatFilterValueRow::from_search_value(&read_back)
            .to_search_value()
            .unwrap();
        assert_eq!(again, read_back);
    }

    #[test]
    fn document_filter_ids_are_dot_sanitized() {
        let value = DocumentFilterValue {
            filter_id: "a.b.c".to_string(),
            value: DocumentValue::Text {
                text: "x".to_string(),
            },
        };

        let row = FlatFilterValueRow::from_document_value(&value);
        assert_eq!(row.filter_id, "a_b_c");
        assert_eq!(row.string_value.as_deref(), Some("x"));
        assert_eq!(row.text_mode, Some(TextSearchMode::Equal));
    }

    #[test]
    fn document_values_default_modes_to_equal() {
        let date = DocumentFilterValue {
            filter_id: "creation-date".to_string(),
            value: DocumentValue::Date {
                date: "2024-01-15".to_string(),
            },
        };
        let row = FlatFilterValueRow::from_document_value(&date);
        assert_eq!(row.date_mode, Some(DateSearchMode::Equal));
        assert_eq!(row.string_value.as_deref(), Some("2024-01-15"));

        // the integer variant stores no mode at all
        let integer = DocumentFilterValue {
            filter_id: "pages".to_string(),
            value: DocumentValue::Integer { integer: 7 },
        };
        let row = FlatFilterValueRow::from_document_value(&integer);
        assert_eq!(row.date_mode, None);
        assert_eq!(row.integer_value, Some(7));
    }

    #[test]
    fn single_choice_document_value_lands_in_choice_ids() {
        let value = DocumentFilterValue {
            filter_id: "depot".to_string(),
            value: DocumentValue::SingleChoice {
                choice_id: "USPTO".to_string(),
            },
        };

        let row = FlatFilterValueRow::from_document_value(&value);
        assert_eq!(row.choice_ids, vec!["USPTO".to_string()]);
        assert_eq!(row.filter_type, Some(FilterType::SingleChoice));
    }

    #[test]
    fn malformed_rows_are_rejected_not_defaulted() {
        let row = FlatFilterValueRow {
            filter_id: "year".to_string(),
            filter_type: Some(FilterType::Year),
            ..FlatFilterValueRow::default()
        };

        assert!(matches!(
            row.to_search_value(),
            Err(FilterSearchError::MalformedRow { .. })
        ));
    }

    #[test]
    fn row_serializes_with_camel_case_wire_names() {
        let value = search_value(
            "year",
            SearchValue::Year {
                first_year: 2001,
                second_year: Some(2003),
                mode: None,
            },
        );

        let row = FlatFilterValueRow::from_search_value(&value);
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["filterId"], "year");
        assert_eq!(json["integerValue"], 2001);
        assert_eq!(json["secondIntegerValue"], 2003);
        assert_eq!(json["type"], "YEAR");
    }
}
