//! # Filter Type Registry
//!
//! ## Purpose
//! Read-only catalog of filter definitions: id, semantic type, allowed choice
//! options and parent/category grouping. The registry is an explicitly
//! constructed snapshot passed by reference into the compiler and facet
//! components; refreshing it means building a new one.
//!
//! ## Input/Output Specification
//! - **Input**: A list of [`FilterDefinition`]s (typically loaded from the
//!   database by the surrounding service at startup)
//! - **Output**: Type/name lookups and root-first breadcrumb paths
//! - **Concurrency**: Immutable after construction, safe for unlimited
//!   concurrent readers
//!
//! A small fixed set of base generic filters (year, patent repository,
//! region, creation date, filename) is always present in a built registry.

use crate::errors::{FilterSearchError, Result};
use crate::value::FilterType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known filter ids that always exist and are never deleted
pub mod base_filter_ids {
    pub const YEAR: &str = "year";
    pub const PATENT_REPOSITORY: &str = "depot";
    pub const REGION: &str = "region";
    pub const CREATION_DATE: &str = "creation-date";
    pub const FILENAME: &str = "filename";
}

/// The category id that scopes a filter to all categories
pub const GENERIC_CATEGORY_ID: &str = "generic";

/// Sentinel id of the synthetic root node of the filter tree
pub const ROOT_ID: &str = "root";

/// Whether a node is a queryable filter or an organizing group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterKind {
    Filter,
    Group,
}

/// A named, typed filter or an untyped group node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    /// Stable string key, globally unique
    pub id: String,
    pub name: String,
    pub kind: FilterKind,
    /// Present iff kind is FILTER
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<FilterType>,
    /// None (or `generic`) means the filter applies to all categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Ordered list of allowed choice strings; only for choice filters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FilterDefinition {
    /// Shorthand for a leaf filter definition with no parent
    pub fn filter(id: &str, name: &str, filter_type: FilterType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: FilterKind::Filter,
            filter_type: Some(filter_type),
            category_id: None,
            parent_id: None,
            options: Vec::new(),
        }
    }
}

/// The base generic filters seeded into every registry
pub fn base_generic_filters() -> Vec<FilterDefinition> {
    let generic = |mut def: FilterDefinition, options: &[&str]| {
        def.category_id = Some(GENERIC_CATEGORY_ID.to_string());
        def.options = options.iter().map(|o| o.to_string()).collect();
        def
    };

    vec![
        generic(
            FilterDefinition::filter(
                base_filter_ids::PATENT_REPOSITORY,
                "Patent repository",
                FilterType::SingleChoice,
            ),
            &["HK", "IFPI", "INPI", "CN", "USPTO", "OHMI", "OMPI"],
        ),
        generic(
            FilterDefinition::filter(base_filter_ids::YEAR, "Year", FilterType::Year),
            &[],
        ),
        generic(
            FilterDefinition::filter(base_filter_ids::FILENAME, "Filename", FilterType::Text),
            &[],
        ),
        generic(
            FilterDefinition::filter(
                base_filter_ids::CREATION_DATE,
                "Creation date",
                FilterType::Date,
            ),
            &[],
        ),
        generic(
            FilterDefinition::filter(base_filter_ids::REGION, "Region", FilterType::SingleChoice),
            &["UE", "Monde", "France", "Hong Kong", "Suisse", "Chine", "USA"],
        ),
    ]
}

/// Immutable snapshot of all filter definitions
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    by_id: HashMap<String, FilterDefinition>,
}

impl FilterRegistry {
    /// Build a registry from the base generic filters plus the supplied
    /// definitions, validating structural invariants: FILTER nodes carry a
    /// type and no children, GROUP nodes carry no type, choice filters list
    /// options, and a parent must be a group in the same category.
    pub fn build(definitions: impl IntoIterator<Item = FilterDefinition>) -> Result<Self> {
        let mut by_id: HashMap<String, FilterDefinition> = HashMap::new();

        for def in base_generic_filters().into_iter().chain(definitions) {
            if by_id.contains_key(&def.id) {
                return Err(FilterSearchError::ValidationFailed {
                    field: def.id,
                    reason: "duplicate filter id".to_string(),
                });
            }
            by_id.insert(def.id.clone(), def);
        }

        let registry = Self { by_id };
        registry.validate()?;

        tracing::debug!(filters = registry.by_id.len(), "filter registry built");
        Ok(registry)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |id: &str, reason: &str| {
            Err(FilterSearchError::ValidationFailed {
                field: id.to_string(),
                reason: reason.to_string(),
            })
        };

        for def in self.by_id.values() {
            match def.kind {
                FilterKind::Filter => {
                    let filter_type = match def.filter_type {
                        Some(t) => t,
                        None => return invalid(&def.id, "a FILTER node requires a type"),
                    };
                    let is_choice = matches!(
                        filter_type,
                        FilterType::SingleChoice | FilterType::MultiChoice
                    );
                    if is_choice && def.options.is_empty() {
                        return invalid(&def.id, "a choice filter requires options");
                    }
                    if !is_choice && !def.options.is_empty() {
                        return invalid(&def.id, "options are only allowed on choice filters");
                    }
                }
                FilterKind::Group => {
                    if def.filter_type.is_some() {
                        return invalid(&def.id, "a GROUP node must not carry a type");
                    }
                }
            }

            if let Some(parent_id) = &def.parent_id {
                let parent = match self.by_id.get(parent_id) {
                    Some(p) => p,
                    None => return invalid(&def.id, "parent does not exist"),
                };
                if parent.kind != FilterKind::Group {
                    return invalid(&def.id, "parent must be a GROUP node");
                }
                if parent.category_id != def.category_id {
                    return invalid(&def.id, "parent must be in the same category");
                }
            }
        }

        Ok(())
    }

    /// Explicit refresh: build a new snapshot from fresh definitions.
    pub fn rebuild(definitions: impl IntoIterator<Item = FilterDefinition>) -> Result<Self> {
        Self::build(definitions)
    }

    pub fn get(&self, filter_id: &str) -> Option<&FilterDefinition> {
        self.by_id.get(filter_id)
    }

    /// Resolve a filter id to its semantic type. Group ids resolve to an
    /// error as well: they have no type to query against.
    pub fn get_type(&self, filter_id: &str) -> Result<FilterType> {
        self.by_id
            .get(filter_id)
            .and_then(|def| def.filter_type)
            .ok_or_else(|| FilterSearchError::UnknownFilter {
                filter_id: filter_id.to_string(),
            })
    }

    pub fn get_name(&self, filter_id: &str) -> Result<&str> {
        self.by_id
            .get(filter_id)
            .map(|def| def.name.as_str())
            .ok_or_else(|| FilterSearchError::UnknownFilter {
                filter_id: filter_id.to_string(),
            })
    }

    /// Ordered breadcrumb path for a node: the synthetic root, then every
    /// ancestor root-first, then the node itself.
    pub fn get_path(&self, filter_id: &str) -> Result<Vec<&str>> {
        let mut node = self
            .by_id
            .get(filter_id)
            .ok_or_else(|| FilterSearchError::UnknownFilter {
                filter_id: filter_id.to_string(),
            })?;

        let mut path = vec![node.id.as_str()];
        while let Some(parent_id) = &node.parent_id {
            // validated at build time, absent parents cannot occur here
            match self.by_id.get(parent_id) {
                Some(parent) => {
                    path.push(parent.id.as_str());
                    node = parent;
                }
                None => break,
            }
        }
        path.push(ROOT_ID);
        path.reverse();

        Ok(path)
    }

    /// All queryable (FILTER kind) definitions, in stable id order
    pub fn filters(&self) -> Vec<&FilterDefinition> {
        let mut filters: Vec<&FilterDefinition> = self
            .by_id
            .values()
            .filter(|def| def.kind == FilterKind::Filter)
            .collect();
        filters.sort_by(|a, b| a.id.cmp(&b.id));
        filters
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
