//! # Saved-Search Monitoring
//!
//! ## Purpose
//! Date logic for monitored saved searches: deciding when a monitored search
//! is due for re-execution and constraining the re-run to documents created
//! since the last window, by appending a creation-date filter. Scheduling
//! and notification delivery stay with the surrounding service.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::registry::base_filter_ids;
use crate::value::{DateSearchMode, SearchFilterValue, SearchValue};

/// How often a monitored saved search re-runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitoringFrequency {
    Daily,
    Weekly,
    Monthly,
}

/// Whether a monitored search created on `created_at` is due on `today`.
/// Weekly searches run on the weekday they were created; monthly searches
/// on the same day of month (and so never run in months lacking that day).
pub fn is_due(frequency: MonitoringFrequency, created_at: NaiveDate, today: NaiveDate) -> bool {
    match frequency {
        MonitoringFrequency::Daily => true,
        MonitoringFrequency::Weekly => created_at.weekday() == today.weekday(),
        MonitoringFrequency::Monthly => created_at.day() == today.day(),
    }
}

/// Start of the monitoring window ending on `today`: one day, one week or
/// one calendar month earlier.
pub fn window_start(frequency: MonitoringFrequency, today: NaiveDate) -> NaiveDate {
    match frequency {
        MonitoringFrequency::Daily => today - Days::new(1),
        MonitoringFrequency::Weekly => today - Days::new(7),
        MonitoringFrequency::Monthly => today - Months::new(1),
    }
}

/// Constrain a saved search's filter values to documents created on or
/// after `from`, so a monitored re-run only surfaces new results.
pub fn with_monitoring_window(
    mut values: Vec<SearchFilterValue>,
    from: NaiveDate,
) -> Vec<SearchFilterValue> {
    values.push(SearchFilterValue {
        filter_id: base_filter_ids::CREATION_DATE.to_string(),
        value: SearchValue::Date {
            first_date: from.format("%Y-%m-%d").to_string(),
            second_date: None,
            mode: Some(DateSearchMode::AfterOrEqual),
        },
    });
    values
}
