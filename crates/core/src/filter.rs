// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Search parameters and offline filtering of cached records.
//!
//! The same [`SearchParams`] value is sent to the server's advanced search
//! endpoint as a query string and, when offline, applied locally to the
//! cached records of one type. Text filters are case-insensitive substring
//! matches. Date bounds compare ISO `YYYY-MM-DD` strings and are inclusive.

use serde::{Deserialize, Serialize};

use crate::registration::{field_text, CachedRecord, RegistrationType};

/// Advanced search filters, named as the server's query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    /// Birth records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    /// Birth records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    /// Death records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// Death records only; inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_from: Option<u32>,
    /// Death records only; inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_to: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
}

impl SearchParams {
    /// True when no filter is set.
    pub fn is_empty(&self) -> bool {
        *self == SearchParams::default()
    }

    fn has_death_filters(&self) -> bool {
        self.cause.as_deref().is_some_and(|s| !s.is_empty())
            || self.age_from.is_some()
            || self.age_to.is_some()
    }

    /// Whether a cached record satisfies every filter that is set.
    pub fn matches(&self, record: &CachedRecord) -> bool {
        let kind = record.record_type;
        let prefix = kind.subject_prefix();

        text_filter(record, &format!("{prefix}_first_name"), &self.first_name)
            && text_filter(record, &format!("{prefix}_last_name"), &self.last_name)
            && text_filter(record, "registration_number", &self.registration_number)
            && text_filter(record, kind.place_field(), &self.place)
            && date_filter(record, kind.date_field(), &self.date_from, &self.date_to)
            && parent_filter(record, "mother", &self.mother_name)
            && parent_filter(record, "father", &self.father_name)
            && death_only(record, self.has_death_filters())
            && text_filter(record, "cause_of_death", &self.cause)
            && age_filter(record, self.age_from, self.age_to)
    }
}

/// Keep the records that match `params`, preserving their order.
pub fn filter_records(records: Vec<CachedRecord>, params: &SearchParams) -> Vec<CachedRecord> {
    if params.is_empty() {
        return records;
    }
    records.into_iter().filter(|r| params.matches(r)).collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn text_filter(record: &CachedRecord, field: &str, needle: &Option<String>) -> bool {
    match needle.as_deref() {
        None | Some("") => true,
        Some(needle) => record
            .field(field)
            .is_some_and(|value| contains_ignore_case(&value, needle)),
    }
}

fn date_filter(
    record: &CachedRecord,
    field: &str,
    from: &Option<String>,
    to: &Option<String>,
) -> bool {
    let from = from.as_deref().filter(|s| !s.is_empty());
    let to = to.as_deref().filter(|s| !s.is_empty());
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(date) = record.field(field) else {
        return false;
    };
    from.is_none_or(|from| *date >= *from) && to.is_none_or(|to| *date <= *to)
}

fn parent_filter(record: &CachedRecord, parent: &str, needle: &Option<String>) -> bool {
    let Some(needle) = needle.as_deref().filter(|s| !s.is_empty()) else {
        return true;
    };
    if record.record_type != RegistrationType::Birth {
        return false;
    }
    ["first_name", "last_name"].iter().any(|part| {
        field_text(&record.data, &format!("{parent}_{part}"))
            .is_some_and(|value| contains_ignore_case(&value, needle))
    })
}

fn death_only(record: &CachedRecord, filtered: bool) -> bool {
    !filtered || record.record_type == RegistrationType::Death
}

fn age_filter(record: &CachedRecord, from: Option<u32>, to: Option<u32>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(age) = record
        .field("age_at_death")
        .and_then(|value| value.trim().parse::<f64>().ok())
    else {
        return false;
    };
    from.is_none_or(|from| age >= f64::from(from)) && to.is_none_or(|to| age <= f64::from(to))
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
