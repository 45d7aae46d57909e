// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use cr_core::{CachedRecord, DeadLetter, PendingRegistration};

use crate::colors;

/// Shown in place of an empty subject name.
const UNNAMED: &str = "(unnamed)";

/// Compact age of a timestamp, e.g. `45s`, `12m`, `3h`, `2d`.
///
/// Timestamps in the future (clock skew) read as `0s`.
pub fn format_age(now_ms: i64, timestamp_ms: i64) -> String {
    let secs = (now_ms - timestamp_ms).max(0) / 1000;
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86_400),
    }
}

fn name_or_unnamed(name: String) -> String {
    if name.is_empty() {
        UNNAMED.to_string()
    } else {
        name
    }
}

/// One line of `civreg pending`.
///
/// Output format: `1. birth  Ama Owusu  #7  3h ago`
pub fn format_pending_line(index: usize, entry: &PendingRegistration, now_ms: i64) -> String {
    format!(
        "{}. {:<5}  {}  {}",
        index,
        entry.kind,
        name_or_unnamed(entry.subject_name()),
        colors::context(&format!(
            "#{}  {} ago",
            entry.id,
            format_age(now_ms, entry.timestamp)
        )),
    )
}

/// One line of `civreg pending --dead`.
pub fn format_dead_letter_line(dead: &DeadLetter) -> String {
    let name = name_or_unnamed(cr_core::registration::subject_name(dead.kind, &dead.payload));
    format!(
        "#{} {:<5}  {}  {}\n    {}",
        dead.id,
        dead.kind,
        name,
        colors::warn(&format!("rejected {}x", dead.rejections)),
        dead.last_error,
    )
}

/// One line of search output: registration number, type, name, date, place.
pub fn format_record_line(record: &CachedRecord) -> String {
    let kind = record.record_type;
    let date = record.field(kind.date_field()).unwrap_or_default();
    let place = record.field(kind.place_field()).unwrap_or_default();
    let mut line = format!(
        "{}  {:<5}  {}",
        colors::literal(&record.registration_number),
        kind,
        name_or_unnamed(record.subject_name()),
    );
    if !date.is_empty() {
        line.push_str("  ");
        line.push_str(&date);
    }
    if !place.is_empty() {
        line.push_str("  ");
        line.push_str(&colors::context(&place));
    }
    line
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
