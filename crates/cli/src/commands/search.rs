// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `civreg search`: live search with a cached fallback.

use std::path::Path;

use cr_core::{CachedRecord, RegistrationType, SearchParams};
use serde::Serialize;

use crate::display::format_record_line;
use crate::error::Result;
use crate::sync::{RecordSearch, SearchOutcome};

use super::{print_json, runtime, Context};

#[derive(Serialize)]
struct SearchOutput<'a> {
    source: &'static str,
    records: &'a [CachedRecord],
}

pub fn run(base: &Path, kind: RegistrationType, params: SearchParams, json: bool) -> Result<()> {
    let ctx = Context::locate(base)?;
    let store = ctx.deferred_store();
    let api = ctx.api()?;

    let outcome = runtime()?.block_on(async {
        let monitor = ctx.monitor().await?;
        RecordSearch::new(store, api, monitor.state())
            .search(kind, &params)
            .await
    })?;

    if json {
        let (source, records) = split(&outcome);
        return print_json(&SearchOutput { source, records });
    }
    for line in render(kind, &outcome) {
        println!("{line}");
    }
    Ok(())
}

fn split(outcome: &SearchOutcome) -> (&'static str, &[CachedRecord]) {
    match outcome {
        SearchOutcome::Live(records) => ("live", records.as_slice()),
        SearchOutcome::Cached(records) => ("cached", records.as_slice()),
        SearchOutcome::NoCachedData => ("none", &[]),
    }
}

pub(crate) fn render(kind: RegistrationType, outcome: &SearchOutcome) -> Vec<String> {
    let records = match outcome {
        SearchOutcome::NoCachedData => {
            return vec![format!(
                "Offline: no cached {kind} records\n  \
                 Run a search while online to make records available offline"
            )]
        }
        SearchOutcome::Live(records) => records,
        SearchOutcome::Cached(records) => records,
    };

    let mut lines = Vec::with_capacity(records.len() + 1);
    if matches!(outcome, SearchOutcome::Cached(_)) {
        lines.push(format!("Offline: showing cached {kind} records"));
    }
    if records.is_empty() {
        lines.push("No matching records.".to_string());
    }
    lines.extend(records.iter().map(format_record_line));
    lines
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
