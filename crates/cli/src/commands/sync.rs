// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `civreg sync`: run one pass now, whatever the monitor last saw.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::sync::{PassOutcome, PassReport, SyncEngine, SyncTrigger};

use super::{print_json, runtime, Context};

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum SyncOutput<'a> {
    Completed(&'a PassReport),
    Coalesced,
}

pub fn run(base: &Path, json: bool) -> Result<()> {
    let ctx = Context::locate(base)?;
    let engine = SyncEngine::new(ctx.open_store()?, ctx.api()?, ctx.engine_settings());

    let outcome = runtime()?.block_on(engine.trigger(SyncTrigger::Manual))?;

    if json {
        let output = match &outcome {
            PassOutcome::Completed(report) => SyncOutput::Completed(report),
            PassOutcome::Coalesced => SyncOutput::Coalesced,
        };
        return print_json(&output);
    }
    println!("{}", summarize(&outcome));
    Ok(())
}

pub(crate) fn summarize(outcome: &PassOutcome) -> String {
    let report = match outcome {
        PassOutcome::Coalesced => {
            return "Sync already running in another process; nothing to do".to_string()
        }
        PassOutcome::Completed(report) => report,
    };
    if report.attempted == 0 {
        return "Nothing to sync".to_string();
    }

    let mut summary = format!(
        "Synced {} of {} pending registration(s)",
        report.synced, report.attempted
    );
    if report.failed > 0 {
        summary.push_str(&format!(", {} still pending", report.failed));
    }
    if report.dead_lettered > 0 {
        summary.push_str(&format!(
            ", {} moved to dead letters (civreg pending --dead)",
            report.dead_lettered
        ));
    }
    if report.lease_lost {
        summary.push_str("; stopped early after losing the sync lease");
    }
    if let Some(error) = &report.storage_error {
        summary.push_str(&format!("; stopped early: {error}"));
    }
    summary
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
