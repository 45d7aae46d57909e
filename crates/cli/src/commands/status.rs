// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use chrono::{DateTime, Utc};
use cr_core::db::now_ms;
use cr_core::{Database, SyncLease};
use serde::Serialize;

use crate::colors;
use crate::error::Result;

use super::{print_json, runtime, Context};

#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub server: String,
    pub online: bool,
    pub pending: usize,
    pub dead_letters: usize,
    pub has_cached_records: bool,
    /// The live sync lease, if a pass is running somewhere.
    pub sync_lease: Option<SyncLease>,
}

pub fn run(base: &Path, json: bool) -> Result<()> {
    let ctx = Context::locate(base)?;
    let online = runtime()?.block_on(async {
        let monitor = ctx.monitor().await?;
        Ok::<_, crate::error::Error>(monitor.state().is_online())
    })?;
    let report = collect(&ctx.open_db()?, &ctx.config.server, online)?;

    if json {
        return print_json(&report);
    }
    for line in render(&report) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn collect(db: &Database, server: &str, online: bool) -> Result<StatusReport> {
    let sync_lease = db
        .current_sync_lease()?
        .filter(|lease| !lease.is_expired(now_ms()));
    Ok(StatusReport {
        server: server.to_string(),
        online,
        pending: db.pending_count()?,
        dead_letters: db.list_dead_letters()?.len(),
        has_cached_records: db.has_cached()?,
        sync_lease,
    })
}

pub(crate) fn render(report: &StatusReport) -> Vec<String> {
    let connectivity = if report.online {
        colors::good("online")
    } else {
        colors::warn("offline")
    };
    let mut lines = vec![
        format!("Server: {} ({connectivity})", report.server),
        format!("Pending: {}", report.pending),
    ];
    if report.dead_letters > 0 {
        lines.push(format!("Dead letters: {}", report.dead_letters));
    }
    lines.push(format!(
        "Offline search: {}",
        if report.has_cached_records {
            "available"
        } else {
            "no cached records"
        }
    ));
    match &report.sync_lease {
        Some(lease) => lines.push(format!(
            "Sync: running ({}, lease until {})",
            lease.holder,
            format_time(lease.expires_at)
        )),
        None => lines.push("Sync: idle".to_string()),
    }
    lines
}

fn format_time(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ms.to_string(),
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
