// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `civreg pending`: inspect the local queue and its dead letters.

use std::path::Path;

use cr_core::db::now_ms;
use cr_core::Database;

use crate::display::{format_dead_letter_line, format_pending_line};
use crate::error::Result;

use super::{print_json, Context};

pub fn run(base: &Path, dead: bool, json: bool) -> Result<()> {
    let db = Context::locate(base)?.open_db()?;
    run_impl(&db, dead, json)
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(db: &Database, dead: bool, json: bool) -> Result<()> {
    if dead {
        let letters = db.list_dead_letters()?;
        if json {
            return print_json(&letters);
        }
        if letters.is_empty() {
            println!("No dead-lettered registrations.");
        }
        for letter in &letters {
            println!("{}", format_dead_letter_line(letter));
        }
        return Ok(());
    }

    if json {
        return print_json(&db.list_pending()?);
    }
    for line in pending_lines(db, now_ms())? {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn pending_lines(db: &Database, now: i64) -> Result<Vec<String>> {
    let entries = db.list_pending()?;
    if entries.is_empty() {
        return Ok(vec!["No pending registrations.".to_string()]);
    }

    let mut lines = vec![format!("{} pending registration(s):", entries.len())];
    lines.extend(
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format_pending_line(i + 1, entry, now)),
    );
    Ok(lines)
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
