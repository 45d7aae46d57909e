// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use cr_core::{Database, PendingRegistration};

use crate::error::Result;

use super::Context;

pub fn run(base: &Path, id: i64) -> Result<()> {
    let mut db = Context::locate(base)?.open_db()?;
    let entry = run_impl(&mut db, id)?;
    println!("Requeued dead letter #{id} as pending #{}", entry.id);
    Ok(())
}

pub(crate) fn run_impl(db: &mut Database, id: i64) -> Result<PendingRegistration> {
    let entry = db.requeue_dead_letter(id)?;
    tracing::info!(dead_letter = id, id = entry.id, "requeued registration");
    Ok(entry)
}

#[cfg(test)]
#[path = "requeue_tests.rs"]
mod tests;
