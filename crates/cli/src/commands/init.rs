// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::config::{get_db_path, init_work_dir, Config};
use crate::error::Result;

pub fn run(base: &Path, server: &str) -> Result<()> {
    let work_dir = init_work_dir(base, server)?;
    // Create the database now so the daemon and CLI agree on the schema.
    cr_core::Database::open(&get_db_path(&work_dir))?;
    let config = Config::load(&work_dir)?;

    println!("Initialized civreg at {}", work_dir.display());
    println!("Server: {}", config.server);
    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
