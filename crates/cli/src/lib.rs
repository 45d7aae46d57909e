// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! crlib - offline-first client library for the civil registry.
//!
//! This crate provides the functionality behind the `civreg` CLI and the
//! `civregd` background worker: registrations are submitted directly while the
//! registry server is reachable and queued in a local SQLite database while it
//! is not, then replayed once connectivity returns.
//!
//! # Main Components
//!
//! - [`sync`] - API transport, connectivity monitor, sync engine, submission gate
//! - [`Config`] - Per-directory configuration (`.civreg/config.toml`)
//! - [`Error`] - Error types for all operations
//!
//! # Initialization
//!
//! ```rust,ignore
//! use crlib::{init_work_dir, find_work_dir, get_db_path, Config};
//!
//! let work_dir = init_work_dir(Path::new("."), "http://localhost:3000")?;
//! let config = Config::load(&work_dir)?;
//! let store = crlib::sync::LocalStore::open(&get_db_path(&work_dir))?;
//! ```

mod cli;
pub mod colors;
mod commands;
mod display;
pub mod help;

pub mod config;
pub mod env;
pub mod error;
pub mod sync;

use std::path::PathBuf;

pub use cli::{Cli, Command, SearchArgs};
pub use config::{find_work_dir, find_work_dir_from, get_db_path, init_work_dir, Config};
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let base = match cli.directory {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };

    match cli.command {
        Command::Init { server } => commands::init::run(&base, &server),
        Command::Submit { kind, fields, json } => {
            commands::submit::run(&base, kind, &fields, json)
        }
        Command::Search {
            kind,
            filters,
            json,
        } => commands::search::run(&base, kind, filters.into(), json),
        Command::Pending { dead, json } => commands::pending::run(&base, dead, json),
        Command::Requeue { id } => commands::requeue::run(&base, id),
        Command::Sync { json } => commands::sync::run(&base, json),
        Command::Status { json } => commands::status::run(&base, json),
        Command::Watch => commands::watch::run(&base),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
