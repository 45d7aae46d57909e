// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local storage.
//!
//! The [`Database`] struct owns the connection to the local registry file.
//! Data access is split by concern: the pending queue and dead letters live in
//! [`crate::pending`], the record cache in [`crate::cache`] and the cross-process
//! sync lease in [`crate::lease`].

use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// SQL schema for the local registry database.
pub const SCHEMA: &str = r#"
-- Registrations captured while offline, replayed by the sync engine
CREATE TABLE IF NOT EXISTS pending_registrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    payload TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
);

-- Rejection counters, kept apart so pending rows stay immutable
CREATE TABLE IF NOT EXISTS sync_attempts (
    pending_id INTEGER PRIMARY KEY,
    rejections INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    FOREIGN KEY (pending_id) REFERENCES pending_registrations(id)
);

-- Entries the server rejected too many times
CREATE TABLE IF NOT EXISTS dead_letters (
    id INTEGER PRIMARY KEY,
    type TEXT NOT NULL,
    payload TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    rejections INTEGER NOT NULL,
    last_error TEXT NOT NULL,
    dead_at INTEGER NOT NULL
);

-- Local mirror of server search results
CREATE TABLE IF NOT EXISTS cached_records (
    registration_number TEXT PRIMARY KEY,
    record_type TEXT NOT NULL,
    data TEXT NOT NULL,
    cached_at INTEGER NOT NULL
);

-- Lease shared by every process that can run a sync pass
CREATE TABLE IF NOT EXISTS sync_lock (
    name TEXT PRIMARY KEY,
    holder TEXT NOT NULL,
    acquired_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_pending_type ON pending_registrations(type);
CREATE INDEX IF NOT EXISTS idx_pending_timestamp ON pending_registrations(timestamp);
CREATE INDEX IF NOT EXISTS idx_cached_type ON cached_records(record_type);
"#;

/// How long a writer waits for another process's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
pub(crate) fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse a JSON column from the database.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    serde_json::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid JSON in column '{column}': {e}"
            ))),
        )
    })
}

/// Run schema creation on a database connection.
///
/// Every statement in [`SCHEMA`] is idempotent, so this is safe to call on
/// each open, including by several processes sharing one file.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with queue and cache operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // WAL lets the foreground CLI and the background worker read while the other writes
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;

        tracing::debug!(path = %path.display(), "opened local registry database");
        Ok(Database { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;
        Ok(Database { conn })
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
