// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process sync lease.
//!
//! Every process that can run a sync pass (the foreground CLI and the
//! background worker) shares one SQLite file. A pass only runs while its
//! process holds the single `sync` row in `sync_lock`. The row carries an
//! expiry so a crashed holder cannot block syncing forever.

use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use std::time::Duration;

use crate::db::{now_ms, Database};
use crate::error::Result;

const LEASE_NAME: &str = "sync";

/// The current holder of the sync lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncLease {
    pub holder: String,
    pub acquired_at: i64,
    pub expires_at: i64,
}

impl SyncLease {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

fn lease_ms(lease: Duration) -> i64 {
    i64::try_from(lease.as_millis()).unwrap_or(i64::MAX)
}

impl Database {
    /// Try to take the sync lease for `holder`.
    ///
    /// Succeeds when nobody holds it, the previous lease expired, or `holder`
    /// already owns it. Returns false if another holder has a live lease.
    pub fn try_acquire_sync_lease(&mut self, holder: &str, lease: Duration) -> Result<bool> {
        let now = now_ms();
        let expires_at = now.saturating_add(lease_ms(lease));

        // IMMEDIATE takes the write lock up front so two processes cannot both
        // see an expired row and both insert.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM sync_lock WHERE name = ?1 AND (expires_at <= ?2 OR holder = ?3)",
            params![LEASE_NAME, now, holder],
        )?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO sync_lock (name, holder, acquired_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![LEASE_NAME, holder, now, expires_at],
        )?;
        tx.commit()?;

        if inserted > 0 {
            tracing::debug!(holder, "acquired sync lease");
        }
        Ok(inserted > 0)
    }

    /// Push the expiry of a lease `holder` owns. Returns false if it was lost.
    pub fn renew_sync_lease(&self, holder: &str, lease: Duration) -> Result<bool> {
        let expires_at = now_ms().saturating_add(lease_ms(lease));
        let updated = self.conn.execute(
            "UPDATE sync_lock SET expires_at = ?1 WHERE name = ?2 AND holder = ?3",
            params![expires_at, LEASE_NAME, holder],
        )?;
        Ok(updated > 0)
    }

    /// Give up the lease if `holder` owns it.
    pub fn release_sync_lease(&self, holder: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sync_lock WHERE name = ?1 AND holder = ?2",
            params![LEASE_NAME, holder],
        )?;
        Ok(())
    }

    /// The lease row, expired or not.
    pub fn current_sync_lease(&self) -> Result<Option<SyncLease>> {
        let lease = self
            .conn
            .query_row(
                "SELECT holder, acquired_at, expires_at FROM sync_lock WHERE name = ?1",
                params![LEASE_NAME],
                |row| {
                    Ok(SyncLease {
                        holder: row.get(0)?,
                        acquired_at: row.get(1)?,
                        expires_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(lease)
    }
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
