// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local durable queue of pending registrations.
//!
//! Rows are written in a single statement or transaction, so a reader sees
//! either a complete entry or none. Ids come from `AUTOINCREMENT` and are never
//! handed out twice, even after the highest entry is removed.

use rusqlite::{params, OptionalExtension, Row};

use crate::db::{now_ms, parse_db, parse_json, Database};
use crate::error::{Error, Result};
use crate::registration::{
    validate_payload, DeadLetter, Payload, PendingRegistration, PendingStatus, RegistrationType,
};

fn pending_from_row(row: &Row<'_>) -> std::result::Result<PendingRegistration, rusqlite::Error> {
    let type_str: String = row.get(1)?;
    let payload_str: String = row.get(2)?;
    let status_str: String = row.get(4)?;

    Ok(PendingRegistration {
        id: row.get(0)?,
        kind: parse_db(&type_str, "type")?,
        payload: parse_json(&payload_str, "payload")?,
        timestamp: row.get(3)?,
        status: parse_db(&status_str, "status")?,
    })
}

fn dead_letter_from_row(row: &Row<'_>) -> std::result::Result<DeadLetter, rusqlite::Error> {
    let type_str: String = row.get(1)?;
    let payload_str: String = row.get(2)?;

    Ok(DeadLetter {
        id: row.get(0)?,
        kind: parse_db(&type_str, "type")?,
        payload: parse_json(&payload_str, "payload")?,
        timestamp: row.get(3)?,
        rejections: row.get(4)?,
        last_error: row.get(5)?,
        dead_at: row.get(6)?,
    })
}

impl Database {
    /// Add a registration to the pending queue.
    ///
    /// Assigns a fresh id and stamps the current time.
    pub fn enqueue(&self, kind: RegistrationType, payload: &Payload) -> Result<PendingRegistration> {
        validate_payload(payload)?;

        let timestamp = now_ms();
        self.conn.execute(
            "INSERT INTO pending_registrations (type, payload, timestamp, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                kind.as_str(),
                serde_json::to_string(payload)?,
                timestamp,
                PendingStatus::Pending.as_str(),
            ],
        )?;

        Ok(PendingRegistration {
            id: self.conn.last_insert_rowid(),
            kind,
            payload: payload.clone(),
            timestamp,
            status: PendingStatus::Pending,
        })
    }

    /// List every pending registration in insertion order.
    pub fn list_pending(&self) -> Result<Vec<PendingRegistration>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, payload, timestamp, status
             FROM pending_registrations ORDER BY id",
        )?;

        let entries = stmt
            .query_map([], pending_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Get a single pending registration.
    pub fn get_pending(&self, id: i64) -> Result<Option<PendingRegistration>> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, type, payload, timestamp, status
                 FROM pending_registrations WHERE id = ?1",
                params![id],
                pending_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Number of pending registrations.
    pub fn pending_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM pending_registrations", [], |row| {
                    row.get(0)
                })?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Remove a pending registration after the server accepted it.
    ///
    /// Idempotent: removing an unknown id is not an error. Returns whether a
    /// row was actually deleted.
    pub fn remove_pending(&mut self, id: i64) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM sync_attempts WHERE pending_id = ?1",
            params![id],
        )?;
        let affected = tx.execute(
            "DELETE FROM pending_registrations WHERE id = ?1",
            params![id],
        )?;
        tx.commit()?;
        Ok(affected > 0)
    }

    /// Count a server rejection against a pending registration.
    ///
    /// Returns the total number of rejections recorded so far.
    pub fn record_rejection(&self, id: i64, error: &str) -> Result<u32> {
        self.conn.execute(
            "INSERT INTO sync_attempts (pending_id, rejections, last_error)
             VALUES (?1, 1, ?2)
             ON CONFLICT(pending_id) DO UPDATE SET
                 rejections = rejections + 1,
                 last_error = excluded.last_error",
            params![id, error],
        )?;
        let rejections: u32 = self.conn.query_row(
            "SELECT rejections FROM sync_attempts WHERE pending_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(rejections)
    }

    /// Number of rejections recorded for a pending registration.
    pub fn rejection_count(&self, id: i64) -> Result<u32> {
        let rejections = self
            .conn
            .query_row(
                "SELECT rejections FROM sync_attempts WHERE pending_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rejections.unwrap_or(0))
    }

    /// Move a pending registration to the dead-letter table.
    ///
    /// Insert and delete happen in one transaction so the entry is never lost
    /// or duplicated. Returns `None` if the id is no longer pending.
    pub fn dead_letter(&mut self, id: i64, last_error: &str) -> Result<Option<DeadLetter>> {
        let tx = self.conn.transaction()?;

        let Some(entry) = tx
            .query_row(
                "SELECT id, type, payload, timestamp, status
                 FROM pending_registrations WHERE id = ?1",
                params![id],
                pending_from_row,
            )
            .optional()?
        else {
            return Ok(None);
        };

        let rejections: u32 = tx
            .query_row(
                "SELECT rejections FROM sync_attempts WHERE pending_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);

        let dead = DeadLetter {
            id: entry.id,
            kind: entry.kind,
            payload: entry.payload,
            timestamp: entry.timestamp,
            rejections,
            last_error: last_error.to_string(),
            dead_at: now_ms(),
        };

        tx.execute(
            "INSERT INTO dead_letters (id, type, payload, timestamp, rejections, last_error, dead_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                dead.id,
                dead.kind.as_str(),
                serde_json::to_string(&dead.payload)?,
                dead.timestamp,
                dead.rejections,
                dead.last_error,
                dead.dead_at,
            ],
        )?;
        tx.execute(
            "DELETE FROM sync_attempts WHERE pending_id = ?1",
            params![id],
        )?;
        tx.execute(
            "DELETE FROM pending_registrations WHERE id = ?1",
            params![id],
        )?;
        tx.commit()?;

        Ok(Some(dead))
    }

    /// List dead letters, oldest first.
    pub fn list_dead_letters(&self) -> Result<Vec<DeadLetter>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, payload, timestamp, rejections, last_error, dead_at
             FROM dead_letters ORDER BY id",
        )?;

        let letters = stmt
            .query_map([], dead_letter_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(letters)
    }

    /// Put a dead letter back into the pending queue under a fresh id.
    pub fn requeue_dead_letter(&mut self, id: i64) -> Result<PendingRegistration> {
        let tx = self.conn.transaction()?;

        let dead = tx
            .query_row(
                "SELECT id, type, payload, timestamp, rejections, last_error, dead_at
                 FROM dead_letters WHERE id = ?1",
                params![id],
                dead_letter_from_row,
            )
            .optional()?
            .ok_or(Error::DeadLetterNotFound(id))?;

        let timestamp = now_ms();
        tx.execute(
            "INSERT INTO pending_registrations (type, payload, timestamp, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                dead.kind.as_str(),
                serde_json::to_string(&dead.payload)?,
                timestamp,
                PendingStatus::Pending.as_str(),
            ],
        )?;
        let new_id = tx.last_insert_rowid();
        tx.execute("DELETE FROM dead_letters WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(PendingRegistration {
            id: new_id,
            kind: dead.kind,
            payload: dead.payload,
            timestamp,
            status: PendingStatus::Pending,
        })
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
