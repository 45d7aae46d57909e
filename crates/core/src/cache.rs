// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local mirror of server search results.

use rusqlite::{params, Row};

use crate::db::{now_ms, parse_db, parse_json, Database};
use crate::error::{Error, Result};
use crate::registration::{CachedRecord, RegistrationType};

fn cached_from_row(row: &Row<'_>) -> std::result::Result<CachedRecord, rusqlite::Error> {
    let type_str: String = row.get(1)?;
    let data_str: String = row.get(2)?;

    Ok(CachedRecord {
        registration_number: row.get(0)?,
        record_type: parse_db(&type_str, "record_type")?,
        data: parse_json(&data_str, "data")?,
    })
}

impl Database {
    /// Replace every cached record of one type with `records`.
    ///
    /// The old set is deleted and the new one inserted inside one transaction.
    /// If any insert fails the old set is left as it was.
    pub fn replace_cached(&mut self, kind: RegistrationType, records: &[CachedRecord]) -> Result<()> {
        if let Some(stray) = records.iter().find(|r| r.record_type != kind) {
            return Err(Error::InvalidInput(format!(
                "record {} is a {} record, not {}",
                stray.registration_number, stray.record_type, kind
            )));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM cached_records WHERE record_type = ?1",
            params![kind.as_str()],
        )?;

        let cached_at = now_ms();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cached_records (registration_number, record_type, data, cached_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.registration_number,
                    kind.as_str(),
                    serde_json::to_string(&record.data)?,
                    cached_at,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(kind = %kind, count = records.len(), "replaced cached records");
        Ok(())
    }

    /// All cached records of one type, ordered by registration number.
    pub fn cached_by_type(&self, kind: RegistrationType) -> Result<Vec<CachedRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT registration_number, record_type, data
             FROM cached_records WHERE record_type = ?1
             ORDER BY registration_number",
        )?;

        let records = stmt
            .query_map(params![kind.as_str()], cached_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Whether any record of any type is cached.
    pub fn has_cached(&self) -> Result<bool> {
        let exists: bool =
            self.conn
                .query_row("SELECT EXISTS(SELECT 1 FROM cached_records)", [], |row| {
                    row.get(0)
                })?;
        Ok(exists)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
