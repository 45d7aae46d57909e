// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core registration types.
//!
//! This module contains the data types shared by the local queue, the record
//! cache and the sync engine: RegistrationType, PendingRegistration,
//! CachedRecord and DeadLetter.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Form fields exactly as the remote endpoint expects them.
pub type Payload = Map<String, Value>;

/// Kind of civil registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationType {
    /// Birth registration.
    Birth,
    /// Death registration.
    Death,
}

impl RegistrationType {
    /// All registration types, in display order.
    pub const ALL: [RegistrationType; 2] = [RegistrationType::Birth, RegistrationType::Death];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationType::Birth => "birth",
            RegistrationType::Death => "death",
        }
    }

    /// Returns the server collection name (`births` / `deaths`).
    pub fn collection(&self) -> &'static str {
        match self {
            RegistrationType::Birth => "births",
            RegistrationType::Death => "deaths",
        }
    }

    /// Returns the prefix of the subject's name fields.
    pub fn subject_prefix(&self) -> &'static str {
        match self {
            RegistrationType::Birth => "child",
            RegistrationType::Death => "deceased",
        }
    }

    /// Returns the field holding the event date (ISO `YYYY-MM-DD`).
    pub fn date_field(&self) -> &'static str {
        match self {
            RegistrationType::Birth => "date_of_birth",
            RegistrationType::Death => "date_of_death",
        }
    }

    /// Returns the field holding the event place.
    pub fn place_field(&self) -> &'static str {
        match self {
            RegistrationType::Birth => "place_of_birth",
            RegistrationType::Death => "place_of_death",
        }
    }
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RegistrationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "birth" | "births" => Ok(RegistrationType::Birth),
            "death" | "deaths" => Ok(RegistrationType::Death),
            _ => Err(Error::InvalidRegistrationType(s.to_string())),
        }
    }
}

/// Check that every payload value is a string or a number.
pub fn validate_payload(payload: &Payload) -> Result<()> {
    for (field, value) in payload {
        let kind = match value {
            Value::String(_) | Value::Number(_) => continue,
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        return Err(Error::InvalidPayload {
            field: field.clone(),
            reason: format!("expected string or number, got {kind}"),
        });
    }
    Ok(())
}

/// Read a field from a record as text, rendering numbers as strings.
pub fn field_text<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<std::borrow::Cow<'a, str>> {
    match fields.get(name)? {
        Value::String(s) => Some(std::borrow::Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(std::borrow::Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// Persisted state of a queued registration.
///
/// Only `pending` is ever stored; a successful sync deletes the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingStatus {
    Pending,
}

impl PendingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingStatus::Pending => "pending",
        }
    }
}

impl FromStr for PendingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(PendingStatus::Pending),
            _ => Err(Error::CorruptedData(format!("invalid pending status '{s}'"))),
        }
    }
}

/// A registration captured while offline, awaiting replay to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRegistration {
    /// Local id assigned by the queue; never reused.
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RegistrationType,
    pub payload: Payload,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub status: PendingStatus,
}

impl PendingRegistration {
    /// Creation time as a UTC datetime.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// The registered person's name, e.g. "Ama Owusu".
    pub fn subject_name(&self) -> String {
        subject_name(self.kind, &self.payload)
    }
}

/// Join the first and last name fields of a registration subject.
pub fn subject_name(kind: RegistrationType, fields: &Map<String, Value>) -> String {
    let prefix = kind.subject_prefix();
    let first = field_text(fields, &format!("{prefix}_first_name")).unwrap_or_default();
    let last = field_text(fields, &format!("{prefix}_last_name")).unwrap_or_default();
    format!("{first} {last}").trim().to_string()
}

/// A server record mirrored locally for offline search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRecord {
    pub registration_number: String,
    pub record_type: RegistrationType,
    /// Snapshot of the server record as of the last fetch.
    pub data: Map<String, Value>,
}

impl CachedRecord {
    /// Build a cached record from a server search result.
    pub fn from_server(record_type: RegistrationType, value: Value) -> Result<Self> {
        let Value::Object(data) = value else {
            return Err(Error::InvalidInput(
                "search result is not a JSON object".to_string(),
            ));
        };
        let registration_number = match data.get("registration_number") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(Error::MissingRegistrationNumber),
        };
        Ok(CachedRecord {
            registration_number,
            record_type,
            data,
        })
    }

    /// Read a field as text.
    pub fn field(&self, name: &str) -> Option<std::borrow::Cow<'_, str>> {
        field_text(&self.data, name)
    }

    /// The registered person's name.
    pub fn subject_name(&self) -> String {
        subject_name(self.record_type, &self.data)
    }
}

/// A queued registration the server kept rejecting, parked for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    /// The id the entry had in the pending queue.
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RegistrationType,
    pub payload: Payload,
    pub timestamp: i64,
    pub rejections: u32,
    pub last_error: String,
    /// When the entry was parked, milliseconds since the Unix epoch.
    pub dead_at: i64,
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
