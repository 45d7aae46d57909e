// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for cr-core operations.

use thiserror::Error;

/// All possible errors that can occur in cr-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid registration type: '{0}'\n  hint: valid types are: birth, death")]
    InvalidRegistrationType(String),

    #[error("invalid payload field '{field}': {reason}\n  hint: form fields must be strings or numbers")]
    InvalidPayload { field: String, reason: String },

    #[error("record has no registration number")]
    MissingRegistrationNumber,

    #[error("dead letter not found: {0}")]
    DeadLetterNotFound(i64),

    #[error("{0}")]
    InvalidInput(String),

    #[error("local storage unavailable: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Returns true when the local persistence layer could not be opened or written.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}

/// A specialized Result type for cr-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
