// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::ApiError;

/// All possible errors that can occur in the crlib library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'civreg init --server <url>' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("invalid field '{arg}'\n  hint: form fields are written as name=value")]
    InvalidField { arg: String },

    #[error("duplicate field '{field}'")]
    DuplicateField { field: String },

    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("no form fields given\n  hint: civreg submit birth child_first_name=Ama ...")]
    EmptySubmission,

    #[error(transparent)]
    Core(#[from] cr_core::Error),

    #[error("server request failed: {0}")]
    Api(#[from] ApiError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true when the local store could not be opened or written.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Error::Core(e) if e.is_storage_unavailable())
    }
}

/// A specialized Result type for crlib operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
