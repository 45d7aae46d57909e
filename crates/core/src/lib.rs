// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cr-core: Shared library for the civreg offline registry client
//!
//! This crate provides the registration data types, the SQLite-backed local
//! queue and record cache, and the offline search filter used by both the
//! civreg CLI and the civregd background worker.

pub mod cache;
pub mod db;
pub mod error;
pub mod filter;
pub mod lease;
pub mod pending;
pub mod registration;

pub use db::Database;
pub use error::{Error, Result};
pub use filter::{filter_records, SearchParams};
pub use lease::SyncLease;
pub use registration::{
    CachedRecord, DeadLetter, Payload, PendingRegistration, PendingStatus, RegistrationType,
};
