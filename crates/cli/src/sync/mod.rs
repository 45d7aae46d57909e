// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync with the registry server.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ online  ┌─────────────┐     ┌─────────────┐
//! │    Gate      │────────►│ RegistryApi │────►│  Registry   │
//! │(Submission)  │         │   (trait)   │◄────│   Server    │
//! └──────────────┘         └─────────────┘     └─────────────┘
//!        │ offline                ▲
//!        ▼                        │ replay
//! ┌──────────────┐         ┌─────────────┐     ┌─────────────┐
//! │  LocalStore  │◄────────│ SyncEngine  │◄────│  Monitor /  │
//! │ (queue+cache)│         │             │     │  daemon tick│
//! └──────────────┘         └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Durable SQLite queue for registrations captured offline
//! - Debounced connectivity monitor with a pluggable probe
//! - Sequential replay with per-entry isolation
//! - At most one pass across every process sharing the database
//! - Cached search results for offline lookup
//! - Injectable API trait for testing

mod api;
mod connectivity;
mod engine;
mod gate;
mod search;
mod store;

pub use api::{ApiError, ApiResult, HttpApi, RegistryApi};
pub use connectivity::{
    ConnectivityMonitor, ConnectivityState, HttpProbe, MonitorSettings, Probe, Transition,
};
pub use engine::{EngineSettings, PassOutcome, PassReport, SyncEngine, SyncEvent, SyncTrigger};
pub use gate::{SubmissionGate, SubmitOutcome};
pub use search::{RecordSearch, SearchOutcome};
pub use store::LocalStore;

#[cfg(test)]
mod test_helpers;



#[cfg(test)]
mod engine_tests;
