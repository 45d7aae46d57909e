// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use cr_core::Payload;
use serde_json::{json, Value};

use super::api_tests::MockApi;
use super::engine::{EngineSettings, SyncEngine};
use super::store::LocalStore;

/// Turn a JSON object literal into a payload.
pub fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap()
}

/// The birth registration used throughout the scenarios.
pub fn ama() -> Payload {
    payload(json!({"child_first_name": "Ama", "child_last_name": "Owusu"}))
}

/// A birth registration for a named child.
pub fn birth(first_name: &str) -> Payload {
    payload(json!({"child_first_name": first_name, "child_last_name": "Mensah"}))
}

pub fn settings(holder: &str, dead_letter_after: u32) -> EngineSettings {
    EngineSettings {
        holder: holder.to_string(),
        lease: Duration::from_secs(60),
        dead_letter_after,
    }
}

/// An engine over `store` and `api` with no dead-lettering.
pub fn make_engine(store: &LocalStore, api: &Arc<MockApi>) -> Arc<SyncEngine<MockApi>> {
    Arc::new(SyncEngine::new(
        store.clone(),
        Arc::clone(api),
        settings("test", 0),
    ))
}
