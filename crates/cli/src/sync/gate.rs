// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-aware submission gate.
//!
//! Online, a registration goes straight to the server and any failure is
//! returned to the caller. Offline, it is written to the pending queue.

use std::sync::Arc;

use cr_core::registration::validate_payload;
use cr_core::{Payload, RegistrationType};
use serde::Serialize;

use super::api::RegistryApi;
use super::connectivity::ConnectivityState;
use super::store::LocalStore;
use crate::error::Result;

/// How a submission was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Accepted by the server.
    Submitted { registration_number: String },
    /// Saved locally; no registration number exists yet.
    Queued { local_id: i64 },
}

/// Routes submissions by connectivity.
pub struct SubmissionGate<A: RegistryApi> {
    store: LocalStore,
    api: Arc<A>,
    connectivity: Arc<ConnectivityState>,
}

impl<A: RegistryApi> SubmissionGate<A> {
    pub fn new(store: LocalStore, api: Arc<A>, connectivity: Arc<ConnectivityState>) -> Self {
        Self {
            store,
            api,
            connectivity,
        }
    }

    /// Submit a registration, or queue it while offline.
    pub async fn submit(&self, kind: RegistrationType, payload: Payload) -> Result<SubmitOutcome> {
        validate_payload(&payload)?;

        if self.connectivity.is_online() {
            let registration_number = self.api.submit(kind, &payload).await?;
            tracing::info!(kind = %kind, registration_number = %registration_number, "submitted registration");
            return Ok(SubmitOutcome::Submitted {
                registration_number,
            });
        }

        let entry = self.store.enqueue(kind, &payload).await?;
        tracing::info!(id = entry.id, kind = %kind, "queued registration while offline");
        Ok(SubmitOutcome::Queued { local_id: entry.id })
    }
}
