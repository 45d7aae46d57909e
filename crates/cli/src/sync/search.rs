// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record search with an offline fallback.
//!
//! Online searches go to the server and refresh the cached records for that
//! type. Offline searches filter the cached records locally.

use std::sync::Arc;

use cr_core::{filter_records, CachedRecord, RegistrationType, SearchParams};

use super::api::{ApiError, RegistryApi};
use super::connectivity::ConnectivityState;
use super::store::LocalStore;
use crate::error::Result;

/// Where search results came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Fresh results from the server.
    Live(Vec<CachedRecord>),
    /// Filtered from the local cache; may be empty.
    Cached(Vec<CachedRecord>),
    /// Offline with nothing cached for this type.
    NoCachedData,
}

/// Searches the server or the local cache depending on connectivity.
pub struct RecordSearch<A: RegistryApi> {
    store: LocalStore,
    api: Arc<A>,
    connectivity: Arc<ConnectivityState>,
}

impl<A: RegistryApi> RecordSearch<A> {
    pub fn new(store: LocalStore, api: Arc<A>, connectivity: Arc<ConnectivityState>) -> Self {
        Self {
            store,
            api,
            connectivity,
        }
    }

    pub async fn search(&self, kind: RegistrationType, params: &SearchParams) -> Result<SearchOutcome> {
        if self.connectivity.is_online() {
            match self.api.search(kind, params).await {
                Ok(values) => return self.refresh(kind, values).await,
                // The server vanished between the probe and the request
                Err(e @ (ApiError::Network(_) | ApiError::Timeout)) => {
                    tracing::warn!(error = %e, "online search failed, using cached records");
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.search_cached(kind, params).await
    }

    async fn refresh(
        &self,
        kind: RegistrationType,
        values: Vec<serde_json::Value>,
    ) -> Result<SearchOutcome> {
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match CachedRecord::from_server(kind, value) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "skipping search result"),
            }
        }

        // A failed refresh keeps the previous cache; the live results still stand.
        if let Err(e) = self.store.replace_cached(kind, &records).await {
            tracing::warn!(kind = %kind, error = %e, "failed to refresh cached records");
        }
        Ok(SearchOutcome::Live(records))
    }

    async fn search_cached(
        &self,
        kind: RegistrationType,
        params: &SearchParams,
    ) -> Result<SearchOutcome> {
        let cached = self.store.cached_by_type(kind).await?;
        if cached.is_empty() {
            return Ok(SearchOutcome::NoCachedData);
        }
        Ok(SearchOutcome::Cached(filter_records(cached, params)))
    }
}
