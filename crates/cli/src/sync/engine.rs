// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: replays the pending queue against the registry server.
//!
//! A pass snapshots the queue and submits each entry in order, one at a time.
//! Entries the server accepts are removed; every other entry stays queued for
//! the next trigger. One failing entry never stops the rest of the pass.
//!
//! At most one pass runs at a time. Inside a process an atomic flag turns a
//! second trigger into [`PassOutcome::Coalesced`]. Across processes the
//! `sync_lock` lease in the shared database does the same.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cr_core::{PendingRegistration, RegistrationType};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::api::{ApiError, RegistryApi};
use super::connectivity::Transition;
use super::store::LocalStore;
use crate::error::Result;

/// What asked for a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The connectivity monitor saw the server come back.
    WentOnline,
    /// Periodic tick from the background worker.
    Background,
    /// `civreg sync`.
    Manual,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::WentOnline => "went-online",
            SyncTrigger::Background => "background",
            SyncTrigger::Manual => "manual",
        }
    }
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-entry notifications from a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The server accepted a queued entry.
    Synced {
        local_id: i64,
        kind: RegistrationType,
        registration_number: String,
    },
    /// An entry was rejected too often and moved to the dead-letter table.
    DeadLettered {
        local_id: i64,
        kind: RegistrationType,
        rejections: u32,
        last_error: String,
    },
}

/// Counts for one completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
    pub dead_lettered: usize,
    /// The lease expired and was taken over mid-pass; the pass stopped early.
    pub lease_lost: bool,
    /// Local storage failed mid-pass; the pass stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,
}

/// Result of a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(PassReport),
    /// Another pass was already running, here or in another process.
    Coalesced,
}

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Lease holder name, unique per process.
    pub holder: String,
    /// Lease lifetime; renewed after every entry.
    pub lease: Duration,
    /// Rejections before an entry is dead-lettered. 0 = never.
    pub dead_letter_after: u32,
}

impl EngineSettings {
    /// Settings for this process, e.g. holder `civregd-4242`.
    pub fn for_process(name: &str, lease: Duration, dead_letter_after: u32) -> Self {
        Self {
            holder: format!("{}-{}", name, std::process::id()),
            lease,
            dead_letter_after,
        }
    }
}

/// Resets the in-process syncing flag when a pass ends, however it ends.
struct SyncingGuard<'a>(&'a AtomicBool);

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drains the pending queue. States: Idle, Syncing.
pub struct SyncEngine<A: RegistryApi> {
    store: LocalStore,
    api: Arc<A>,
    settings: EngineSettings,
    syncing: AtomicBool,
    events: broadcast::Sender<SyncEvent>,
}

impl<A: RegistryApi> SyncEngine<A> {
    pub fn new(store: LocalStore, api: Arc<A>, settings: EngineSettings) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            store,
            api,
            settings,
            syncing: AtomicBool::new(false),
            events,
        }
    }

    /// Subscribe to per-entry sync events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Check if a pass is running in this process.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Run one pass unless one is already running.
    pub async fn trigger(&self, trigger: SyncTrigger) -> Result<PassOutcome> {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(%trigger, "sync pass already running, coalescing");
            return Ok(PassOutcome::Coalesced);
        }
        let _guard = SyncingGuard(&self.syncing);

        let holder = &self.settings.holder;
        if !self
            .store
            .try_acquire_sync_lease(holder, self.settings.lease)
            .await?
        {
            tracing::info!(%trigger, "sync lease held by another process, coalescing");
            return Ok(PassOutcome::Coalesced);
        }

        tracing::debug!(%trigger, holder, "sync pass starting");
        let drained = self.drain().await;
        if let Err(e) = self.store.release_sync_lease(holder).await {
            tracing::warn!(error = %e, "failed to release sync lease");
        }
        let report = drained?;

        if report.attempted > 0 {
            tracing::info!(
                %trigger,
                attempted = report.attempted,
                synced = report.synced,
                failed = report.failed,
                dead_lettered = report.dead_lettered,
                "sync pass finished"
            );
        }
        Ok(PassOutcome::Completed(report))
    }

    async fn drain(&self) -> Result<PassReport> {
        let snapshot = self.store.list_pending().await?;
        let mut report = PassReport::default();

        for entry in snapshot {
            report.attempted += 1;

            match self.api.submit(entry.kind, &entry.payload).await {
                Ok(registration_number) => {
                    report.synced += 1;
                    let removed = self.store.remove_pending(entry.id).await;
                    tracing::info!(
                        id = entry.id,
                        kind = %entry.kind,
                        registration_number = %registration_number,
                        "synced pending registration"
                    );
                    let _ = self.events.send(SyncEvent::Synced {
                        local_id: entry.id,
                        kind: entry.kind,
                        registration_number,
                    });
                    // Still queued, so the next pass submits it again
                    if let Err(e) = removed {
                        tracing::error!(
                            id = entry.id,
                            error = %e,
                            "synced registration is still queued, stopping pass"
                        );
                        report.storage_error = Some(e.to_string());
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        id = entry.id,
                        kind = %entry.kind,
                        error = %e,
                        "failed to sync pending registration"
                    );
                    match self.count_rejection(&entry, &e).await {
                        Ok(true) => report.dead_lettered += 1,
                        Ok(false) => report.failed += 1,
                        Err(e) => {
                            tracing::warn!(id = entry.id, error = %e, "failed to record rejection");
                            report.failed += 1;
                        }
                    }
                }
            }

            match self
                .store
                .renew_sync_lease(&self.settings.holder, self.settings.lease)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!("sync lease lost mid-pass, stopping");
                    report.lease_lost = true;
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to renew sync lease, stopping pass");
                    report.storage_error = Some(e.to_string());
                    break;
                }
            }
        }

        Ok(report)
    }

    /// Count a rejection toward the dead-letter threshold.
    ///
    /// Returns true if the entry was moved to the dead-letter table.
    async fn count_rejection(&self, entry: &PendingRegistration, error: &ApiError) -> Result<bool> {
        let threshold = self.settings.dead_letter_after;
        if threshold == 0 || !error.is_rejection() {
            return Ok(false);
        }

        let message = error.to_string();
        let rejections = self.store.record_rejection(entry.id, &message).await?;
        if rejections < threshold {
            return Ok(false);
        }

        let Some(dead) = self.store.dead_letter(entry.id, &message).await? else {
            return Ok(false);
        };
        tracing::warn!(
            id = dead.id,
            kind = %dead.kind,
            rejections = dead.rejections,
            "moved pending registration to dead letters"
        );
        let _ = self.events.send(SyncEvent::DeadLettered {
            local_id: dead.id,
            kind: dead.kind,
            rejections: dead.rejections,
            last_error: dead.last_error,
        });
        Ok(true)
    }
}

impl<A: RegistryApi + 'static> SyncEngine<A> {
    /// Run a pass as a background task.
    ///
    /// A trigger that arrives while the task runs is coalesced.
    pub fn spawn_pass(self: &Arc<Self>, trigger: SyncTrigger) -> JoinHandle<Result<PassOutcome>> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.trigger(trigger).await })
    }

    /// Start a pass on every `WentOnline` transition until cancelled.
    ///
    /// Passes run as their own tasks so transitions keep being read while one
    /// is in flight; those arriving mid-pass coalesce into it.
    pub async fn follow_transitions(
        self: Arc<Self>,
        mut transitions: broadcast::Receiver<Transition>,
        cancel: CancellationToken,
    ) {
        loop {
            let transition = tokio::select! {
                _ = cancel.cancelled() => return,
                t = transitions.recv() => t,
            };
            match transition {
                Ok(Transition::WentOnline) => self.spawn_logged(SyncTrigger::WentOnline),
                Ok(Transition::WentOffline) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "missed connectivity transitions");
                    self.spawn_logged(SyncTrigger::WentOnline);
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }

    /// Run a background pass every `interval` until cancelled.
    ///
    /// The first tick fires immediately so a restarted worker drains what
    /// accumulated while it was down.
    pub async fn run_background(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => self.run_logged(SyncTrigger::Background).await,
            }
        }
    }

    fn spawn_logged(self: &Arc<Self>, trigger: SyncTrigger) {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.run_logged(trigger).await });
    }

    async fn run_logged(&self, trigger: SyncTrigger) {
        if let Err(e) = self.trigger(trigger).await {
            tracing::error!(%trigger, error = %e, "sync pass failed");
        }
    }
}
