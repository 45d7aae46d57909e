// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitoring.
//!
//! The monitor probes the registry server on a fixed interval and keeps a
//! process-wide online flag. Other components get a read-only handle to
//! [`ConnectivityState`]; only this module can change it.
//!
//! A transition is committed only after `settle_samples` consecutive probes
//! disagree with the current state, so a single flapping probe never emits
//! an event.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::api::ApiError;

/// Online/offline flag shared across the process.
///
/// Uses an atomic field for lock-free reads from the gate and search.
#[derive(Debug)]
pub struct ConnectivityState {
    online: AtomicBool,
}

impl ConnectivityState {
    /// Create a state with the given initial value.
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Check if the server is currently considered reachable.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Store a new value. Returns true if it changed.
    pub(crate) fn set(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::AcqRel) != online
    }

    /// Human-readable state for status output.
    pub fn status_string(&self) -> &'static str {
        if self.is_online() {
            "online"
        } else {
            "offline"
        }
    }
}

/// A committed change of connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
}

/// Reachability probe.
///
/// Abstracts the platform signal so tests can script online/offline samples.
pub trait Probe: Send + Sync {
    /// Returns true if the server answered.
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Probe that issues `GET {server}/` with a short timeout.
///
/// Any HTTP response, whatever its status, counts as reachable.
pub struct HttpProbe {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpProbe {
    pub fn new(server: &str, timeout: Duration) -> Result<Self, ApiError> {
        let url = reqwest::Url::parse(server).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(HttpProbe { client, url })
    }
}

impl Probe for HttpProbe {
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match self.client.get(self.url.clone()).send().await {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(error = %e, "reachability probe failed");
                    false
                }
            }
        })
    }
}

/// Configuration for the connectivity monitor.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Delay between probes.
    pub poll_interval: Duration,
    /// Consecutive disagreeing probes needed to flip the state (min 1).
    pub settle_samples: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            settle_samples: 2,
        }
    }
}

/// Polls a [`Probe`] and publishes debounced [`Transition`]s.
pub struct ConnectivityMonitor<P: Probe> {
    probe: P,
    state: Arc<ConnectivityState>,
    settings: MonitorSettings,
    events: broadcast::Sender<Transition>,
    /// Disagreeing samples seen in a row.
    streak: u32,
}

impl<P: Probe> ConnectivityMonitor<P> {
    /// Create a monitor, taking the initial state from one startup probe.
    pub async fn start(probe: P, settings: MonitorSettings) -> Self {
        let online = probe.probe().await;
        tracing::info!(online, "initial connectivity");
        Self::with_state(probe, Arc::new(ConnectivityState::new(online)), settings)
    }

    /// Create a monitor around an existing state (for testing).
    pub fn with_state(probe: P, state: Arc<ConnectivityState>, settings: MonitorSettings) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            probe,
            state,
            settings,
            events,
            streak: 0,
        }
    }

    /// Read-only handle to the shared state.
    pub fn state(&self) -> Arc<ConnectivityState> {
        Arc::clone(&self.state)
    }

    /// Subscribe to committed transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.events.subscribe()
    }

    /// Take one probe sample and commit a transition if the streak is long enough.
    pub async fn sample(&mut self) -> Option<Transition> {
        let observed = self.probe.probe().await;
        if observed == self.state.is_online() {
            self.streak = 0;
            return None;
        }

        self.streak = self.streak.saturating_add(1);
        if self.streak < self.settings.settle_samples.max(1) {
            tracing::debug!(observed, streak = self.streak, "connectivity sample disagrees");
            return None;
        }

        self.streak = 0;
        self.state.set(observed);
        let transition = if observed {
            Transition::WentOnline
        } else {
            Transition::WentOffline
        };
        tracing::info!(?transition, "connectivity changed");
        // No receivers is fine; the state itself is authoritative.
        let _ = self.events.send(transition);
        Some(transition)
    }

    /// Poll until cancelled.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = self.sample() => {}
            }
        }
    }
}

impl<P: Probe + 'static> ConnectivityMonitor<P> {
    /// Run the monitor as a background task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
