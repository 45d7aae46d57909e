// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `civreg watch`: follow connectivity in the foreground.
//!
//! Prints connectivity changes and every registration that syncs, and runs a
//! pass whenever the server comes back. Stops on Ctrl-C.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::colors;
use crate::error::Result;
use crate::sync::{HttpApi, LocalStore, SyncEngine, SyncEvent, SyncTrigger, Transition};

use super::{runtime, Context};

pub fn run(base: &Path) -> Result<()> {
    let ctx = Context::locate(base)?;
    let store = ctx.open_store()?;
    let api = ctx.api()?;
    runtime()?.block_on(watch(ctx, store, api))
}

async fn watch(ctx: Context, store: LocalStore, api: Arc<HttpApi>) -> Result<()> {
    let monitor = ctx.monitor().await?;
    let state = monitor.state();
    let engine = Arc::new(SyncEngine::new(store, api, ctx.engine_settings()));

    let mut transitions = monitor.subscribe();
    let engine_transitions = monitor.subscribe();
    let mut events = engine.subscribe();
    let cancel = CancellationToken::new();

    println!(
        "Watching {} ({}), Ctrl-C to stop",
        ctx.config.server,
        connectivity(state.is_online())
    );

    let monitor_task = monitor.spawn(cancel.clone());
    let follower = tokio::spawn(
        Arc::clone(&engine).follow_transitions(engine_transitions, cancel.clone()),
    );
    // Already online at startup: drain what accumulated before we started.
    if state.is_online() {
        engine.spawn_pass(SyncTrigger::WentOnline);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            t = transitions.recv() => match t {
                Ok(t) => println!("{}", describe_transition(t)),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
            e = events.recv() => match e {
                Ok(e) => println!("{}", describe_event(&e)),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    cancel.cancel();
    let _ = monitor_task.await;
    let _ = follower.await;
    Ok(())
}

fn connectivity(online: bool) -> String {
    if online {
        colors::good("online")
    } else {
        colors::warn("offline")
    }
}

pub(crate) fn describe_transition(transition: Transition) -> String {
    match transition {
        Transition::WentOnline => format!(
            "Server is {}; syncing pending registrations",
            connectivity(true)
        ),
        Transition::WentOffline => format!(
            "Server is {}; new registrations will be queued",
            connectivity(false)
        ),
    }
}

pub(crate) fn describe_event(event: &SyncEvent) -> String {
    match event {
        SyncEvent::Synced {
            local_id,
            kind,
            registration_number,
        } => format!("Synced {kind} #{local_id}: {registration_number}"),
        SyncEvent::DeadLettered {
            local_id,
            kind,
            rejections,
            last_error,
        } => format!(
            "Gave up on {kind} #{local_id} after {rejections} rejection(s): {last_error}"
        ),
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
