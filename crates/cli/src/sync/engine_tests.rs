// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync engine.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use cr_core::RegistrationType;
use tempfile::TempDir;
use tokio::sync::{broadcast, Semaphore};
use tokio_util::sync::CancellationToken;

use super::api::ApiError;
use super::api_tests::MockApi;
use super::connectivity::Transition;
use super::engine::{PassOutcome, PassReport, SyncEngine, SyncEvent, SyncTrigger};
use super::store::LocalStore;
use super::test_helpers::{ama, birth, make_engine, settings};

fn rejected() -> ApiError {
    ApiError::Rejected {
        status: 400,
        message: "Validation failed".to_string(),
        details: vec!["Date of Birth: cannot be in the future".to_string()],
    }
}

fn completed(outcome: PassOutcome) -> PassReport {
    match outcome {
        PassOutcome::Completed(report) => report,
        PassOutcome::Coalesced => PassReport {
            attempted: usize::MAX,
            ..PassReport::default()
        },
    }
}

#[tokio::test]
async fn test_synced_entry_is_removed_and_announced() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    api.push_submit(Ok("BRGH123456AB12".to_string()));
    let entry = store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();

    let engine = make_engine(&store, &api);
    let mut events = engine.subscribe();
    let report = completed(engine.trigger(SyncTrigger::WentOnline).await.unwrap());

    assert_eq!(report.attempted, 1);
    assert_eq!(report.synced, 1);
    assert!(store.list_pending().await.unwrap().is_empty());
    assert_eq!(
        events.try_recv().unwrap(),
        SyncEvent::Synced {
            local_id: entry.id,
            kind: RegistrationType::Birth,
            registration_number: "BRGH123456AB12".to_string(),
        }
    );
    assert_eq!(api.submitted(), vec![(RegistrationType::Birth, ama())]);
}

#[tokio::test]
async fn test_failed_entry_does_not_block_others() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    let first = store.enqueue(RegistrationType::Birth, &birth("Ama")).await.unwrap();
    let second = store.enqueue(RegistrationType::Death, &birth("Kofi")).await.unwrap();
    let third = store.enqueue(RegistrationType::Birth, &birth("Esi")).await.unwrap();
    api.push_submit(Ok("BRGH000001AA00".to_string()));
    api.push_submit(Err(ApiError::Network("connection reset".to_string())));
    api.push_submit(Ok("BRGH000003AA00".to_string()));

    let engine = make_engine(&store, &api);
    let mut events = engine.subscribe();
    let report = completed(engine.trigger(SyncTrigger::Background).await.unwrap());

    assert_eq!(
        report,
        PassReport {
            attempted: 3,
            synced: 2,
            failed: 1,
            dead_lettered: 0,
            lease_lost: false,
            storage_error: None,
        }
    );
    assert_eq!(store.list_pending().await.unwrap(), vec![second.clone()]);

    let mut synced_ids = Vec::new();
    while let Ok(SyncEvent::Synced { local_id, .. }) = events.try_recv() {
        synced_ids.push(local_id);
    }
    assert_eq!(synced_ids, vec![first.id, third.id]);

    // Submitted in queue order, routed by type
    let kinds: Vec<_> = api.submitted().into_iter().map(|(kind, _)| kind).collect();
    assert_eq!(
        kinds,
        vec![
            RegistrationType::Birth,
            RegistrationType::Death,
            RegistrationType::Birth
        ]
    );
}

#[tokio::test]
async fn test_failure_kinds_all_leave_entry_queued() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    for _ in 0..4 {
        store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();
    }
    api.push_submit(Err(ApiError::Timeout));
    api.push_submit(Err(rejected()));
    api.push_submit(Err(ApiError::Server {
        status: 500,
        message: "Server error".to_string(),
    }));
    api.push_submit(Err(ApiError::MalformedResponse("not json".to_string())));

    let engine = make_engine(&store, &api);
    let report = completed(engine.trigger(SyncTrigger::Manual).await.unwrap());

    assert_eq!(report.failed, 4);
    assert_eq!(store.pending_count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_empty_queue_completes() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    let engine = make_engine(&store, &api);

    let outcome = engine.trigger(SyncTrigger::Manual).await.unwrap();
    assert_eq!(outcome, PassOutcome::Completed(PassReport::default()));
    assert!(api.submitted().is_empty());
}

#[tokio::test]
async fn test_second_trigger_during_pass_is_coalesced() {
    let store = LocalStore::in_memory().unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let api = Arc::new(MockApi::held(Arc::clone(&gate)));
    store.enqueue(RegistrationType::Birth, &birth("Ama")).await.unwrap();
    store.enqueue(RegistrationType::Birth, &birth("Esi")).await.unwrap();

    let engine = make_engine(&store, &api);
    let started = api.started();
    let first = engine.spawn_pass(SyncTrigger::WentOnline);
    started.notified().await;
    assert!(engine.is_syncing());

    // Enqueued after the snapshot: not part of the running pass
    let late = store.enqueue(RegistrationType::Birth, &birth("Yaw")).await.unwrap();

    let second = engine.trigger(SyncTrigger::Background).await.unwrap();
    assert_eq!(second, PassOutcome::Coalesced);

    gate.add_permits(10);
    let report = completed(first.await.unwrap().unwrap());
    assert_eq!(report.attempted, 2);
    assert_eq!(report.synced, 2);
    assert!(!engine.is_syncing());
    assert_eq!(store.list_pending().await.unwrap(), vec![late]);
    assert_eq!(api.submitted().len(), 2);
}

#[tokio::test]
async fn test_went_online_during_pass_joins_it() {
    let store = LocalStore::in_memory().unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let api = Arc::new(MockApi::held(Arc::clone(&gate)));
    store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();
    api.push_submit(Err(ApiError::Timeout));

    let engine = make_engine(&store, &api);
    let (transitions, receiver) = broadcast::channel(16);
    let cancel = CancellationToken::new();
    let follower = tokio::spawn(Arc::clone(&engine).follow_transitions(receiver, cancel.clone()));

    let started = api.started();
    transitions.send(Transition::WentOnline).unwrap();
    started.notified().await;
    transitions.send(Transition::WentOnline).unwrap();
    transitions.send(Transition::WentOnline).unwrap();

    // Let the follower read both and their triggers hit the running pass
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(transitions.len(), 0);

    gate.add_permits(10);
    tokio::time::timeout(Duration::from_secs(5), async {
        while engine.is_syncing() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pass finishes");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(api.submitted().len(), 1);
    assert_eq!(store.pending_count().await.unwrap(), 1);

    cancel.cancel();
    follower.await.unwrap();
}

#[tokio::test]
async fn test_lease_held_elsewhere_coalesces() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();
    assert!(store
        .try_acquire_sync_lease("civregd-1", Duration::from_secs(60))
        .await
        .unwrap());

    let engine = make_engine(&store, &api);
    let outcome = engine.trigger(SyncTrigger::WentOnline).await.unwrap();

    assert_eq!(outcome, PassOutcome::Coalesced);
    assert!(api.submitted().is_empty());
    assert_eq!(store.pending_count().await.unwrap(), 1);
    assert!(!engine.is_syncing());
}

#[tokio::test]
async fn test_expired_lease_is_taken_over() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();
    store
        .try_acquire_sync_lease("crashed-7", Duration::ZERO)
        .await
        .unwrap();

    let engine = make_engine(&store, &api);
    let report = completed(engine.trigger(SyncTrigger::Background).await.unwrap());

    assert_eq!(report.synced, 1);
    assert!(store.current_sync_lease().await.unwrap().is_none());
}

#[tokio::test]
async fn test_lease_released_after_pass() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();
    api.push_submit(Err(ApiError::Timeout));

    let engine = make_engine(&store, &api);
    engine.trigger(SyncTrigger::Manual).await.unwrap();

    assert!(store.current_sync_lease().await.unwrap().is_none());
}

#[tokio::test]
async fn test_rejections_dead_letter_after_threshold() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    let entry = store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();
    api.push_submit(Err(rejected()));
    api.push_submit(Err(rejected()));

    let engine = SyncEngine::new(store.clone(), Arc::clone(&api), settings("test", 2));
    let mut events = engine.subscribe();

    let first = completed(engine.trigger(SyncTrigger::Manual).await.unwrap());
    assert_eq!(first.failed, 1);
    assert_eq!(store.pending_count().await.unwrap(), 1);

    let second = completed(engine.trigger(SyncTrigger::Manual).await.unwrap());
    assert_eq!(second.dead_lettered, 1);
    assert_eq!(second.failed, 0);
    assert!(store.list_pending().await.unwrap().is_empty());

    let dead = store.list_dead_letters().await.unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].id, entry.id);
    assert_eq!(dead[0].rejections, 2);
    assert!(dead[0].last_error.contains("Validation failed"));

    match events.try_recv().unwrap() {
        SyncEvent::DeadLettered {
            local_id,
            rejections,
            ..
        } => {
            assert_eq!(local_id, entry.id);
            assert_eq!(rejections, 2);
        }
        other => unreachable!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_network_failures_never_dead_letter() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();
    api.push_submit(Err(ApiError::Timeout));
    api.push_submit(Err(ApiError::Server {
        status: 503,
        message: "unavailable".to_string(),
    }));

    let engine = SyncEngine::new(store.clone(), Arc::clone(&api), settings("test", 1));
    engine.trigger(SyncTrigger::Manual).await.unwrap();
    engine.trigger(SyncTrigger::Manual).await.unwrap();

    assert_eq!(store.pending_count().await.unwrap(), 1);
    assert!(store.list_dead_letters().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unlimited_retries_by_default() {
    let store = LocalStore::in_memory().unwrap();
    let api = Arc::new(MockApi::new());
    store.enqueue(RegistrationType::Birth, &ama()).await.unwrap();
    for _ in 0..5 {
        api.push_submit(Err(rejected()));
    }

    let engine = make_engine(&store, &api);
    for _ in 0..5 {
        engine.trigger(SyncTrigger::Manual).await.unwrap();
    }

    assert_eq!(store.pending_count().await.unwrap(), 1);
    assert!(store.list_dead_letters().await.unwrap().is_empty());
}

/// A file-backed store, with `sql` run through a second connection.
fn store_with(dir: &TempDir, sql: &str) -> LocalStore {
    let path = dir.path().join("registry.db");
    let store = LocalStore::open(&path).unwrap();
    cr_core::Database::open(&path)
        .unwrap()
        .conn
        .execute_batch(sql)
        .unwrap();
    store
}

#[tokio::test]
async fn test_storage_failure_after_submit_stops_pass() {
    let dir = TempDir::new().unwrap();
    let store = store_with(
        &dir,
        "CREATE TRIGGER fail_remove BEFORE DELETE ON pending_registrations
         BEGIN SELECT RAISE(ABORT, 'disk unavailable'); END;",
    );
    let api = Arc::new(MockApi::new());
    let first = store.enqueue(RegistrationType::Birth, &birth("Ama")).await.unwrap();
    store.enqueue(RegistrationType::Birth, &birth("Esi")).await.unwrap();
    api.push_submit(Ok("BRGH000001AA00".to_string()));

    let engine = make_engine(&store, &api);
    let mut events = engine.subscribe();
    let report = completed(engine.trigger(SyncTrigger::Manual).await.unwrap());

    assert_eq!(report.attempted, 1);
    assert_eq!(report.synced, 1);
    assert!(report.storage_error.unwrap().contains("disk unavailable"));
    assert_eq!(api.submitted().len(), 1);
    assert_eq!(store.pending_count().await.unwrap(), 2);
    assert!(store.current_sync_lease().await.unwrap().is_none());

    // Still announced: the server holds a registration for it
    assert!(matches!(
        events.try_recv().unwrap(),
        SyncEvent::Synced { local_id, .. } if local_id == first.id
    ));
}

#[tokio::test]
async fn test_failing_rejection_count_does_not_stop_pass() {
    let dir = TempDir::new().unwrap();
    let store = store_with(
        &dir,
        "CREATE TRIGGER fail_attempts BEFORE INSERT ON sync_attempts
         BEGIN SELECT RAISE(ABORT, 'disk unavailable'); END;",
    );
    let api = Arc::new(MockApi::new());
    let first = store.enqueue(RegistrationType::Birth, &birth("Ama")).await.unwrap();
    store.enqueue(RegistrationType::Birth, &birth("Esi")).await.unwrap();
    api.push_submit(Err(rejected()));
    api.push_submit(Ok("BRGH000002AA00".to_string()));

    let engine = SyncEngine::new(store.clone(), Arc::clone(&api), settings("test", 2));
    let report = completed(engine.trigger(SyncTrigger::Manual).await.unwrap());

    assert_eq!(report.attempted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.synced, 1);
    assert_eq!(report.storage_error, None);
    assert_eq!(store.list_pending().await.unwrap(), vec![first]);
}

#[test]
fn test_trigger_display() {
    assert_eq!(SyncTrigger::WentOnline.to_string(), "went-online");
    assert_eq!(SyncTrigger::Background.as_str(), "background");
}
