// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::{init_without_storage, StubServer, TestContext, UNREACHABLE_SERVER};
use yare::parameterized;

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_fields() {
    let payload = parse_fields(&args(&[
        "child_first_name=Ama",
        "child_last_name=Owusu",
        "notes=a=b",
        "middle_name=",
    ]))
    .unwrap();
    assert_eq!(payload["child_first_name"], "Ama");
    assert_eq!(payload["notes"], "a=b");
    assert_eq!(payload["middle_name"], "");
    assert_eq!(payload.len(), 4);
}

#[parameterized(
    no_equals = { "child_first_name" },
    empty_name = { "=Ama" },
    blank_name = { "  =Ama" },
)]
fn test_parse_fields_invalid(arg: &str) {
    let err = parse_fields(&args(&[arg])).unwrap_err();
    assert!(matches!(err, Error::InvalidField { .. }));
}

#[test]
fn test_parse_fields_duplicate() {
    let err = parse_fields(&args(&["a=1", "a=2"])).unwrap_err();
    assert!(matches!(err, Error::DuplicateField { field } if field == "a"));
}

#[test]
fn test_parse_fields_empty() {
    assert!(matches!(parse_fields(&[]), Err(Error::EmptySubmission)));
}

#[test]
fn test_describe() {
    let submitted = SubmitOutcome::Submitted {
        registration_number: "BRGH123456AB12".to_string(),
    };
    assert_eq!(
        describe(RegistrationType::Birth, &submitted),
        "Submitted birth registration: BRGH123456AB12"
    );

    let queued = describe(RegistrationType::Death, &SubmitOutcome::Queued { local_id: 3 });
    assert!(queued.starts_with("Offline: queued death registration #3"));
}

#[test]
fn test_run_offline_queues() {
    let t = TestContext::new();
    run(
        t.dir.path(),
        RegistrationType::Birth,
        &args(&["child_first_name=Ama", "child_last_name=Owusu"]),
        false,
    )
    .unwrap();

    let pending = t.db.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payload, TestContext::payload("Ama", "Owusu"));
}

#[test]
fn test_run_invalid_field_touches_nothing() {
    let t = TestContext::new();
    assert!(run(t.dir.path(), RegistrationType::Birth, &args(&["oops"]), false).is_err());
    assert_eq!(t.db.pending_count().unwrap(), 0);
}

#[test]
fn test_run_online_does_not_need_local_storage() {
    let server = StubServer::start(
        201,
        r#"{"success":true,"registrationNumber":"BRGH123456AB12"}"#,
    );
    let dir = init_without_storage(&server.url);

    run(dir.path(), RegistrationType::Birth, &args(&["child_first_name=Ama"]), false).unwrap();

    assert!(server
        .requests()
        .iter()
        .any(|line| line.starts_with("POST /api/births")));
}

#[test]
fn test_run_offline_surfaces_storage_error() {
    let dir = init_without_storage(UNREACHABLE_SERVER);

    let err = run(dir.path(), RegistrationType::Birth, &args(&["child_first_name=Ama"]), false)
        .unwrap_err();

    assert!(err.is_storage_unavailable(), "unexpected error: {err}");
}
