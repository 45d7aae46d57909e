// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending, sync and status tests against an unreachable server.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;

#[test]
fn pending_empty() {
    let temp = init_temp();
    civreg()
        .arg("pending")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending registrations."));
}

#[test]
fn pending_lists_in_submission_order() {
    let temp = init_temp();
    submit_birth(&temp, "Ama", "Owusu");
    submit_birth(&temp, "Esi", "Mensah");

    civreg()
        .arg("pending")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 pending registration(s):"))
        .stdout(predicate::str::is_match(r"(?s)1\. birth  Ama Owusu  #1.*2\. birth  Esi Mensah  #2").unwrap());
}

#[test]
fn pending_json_has_raw_entries() {
    let temp = init_temp();
    submit_birth(&temp, "Ama", "Owusu");

    let out = json_output(civreg().args(["pending", "--json"]).current_dir(temp.path()));
    let entries = out.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], 1);
    assert_eq!(entries[0]["type"], "birth");
    assert_eq!(entries[0]["status"], "pending");
    assert_eq!(entries[0]["payload"]["child_first_name"], "Ama");
}

#[test]
fn pending_dead_empty() {
    let temp = init_temp();
    civreg()
        .args(["pending", "--dead"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No dead-lettered registrations."));
}

#[test]
fn sync_unreachable_keeps_queue() {
    let temp = init_temp();
    submit_birth(&temp, "Ama", "Owusu");

    let out = json_output(civreg().args(["sync", "--json"]).current_dir(temp.path()));
    assert_eq!(out["outcome"], "completed");
    assert_eq!(out["attempted"], 1);
    assert_eq!(out["failed"], 1);

    civreg()
        .arg("pending")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Ama Owusu"));
}

#[test]
fn status_reports_offline_and_counts() {
    let temp = init_temp();
    submit_birth(&temp, "Ama", "Owusu");

    let out = json_output(civreg().args(["status", "--json"]).current_dir(temp.path()));
    assert_eq!(out["online"], false);
    assert_eq!(out["pending"], 1);
    assert_eq!(out["dead_letters"], 0);
    assert_eq!(out["sync_lease"], serde_json::Value::Null);
}

#[test]
fn requeue_unknown_dead_letter_fails() {
    let temp = init_temp();
    civreg()
        .args(["requeue", "7"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("7"));
}
