// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Manual sync against an unreachable server.

use super::common::*;

#[test]
fn sync_empty_queue() {
    let temp = init_temp();

    civreg()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to sync"));
}

#[test]
fn sync_json_reports_failed_entries() {
    let temp = init_temp();
    submit_birth(&temp, "Ama", "Owusu");
    submit_birth(&temp, "Esi", "Mensah");

    let report = json_output(civreg().args(["sync", "--json"]).current_dir(temp.path()));

    assert_eq!(report["outcome"], "completed");
    assert_eq!(report["attempted"], 2);
    assert_eq!(report["synced"], 0);
    assert_eq!(report["failed"], 2);
    assert!(report.get("storage_error").is_none());

    let pending = json_output(civreg().args(["pending", "--json"]).current_dir(temp.path()));
    assert_eq!(pending.as_array().unwrap().len(), 2);
}

#[test]
fn status_json_after_failed_sync() {
    let temp = init_temp();
    submit_birth(&temp, "Ama", "Owusu");
    civreg()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success();

    let status = json_output(civreg().args(["status", "--json"]).current_dir(temp.path()));

    assert_eq!(status["online"], false);
    assert_eq!(status["pending"], 1);
    assert_eq!(status["sync_lease"], serde_json::Value::Null);
}
