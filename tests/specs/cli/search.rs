// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Search command tests: offline fallback through the binary.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;

#[test]
fn offline_search_without_cache() {
    let temp = init_temp();
    civreg()
        .args(["search", "birth", "--last-name", "Owusu"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline: no cached birth records"));
}

#[test]
fn offline_search_json_without_cache() {
    let temp = init_temp();
    let out = json_output(
        civreg()
            .args(["search", "death", "--json"])
            .current_dir(temp.path()),
    );
    assert_eq!(out["source"], "none");
    assert_eq!(out["records"], serde_json::json!([]));
}

#[test]
fn queued_registrations_are_not_searchable() {
    // Only server records are cached; the queue is not a search source.
    let temp = init_temp();
    submit_birth(&temp, "Ama", "Owusu");
    civreg()
        .args(["search", "birth", "--first-name", "Ama"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no cached birth records"));
}

#[test]
fn search_rejects_non_numeric_age() {
    let temp = init_temp();
    civreg()
        .args(["search", "death", "--age-from", "old"])
        .current_dir(temp.path())
        .assert()
        .failure();
}
