// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unusable local storage while the server is unreachable.

use super::common::*;

/// Replace the database file with a directory so SQLite cannot open it.
fn break_storage(temp: &TempDir) {
    let db = temp.path().join(".civreg/registry.db");
    std::fs::remove_file(&db).unwrap();
    std::fs::create_dir(&db).unwrap();
}

#[test]
fn offline_submit_reports_storage_error() {
    let temp = init_temp();
    break_storage(&temp);

    civreg()
        .args(["submit", "birth", "child_first_name=Ama"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("local storage unavailable"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn offline_search_reports_storage_error() {
    let temp = init_temp();
    break_storage(&temp);

    civreg()
        .args(["search", "birth", "--last-name", "Owusu"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("local storage unavailable"));
}

#[test]
fn pending_reports_storage_error() {
    let temp = init_temp();
    break_storage(&temp);

    civreg()
        .arg("pending")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("local storage unavailable"));
}
