// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Submit command tests: offline capture through the binary.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;

#[test]
fn init_creates_civreg_directory() {
    let temp = init_temp();
    assert!(temp.path().join(".civreg/config.toml").exists());
    assert!(temp.path().join(".civreg/registry.db").exists());

    let config = std::fs::read_to_string(temp.path().join(".civreg/config.toml")).unwrap();
    assert!(config.contains("server = \"http://127.0.0.1:9\""));
}

#[test]
fn init_twice_fails() {
    let temp = init_temp();
    civreg()
        .args(["init", "--server", UNREACHABLE])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn submit_before_init_fails() {
    let temp = TempDir::new().unwrap();
    civreg()
        .args(["submit", "birth", "child_first_name=Ama"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("civreg init --server"));
}

#[test]
fn submit_offline_queues() {
    let temp = init_temp();
    civreg()
        .args([
            "submit",
            "birth",
            "child_first_name=Ama",
            "child_last_name=Owusu",
        ])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline: queued birth registration #1"));
}

#[test]
fn submit_offline_json() {
    let temp = init_temp();
    let out = json_output(
        civreg()
            .args(["submit", "death", "deceased_first_name=Kofi", "--json"])
            .current_dir(temp.path()),
    );
    assert_eq!(out["outcome"], "queued");
    assert_eq!(out["local_id"], 1);
}

#[test]
fn submit_with_directory_flag() {
    let temp = init_temp();
    civreg()
        .arg("-C")
        .arg(temp.path())
        .args(["submit", "birth", "child_first_name=Esi"])
        .assert()
        .success();

    civreg()
        .arg("-C")
        .arg(temp.path())
        .arg("pending")
        .assert()
        .success()
        .stdout(predicate::str::contains("Esi"));
}

#[test]
fn submit_rejects_malformed_field() {
    let temp = init_temp();
    civreg()
        .args(["submit", "birth", "child_first_name"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid field 'child_first_name'"));
}

#[test]
fn submit_rejects_unknown_type() {
    let temp = init_temp();
    civreg()
        .args(["submit", "marriage", "a=b"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 'birth' or 'death'"));
}
