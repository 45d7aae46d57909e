// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output.

use super::common::*;

#[test]
fn help_lists_every_command() {
    let assert = civreg().arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for command in [
        "submit", "search", "pending", "requeue", "sync", "status", "watch", "init",
    ] {
        assert!(stdout.contains(command), "help is missing '{command}'");
    }
}

#[test]
fn submit_help_shows_examples() {
    civreg()
        .args(["submit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Examples:"))
        .stdout(predicate::str::contains("child_first_name=Ama"));
}

#[test]
fn short_version_flag() {
    civreg()
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("civreg "));
}

#[test]
fn missing_command_fails() {
    civreg().assert().failure();
}
