// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Loopback discard port: connection refused, so every command runs offline.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub fn civreg() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("civreg").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("CIVREG_SERVER");
    cmd
}

/// Helper to create a temp directory initialized against an unreachable server
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    civreg()
        .args(["init", "--server", UNREACHABLE])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Submit a birth registration from inside `temp`.
pub fn submit_birth(temp: &TempDir, first: &str, last: &str) {
    civreg()
        .args(["submit", "birth"])
        .arg(format!("child_first_name={first}"))
        .arg(format!("child_last_name={last}"))
        .current_dir(temp.path())
        .assert()
        .success();
}

/// Parse stdout of a successful command as JSON.
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}
