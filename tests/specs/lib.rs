// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box specs for the `civreg` binary.
//!
//! Build the binary first (`cargo build -p civreg`), then `cargo test -p specs`.

#[cfg(test)]
#[path = "cli/mod.rs"]
mod cli;
