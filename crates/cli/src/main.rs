// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use crlib::Cli;

fn main() {
    let cli = Cli::parse();
    crlib::init_logging();
    if let Err(e) = crlib::run(cli) {
        eprintln!("error: {}", e);
        if e.is_storage_unavailable() {
            eprintln!("  hint: check that .civreg/registry.db exists and is writable");
        }
        std::process::exit(1);
    }
}
