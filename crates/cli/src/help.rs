// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code: u8| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    let header = fg(colors::codes::HEADER);
    let context = fg(colors::codes::CONTEXT);

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(fg(colors::codes::LITERAL))
        .placeholder(context)
        .valid(context)
        .error(fg(colors::codes::WARN))
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    let entry = |name: &str, about: &str| format!("  {}{about}", colors::literal(&format!("{name:<10}")));
    [
        colors::header("Registrations:"),
        entry("submit", "Submit a registration, or queue it while offline"),
        entry("search", "Search registrations, falling back to cached records"),
        entry("pending", "List registrations waiting to sync"),
        entry("requeue", "Move a dead-lettered registration back to the queue"),
        String::new(),
        colors::header("Sync:"),
        entry("sync", "Replay the pending queue now"),
        entry("status", "Show connectivity, queue and lease state"),
        entry("watch", "Follow connectivity and sync on reconnect"),
        String::new(),
        colors::header("Setup:"),
        entry("init", "Point this directory at a registry server"),
    ]
    .join("\n")
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  civreg init --server http://localhost:3000       Configure the server
  civreg submit birth child_first_name=Ama ...     Register a birth
  civreg pending                                   See what is queued
  civreg sync                                      Send queued registrations",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
