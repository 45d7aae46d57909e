// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand};
use cr_core::RegistrationType;

pub use args::SearchArgs;

/// Parse `birth`/`births`/`death`/`deaths`, case-insensitively.
fn registration_type(s: &str) -> Result<RegistrationType, String> {
    s.parse()
        .map_err(|_| format!("expected 'birth' or 'death', got '{s}'"))
}

#[derive(Parser)]
#[command(name = "civreg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "Offline-first client for the civil registry")]
#[command(
    long_about = "Offline-first client for the civil registry.\n\n\
    Registrations captured without a connection are queued locally and sent \
    to the registry server once it is reachable again."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
// Allow the unit type field pattern which is required for clap's ArgAction::Version/Help
#[allow(clippy::manual_non_exhaustive)]
pub struct Cli {
    /// Run as if civreg was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    /// Print version
    #[arg(short = 'v', short_alias = 'V', long = "version", action = clap::ArgAction::Version)]
    version: (),

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a registration, or queue it while offline
    #[command(
        arg_required_else_help = true,
        after_help = colors::examples("\
Examples:
  civreg submit birth child_first_name=Ama child_last_name=Owusu    Register a birth
  civreg submit death deceased_first_name=Kofi age_at_death=71      Register a death
  civreg submit births place_of_birth=\"Korle Bu\" --json             Print the outcome as JSON")
    )]
    Submit {
        /// Registration type (birth, death)
        #[arg(value_parser = registration_type)]
        kind: RegistrationType,

        /// Form fields as name=value
        #[arg(required = true, value_name = "FIELD=VALUE")]
        fields: Vec<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search registrations, falling back to cached records offline
    #[command(after_help = colors::examples("\
Examples:
  civreg search birth --last-name Owusu             By surname
  civreg search death --from 2024-01-01 --place Accra   By date and place
  civreg search death --cause malaria --age-to 5    Deaths only filters"))]
    Search {
        /// Registration type (birth, death)
        #[arg(value_parser = registration_type)]
        kind: RegistrationType,

        #[command(flatten)]
        filters: SearchArgs,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registrations waiting to sync
    Pending {
        /// List dead-lettered registrations instead
        #[arg(long)]
        dead: bool,

        /// Print raw entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a dead-lettered registration back to the queue
    #[command(arg_required_else_help = true)]
    Requeue {
        /// Local id shown by 'civreg pending --dead'
        id: i64,
    },

    /// Replay the pending queue now
    Sync {
        /// Print the pass report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show connectivity, queue and lease state
    Status {
        /// Print status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow connectivity and sync whenever the server comes back
    Watch,

    /// Point this directory at a registry server
    #[command(arg_required_else_help = true)]
    Init {
        /// Registry server base URL, e.g. http://localhost:3000
        #[arg(long)]
        server: String,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
