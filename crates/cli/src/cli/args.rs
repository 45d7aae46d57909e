// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::Args;
use cr_core::SearchParams;

/// Search filters, mirroring the registry server's query parameters.
#[derive(Args, Clone, Debug, Default)]
pub struct SearchArgs {
    /// First name contains (child or deceased)
    #[arg(long, value_name = "NAME")]
    pub first_name: Option<String>,

    /// Last name contains (child or deceased)
    #[arg(long, value_name = "NAME")]
    pub last_name: Option<String>,

    /// Event date on or after (YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE")]
    pub date_from: Option<String>,

    /// Event date on or before (YYYY-MM-DD)
    #[arg(long = "to", value_name = "DATE")]
    pub date_to: Option<String>,

    /// Place of birth or death contains
    #[arg(long)]
    pub place: Option<String>,

    /// Mother's name contains (births only)
    #[arg(long = "mother", value_name = "NAME")]
    pub mother_name: Option<String>,

    /// Father's name contains (births only)
    #[arg(long = "father", value_name = "NAME")]
    pub father_name: Option<String>,

    /// Cause of death contains (deaths only)
    #[arg(long)]
    pub cause: Option<String>,

    /// Minimum age at death (deaths only)
    #[arg(long, value_name = "YEARS")]
    pub age_from: Option<u32>,

    /// Maximum age at death (deaths only)
    #[arg(long, value_name = "YEARS")]
    pub age_to: Option<u32>,

    /// Registration number contains
    #[arg(long = "number", short = 'n', value_name = "NUMBER")]
    pub registration_number: Option<String>,
}

impl From<SearchArgs> for SearchParams {
    fn from(args: SearchArgs) -> Self {
        SearchParams {
            first_name: args.first_name,
            last_name: args.last_name,
            date_from: args.date_from,
            date_to: args.date_to,
            place: args.place,
            mother_name: args.mother_name,
            father_name: args.father_name,
            cause: args.cause,
            age_from: args.age_from,
            age_to: args.age_to,
            registration_number: args.registration_number,
        }
    }
}
