// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `civreg submit`: send a registration, or queue it while offline.

use std::path::Path;

use cr_core::{Payload, RegistrationType};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::sync::{SubmissionGate, SubmitOutcome};

use super::{print_json, runtime, Context};

pub fn run(base: &Path, kind: RegistrationType, fields: &[String], json: bool) -> Result<()> {
    let payload = parse_fields(fields)?;
    let ctx = Context::locate(base)?;
    let store = ctx.deferred_store();
    let api = ctx.api()?;

    let outcome = runtime()?.block_on(async {
        let monitor = ctx.monitor().await?;
        let gate = SubmissionGate::new(store, api, monitor.state());
        gate.submit(kind, payload).await
    })?;

    if json {
        return print_json(&outcome);
    }
    println!("{}", describe(kind, &outcome));
    Ok(())
}

/// Parse `name=value` form fields into a payload.
///
/// Values are kept as strings, the way a form posts them. The first `=`
/// splits name from value, so values may contain `=`.
pub(crate) fn parse_fields(fields: &[String]) -> Result<Payload> {
    if fields.is_empty() {
        return Err(Error::EmptySubmission);
    }

    let mut payload = Payload::new();
    for arg in fields {
        let Some((name, value)) = arg.split_once('=') else {
            return Err(Error::InvalidField { arg: arg.clone() });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidField { arg: arg.clone() });
        }
        if payload.contains_key(name) {
            return Err(Error::DuplicateField {
                field: name.to_string(),
            });
        }
        payload.insert(name.to_string(), Value::String(value.to_string()));
    }
    Ok(payload)
}

pub(crate) fn describe(kind: RegistrationType, outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Submitted {
            registration_number,
        } => format!("Submitted {kind} registration: {registration_number}"),
        SubmitOutcome::Queued { local_id } => format!(
            "Offline: queued {kind} registration #{local_id}\n  \
             It will be sent when the server is reachable (civreg sync)"
        ),
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
