// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    bad_type = { Error::InvalidRegistrationType("marriage".into()), "marriage" },
    missing_number = { Error::MissingRegistrationNumber, "registration number" },
    dead_letter = { Error::DeadLetterNotFound(7), "7" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn invalid_payload_names_field() {
    let err = Error::InvalidPayload {
        field: "weight_kg".into(),
        reason: "expected string or number, got array".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("weight_kg"));
    assert!(msg.contains("array"));
}

#[test]
fn sqlite_errors_are_storage_unavailable() {
    let err: Error = rusqlite::Error::InvalidQuery.into();
    assert!(err.is_storage_unavailable());
}

#[test]
fn input_errors_are_not_storage_unavailable() {
    assert!(!Error::MissingRegistrationNumber.is_storage_unavailable());
    assert!(!Error::InvalidInput("x".into()).is_storage_unavailable());
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
