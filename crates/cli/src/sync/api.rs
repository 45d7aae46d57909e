// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Registry server API.
//!
//! Provides a trait-based API layer that enables:
//! - Real HTTP calls to the registry server for production
//! - Mock APIs for unit testing the engine, gate and search

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use cr_core::{Payload, RegistrationType, SearchParams};
use serde::Deserialize;
use serde_json::Value;

/// Error type for registry API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server could not be reached.
    #[error("network failure: {0}")]
    Network(String),

    /// The request did not finish within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server refused the submission (4xx).
    #[error("rejected by server ({status}): {message}{}", format_details(.details))]
    Rejected {
        status: u16,
        message: String,
        details: Vec<String>,
    },

    /// The server failed while handling the request (5xx).
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The configured server URL cannot be used.
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

fn format_details(details: &[String]) -> String {
    if details.is_empty() {
        String::new()
    } else {
        format!(" ({})", details.join("; "))
    }
}

impl ApiError {
    /// Whether the server looked at the entry and refused it.
    ///
    /// Only these count toward dead-lettering; a retry cannot fix them.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}

/// Result type for registry API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Registry server operations the sync subsystem depends on.
///
/// This trait abstracts over the HTTP client, allowing for easy testing with
/// mock implementations.
pub trait RegistryApi: Send + Sync {
    /// Submit one registration. Returns the server-issued registration number.
    fn submit<'a>(
        &'a self,
        kind: RegistrationType,
        payload: &'a Payload,
    ) -> Pin<Box<dyn Future<Output = ApiResult<String>> + Send + 'a>>;

    /// Run an advanced search. Returns the raw record objects.
    fn search<'a>(
        &'a self,
        kind: RegistrationType,
        params: &'a SearchParams,
    ) -> Pin<Box<dyn Future<Output = ApiResult<Vec<Value>>> + Send + 'a>>;
}

/// Successful submission body: `{success, registrationNumber, message?}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    registration_number: Option<String>,
}

/// Failure body: `{error, details?}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Vec<Value>,
}

/// Map a non-2xx status and body to an error.
fn error_for_status(status: u16, body: &str) -> ApiError {
    let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.error.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("HTTP {status}")
        } else {
            trimmed.chars().take(200).collect()
        }
    });

    if (400..500).contains(&status) {
        let details = parsed
            .details
            .into_iter()
            .map(|d| match d {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        ApiError::Rejected {
            status,
            message,
            details,
        }
    } else {
        ApiError::Server { status, message }
    }
}

/// Interpret the response to a submission.
pub(crate) fn interpret_submit(status: u16, body: &str) -> ApiResult<String> {
    if !(200..300).contains(&status) {
        return Err(error_for_status(status, body));
    }

    let response: SubmitResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("submission response: {e}")))?;
    if !response.success {
        return Err(ApiError::MalformedResponse(
            "server did not report success".to_string(),
        ));
    }
    match response.registration_number {
        Some(number) if !number.is_empty() => Ok(number),
        _ => Err(ApiError::MalformedResponse(
            "response has no registrationNumber".to_string(),
        )),
    }
}

/// Interpret the response to an advanced search.
pub(crate) fn interpret_search(status: u16, body: &str) -> ApiResult<Vec<Value>> {
    if !(200..300).contains(&status) {
        return Err(error_for_status(status, body));
    }
    serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("search response: {e}")))
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e.to_string())
    }
}

/// HTTP implementation of [`RegistryApi`] using reqwest.
pub struct HttpApi {
    client: reqwest::Client,
    base: reqwest::Url,
}

impl HttpApi {
    /// Create a client for `server`. Every request is bounded by `timeout`.
    pub fn new(server: &str, timeout: Duration) -> ApiResult<Self> {
        let base = reqwest::Url::parse(server).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(HttpApi { client, base })
    }

    fn endpoint(&self, path: &str) -> ApiResult<reqwest::Url> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }
}

impl RegistryApi for HttpApi {
    fn submit<'a>(
        &'a self,
        kind: RegistrationType,
        payload: &'a Payload,
    ) -> Pin<Box<dyn Future<Output = ApiResult<String>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.endpoint(&format!("/api/{}", kind.collection()))?;
            let response = self
                .client
                .post(url)
                .json(payload)
                .send()
                .await
                .map_err(transport_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(transport_error)?;
            interpret_submit(status, &body)
        })
    }

    fn search<'a>(
        &'a self,
        kind: RegistrationType,
        params: &'a SearchParams,
    ) -> Pin<Box<dyn Future<Output = ApiResult<Vec<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.endpoint(&format!("/api/search/advanced/{}", kind.collection()))?;
            let response = self
                .client
                .get(url)
                .query(params)
                .send()
                .await
                .map_err(transport_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(transport_error)?;
            interpret_search(status, &body)
        })
    }
}
