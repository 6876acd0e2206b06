// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `cmspa` library.
//!
//! Failures are split by where they originate: authentication against the
//! vendor cloud, individual API calls, client-side validation of command
//! parameters, and the host-side capability sink. None of them is fatal to
//! the process; the worst outcome is a skipped reconciliation cycle.

use std::fmt;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Logging in or renewing the session failed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A vendor API call failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Command parameters were rejected before any request was sent.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The host rejected a capability update.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Errors raised while obtaining a bearer token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The login endpoint answered with a non-success status.
    #[error("login rejected with HTTP {status}")]
    Rejected {
        /// HTTP status returned by the login endpoint.
        status: u16,
    },

    /// The login endpoint answered 200 but without an access token.
    #[error("login response did not contain an access token")]
    MissingToken,

    /// The login request never reached the vendor.
    #[error("login transport failure: {0}")]
    Transport(String),
}

/// Category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Connection, TLS or timeout failure.
    Transport,
    /// The vendor answered with a non-200 status.
    Http,
    /// The body was not JSON or lacked the expected `data` envelope.
    MalformedBody,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "transport",
            Self::Http => "http",
            Self::MalformedBody => "malformed body",
        };
        f.write_str(label)
    }
}

/// A failed vendor API call, normalized regardless of cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} failure{}: {message}", status_suffix(.http_status))]
pub struct ApiError {
    /// What went wrong.
    pub kind: ApiErrorKind,
    /// HTTP status, when a response was received.
    pub http_status: Option<u16>,
    /// Human-readable context.
    pub message: String,
}

impl ApiError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            http_status: None,
            message: message.into(),
        }
    }

    /// Creates an error for a non-200 response.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            http_status: Some(status),
            message: message.into(),
        }
    }

    /// Creates an error for a response whose body has the wrong shape.
    #[must_use]
    pub fn malformed(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::MalformedBody,
            http_status: Some(status),
            message: message.into(),
        }
    }
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Client-side rejection of command parameters or settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Heater mode other than `READY` or `REST`.
    #[error("invalid heater mode: {0}")]
    InvalidHeaterMode(String),

    /// Attempt to disable the primary filter cycle.
    #[error("the primary filter cycle cannot be disabled")]
    PrimaryFilterDisabled,

    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },

    /// A time string was not `HH:MM`.
    #[error("invalid time of day: {0}")]
    InvalidTime(String),

    /// A capability has no vendor command behind it.
    #[error("capability {0} is not controllable")]
    NotControllable(String),

    /// A device setting is unusable.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// Error reported by the host when applying a capability change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("capability {key}: {message}")]
pub struct SinkError {
    /// The capability key involved.
    pub key: String,
    /// Host-provided reason.
    pub message: String,
}

impl SinkError {
    /// Creates a sink error for the given capability key.
    #[must_use]
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
