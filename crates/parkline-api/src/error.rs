//! The client-side error taxonomy.
//!
//! Every failed call is classified into exactly one of these kinds before
//! it reaches business logic. The classification decides the global
//! reaction: `Unauthorized` clears the session, everything else is
//! surfaced as an alert and re-thrown to the caller.

use serde::Deserialize;

/// A classified failure from the remote API.
///
/// `Unauthorized` carries no message on purpose: the reaction to it is
/// always the same (clear the session, return to the login surface),
/// regardless of what the server said.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Credential missing, expired, or rejected (HTTP 401).
    /// Triggers the global session clear in the gateway.
    #[error("unauthorized")]
    Unauthorized,

    /// The authenticated role lacks permission (HTTP 403).
    /// Surfaced as an alert only; the session stays intact.
    #[error("forbidden")]
    Forbidden { message: Option<String> },

    /// The resource does not exist (HTTP 404).
    #[error("not found")]
    NotFound { message: Option<String> },

    /// The request was rejected with a field-level message (HTTP 400/409/422).
    /// The message is surfaced verbatim, e.g. "You already have an active
    /// reservation".
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The server failed (HTTP 5xx).
    #[error("server error")]
    Server { message: Option<String> },

    /// No response reached the client at all (connect failure, timeout).
    /// Distinguished from server-originated failures so callers can tell
    /// "the server said no" apart from "the server never answered".
    #[error("network error: {message}")]
    Network { message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("malformed response: {message}")]
    Decode { message: String },

    /// Any status outside the taxonomy above.
    #[error("unexpected status {status}")]
    Unexpected { status: u16, message: Option<String> },
}

impl ApiError {
    /// Classifies an HTTP status and optional server message.
    ///
    /// Callers pass the `error` field of the response body when the server
    /// provided one; it rides along so alerts can show the server's own
    /// wording.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            400 | 409 | 422 => Self::Validation {
                message: message.unwrap_or_else(|| "invalid request".to_string()),
            },
            500..=599 => Self::Server { message },
            status => Self::Unexpected { status, message },
        }
    }

    /// Returns `true` for the kind that invalidates the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// The string to show the user: the server-provided message when one
    /// exists, otherwise the caller's per-action fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::Server { message }
            | Self::Unexpected { message, .. } => message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
            Self::Unauthorized | Self::Network { .. } | Self::Decode { .. } => {
                fallback.to_string()
            }
        }
    }
}

/// The server's error envelope: `{ "error": "..." }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
