//! Error types for the account API client.
//!
//! # Design
//! Transport failures and non-2xx responses share the `Http` variant: a
//! missing `status` means the request never got a response. Bodies that are
//! not JSON land in `Parse`; JSON that does not match the expected schema
//! lands in `Validation` with every offending field.

use crate::schema::ValidationErrors;

/// Errors returned by `ApiClient` parse methods and `Executor` operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status, or no answer arrived.
    #[error("API Error: {} {message} ({path})", status_label(.status))]
    Http {
        status: Option<u16>,
        path: String,
        message: String,
    },

    /// A 2xx response whose body is not valid JSON.
    #[error("invalid JSON from {path}: {message}")]
    Parse { path: String, message: String },

    /// Input or output does not satisfy its schema.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// True when the request failed before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Http { status: None, .. })
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "transport".to_string(),
    }
}

/// Errors raised while loading `Config`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
}
