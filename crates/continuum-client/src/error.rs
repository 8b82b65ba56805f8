//! Error types for the client layer.

use std::time::Duration;

use continuum_common::error::LootError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP response had a non-2xx status code.
    #[error("{status}: {status_text}")]
    Api { status: u16, status_text: String },

    /// A 2xx response whose body carried `{"error": "..."}`.
    #[error("{0}")]
    Business(String),

    /// An error from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("{path} timed out after {after:?}")]
    Timeout { path: String, after: Duration },

    /// A JSON (de)serialization error, including payloads of the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The store was disposed and no longer accepts refreshes.
    #[error("Entity store has been disposed")]
    Disposed,

    /// Validation, integrity or permission failure raised before dispatch.
    #[error(transparent)]
    Loot(#[from] LootError),
}

impl ClientError {
    /// Build the error for a non-2xx status.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self::Api {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
        }
    }

    /// Whether the backend might have applied the request.
    pub fn reached_backend(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Business(_) | Self::Timeout { .. } | Self::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
