//! Error types for the catalog and chat clients.
//!
//! Callers only ever see [`ApiError`]. [`ClientError`] is the internal cause
//! type collected with `?` inside a request and folded into an `ApiError` by
//! [`ApiError::from_cause`] at the client boundary.

use tracing::warn;

/// Failure of a catalog or chat call: HTTP status plus a fixed message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    /// Status used for failures that never produced an HTTP response.
    pub const UNCLASSIFIED_STATUS: u16 = 500;

    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Error for a non-success HTTP response.
    pub fn from_status(status: u16) -> Self {
        Self::new(status, format!("API request failed with status {}", status))
    }

    /// Classify `cause`: an `ApiError` passes through unchanged, anything else
    /// becomes `{500, message}`.
    pub fn from_cause(cause: ClientError, message: &str) -> Self {
        match cause {
            ClientError::Api(err) => err,
            other => {
                warn!(error = %other, "{}", message);
                Self::new(Self::UNCLASSIFIED_STATUS, message)
            }
        }
    }
}

/// Everything that can go wrong inside a single request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
