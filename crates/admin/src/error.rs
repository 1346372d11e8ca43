//! Admin client error type.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures of admin API operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The backend answered with a non-success status.
    #[error("{context}: HTTP {status}")]
    Status {
        status: StatusCode,
        context: String,
    },

    /// The request never completed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The input was rejected before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl AdminError {
    pub(crate) fn status(status: StatusCode, context: impl Into<String>) -> Self {
        Self::Status {
            status,
            context: context.into(),
        }
    }

    pub(crate) fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }
}

pub type AdminResult<T> = Result<T, AdminError>;
