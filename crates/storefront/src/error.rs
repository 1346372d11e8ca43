//! Typed gateway errors.
//!
//! The backend does not speak a structured error format, so classification
//! happens here at the gateway boundary: HTTP outcomes are folded into a
//! closed [`ErrorKind`] that callers can switch on, instead of inspecting
//! error message content.

use reqwest::StatusCode;
use thiserror::Error;

/// Closed classification of gateway failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The targeted resource does not exist (HTTP 404).
    NotFound,
    /// The resource exists but is not in a state that allows the operation,
    /// e.g. updating a non-pending order (HTTP 400/409).
    InvalidState,
    /// The caller is not allowed to touch the resource (HTTP 403).
    Forbidden,
    /// Transport failure, timeout, 5xx, or a malformed response body.
    Network,
    /// Rejected locally before any request was issued.
    Validation,
}

/// A classified gateway error.
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ApiError {
    /// Build an error with an explicit kind.
    #[must_use]
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// A locally rejected input, raised before any network call.
    #[must_use]
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, detail)
    }

    /// A transport-level or backend-availability failure.
    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, detail)
    }

    /// Classify a non-success HTTP status.
    ///
    /// 404 maps to `NotFound`, 403 to `Forbidden`, 400/409 to `InvalidState`
    /// (the backend uses these for operations against resources in the wrong
    /// lifecycle state). Everything else - including all 5xx - is treated as
    /// a transient backend failure.
    #[must_use]
    pub fn from_status(status: StatusCode, context: &str) -> Self {
        let kind = match status {
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            StatusCode::FORBIDDEN => ErrorKind::Forbidden,
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => ErrorKind::InvalidState,
            _ => ErrorKind::Network,
        };
        Self::new(kind, format!("{context}: HTTP {status}"))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::network(format!("malformed response body: {err}"))
    }
}

/// Result alias for gateway operations.
pub type ApiResult<T> = Result<T, ApiError>;
