//! API errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failed request, carrying the HTTP status the outer layer should send.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{status}: {message}")]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Reason shown to the caller.
    pub message: String,
}

impl ApiError {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400: malformed input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    /// 401: unknown account or bad signature.
    pub fn unauthorized() -> Self {
        Self::new(401, "unauthorized")
    }

    /// 409: the account is registered with a different key.
    pub fn conflict() -> Self {
        Self::new(409, "account already registered with a different key")
    }

    /// 503: a dependency is down; the request may be retried.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(503, message)
    }

    /// 500: anything else.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }
}
