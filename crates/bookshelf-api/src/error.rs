//! API client error types.

use thiserror::Error;

/// A result type using `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error type for gateway operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401: the token (or the credentials) were rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message taken from the response body.
        message: String,
    },

    /// Failed to parse response.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The request could not be built (e.g., a token with illegal characters).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// The two ways a call can fail, as far as callers need to care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Session must be dropped and the user sent to log in again.
    Unauthorized,
    /// Anything else; reported to the user, never retried.
    RequestFailed,
}

impl ApiError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Http(_) | Self::Api { .. } | Self::Parse(_) | Self::InvalidRequest(_) => {
                ErrorKind::RequestFailed
            }
        }
    }

    /// Returns `true` if the server rejected the credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unauthorized)
    }

    /// HTTP status code, when the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::InvalidRequest(_) => None,
        }
    }
}
