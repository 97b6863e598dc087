//! Error types for pianoforte.

use thiserror::Error;

use crate::catalog::ErrorClass;

/// Main error type for pianoforte operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication failed (rejected credentials, broken login chain).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload cipher error (bad key, malformed hex).
    #[error("cipher error: {0}")]
    Cipher(String),

    /// The server rejected the call with a protocol error code.
    #[error("API error {code}: {message}")]
    Api {
        code: u32,
        message: String,
        class: ErrorClass,
    },

    /// Invalid response from server.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Protocol error (malformed URL, unexpected shape).
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Whether this error is fixed by re-authenticating (stale or invalid
    /// token, out-of-sync timestamp). The pipeline resolves these with a
    /// single re-login-and-retry cycle.
    pub fn is_auth_invalid(&self) -> bool {
        matches!(
            self,
            Error::Api {
                class: ErrorClass::AuthInvalid,
                ..
            }
        )
    }

    /// Protocol error code, when the server supplied one.
    pub fn code(&self) -> Option<u32> {
        match self {
            Error::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_code() {
        let err = Error::Api {
            code: 1001,
            message: "invalid auth token".to_string(),
            class: ErrorClass::AuthInvalid,
        };
        assert_eq!(err.code(), Some(1001));
        assert!(err.is_auth_invalid());
    }

    #[test]
    fn non_api_errors_have_no_code() {
        let err = Error::Protocol("bad".to_string());
        assert_eq!(err.code(), None);
        assert!(!err.is_auth_invalid());
    }
}
