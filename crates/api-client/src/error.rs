//! Error types for the API client

use std::fmt;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Message shown when the backend gave no usable explanation
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: unable to complete the request";

/// API client errors
///
/// Every failure a caller can observe is one of two kinds: the request never
/// produced a response (`Transport`), or the backend answered with a non-2xx
/// status (`Api`). The remaining variants cover local failures around a call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No response was received
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend returned a non-2xx response
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Backend-provided message, or the generic network message
        message: String,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response decoded but did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local session storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] medrec_core::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error from a raw response body
    ///
    /// The body's `message` field is used when present and non-empty, then an
    /// `error` string field, and otherwise [`NETWORK_ERROR_MESSAGE`].
    pub fn from_response_body(status: u16, body: &str) -> Self {
        Self::Api {
            status,
            message: backend_message(body).unwrap_or_else(|| NETWORK_ERROR_MESSAGE.to_string()),
        }
    }

    /// Create an unexpected-response error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Message suitable for displaying to a user. Never empty.
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Api { message, .. } => message.clone(),
            Self::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Storage(e) => e.message.clone(),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            NETWORK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// HTTP status, if the backend answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the backend rejected our credentials (401)
    ///
    /// A 403 means the credentials were accepted but the action is not
    /// allowed, so it does not count.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|field| value.get(*field).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(String::from)
}

/// Error context for better debugging
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Request ID for correlation
    pub request_id: Option<String>,
    /// Endpoint that was called
    pub endpoint: String,
    /// HTTP method used
    pub method: String,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)?;
        if let Some(ref id) = self.request_id {
            write!(f, " (request_id: {id})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_used() {
        let err = ApiError::from_response_body(400, r#"{"message":"Username already taken"}"#);
        assert_eq!(err.user_message(), "Username already taken");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_error_field_fallback() {
        let err = ApiError::from_response_body(500, r#"{"error":"database offline"}"#);
        assert_eq!(err.user_message(), "database offline");
    }

    #[test]
    fn test_generic_message_when_body_unusable() {
        for body in ["", "<html>502</html>", r#"{"message":""}"#, r#"{"message":42}"#] {
            let err = ApiError::from_response_body(502, body);
            assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_user_message_never_empty() {
        let errors = [
            ApiError::Api {
                status: 418,
                message: "   ".to_string(),
            },
            ApiError::config(""),
            ApiError::unexpected("list response was a number"),
            ApiError::InvalidUrl("mailto:x".to_string()),
            ApiError::Storage(medrec_core::Error::storage_corrupted("storage.json")),
        ];

        for err in errors {
            assert!(!err.user_message().trim().is_empty(), "{err:?}");
        }
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::from_response_body(401, r#"{"message":"Invalid credentials"}"#);
        assert!(err.is_unauthorized());

        let forbidden = ApiError::from_response_body(403, r#"{"message":"Not allowed"}"#);
        assert!(!forbidden.is_unauthorized());
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext {
            request_id: Some("abc".to_string()),
            endpoint: "/records".to_string(),
            method: "GET".to_string(),
        };
        assert_eq!(ctx.to_string(), "GET /records (request_id: abc)");
    }
}
