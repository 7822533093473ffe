//! Error types for API calls.

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Fallback text for transport failures.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
/// Fallback text for timed-out requests.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Primary error type for API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {detail}")]
    Network {
        /// Transport error detail.
        detail: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// HTTP 401; the session has been invalidated unless this was a login.
    #[error("unauthorized{}", suffix(.message.as_deref()))]
    Unauthorized {
        /// Server-provided message.
        message: Option<String>,
    },
    /// HTTP 4xx other than 401.
    #[error("request failed with status {status}{}", suffix(.message.as_deref()))]
    Client {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: Option<String>,
    },
    /// HTTP 5xx.
    #[error("server error {status}{}", suffix(.message.as_deref()))]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: Option<String>,
    },
    /// 2xx response whose envelope reported `success: false`.
    #[error("request rejected{}", suffix(.message.as_deref()))]
    Rejected {
        /// Server-provided message.
        message: Option<String>,
    },
    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Endpoint path could not be joined onto the base URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Client-side precondition failed; nothing was sent.
    #[error("{message}")]
    Validation {
        /// Human-readable reason.
        message: String,
    },
    /// Session persistence failed.
    #[error("session storage failed: {0}")]
    Storage(#[source] io::Error),
    /// A file selected for upload could not be read.
    #[error("failed to read '{}': {source}", .path.display())]
    File {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

fn suffix(message: Option<&str>) -> String {
    message.map_or_else(String::new, |message| format!(": {message}"))
}

/// Convenience alias for API results.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP response.
    #[must_use]
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = server_message(body);
        match status {
            401 => Self::Unauthorized { message },
            400..=499 => Self::Client { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// HTTP status when the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error is a 401.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether the failure happened below HTTP (no response at all).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout)
    }

    /// Message the server attached to the failure, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Client { message, .. }
            | Self::Server { message, .. }
            | Self::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }

    /// Transient user-facing text, preferring the server's own message and
    /// falling back to `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Network { .. } => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Timeout => TIMEOUT_MESSAGE.to_string(),
            Self::Validation { message } => message.clone(),
            other => other
                .server_message()
                .map_or_else(|| fallback.to_string(), ToString::to_string),
        }
    }
}

/// Extract a human-readable message from an error body.
///
/// Looks at the JSON `message` then `error` fields and falls back to the
/// trimmed raw text.
#[must_use]
pub fn server_message(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        if value.is_object() {
            return None;
        }
    }
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ApiError::from_status(401, b"").is_unauthorized());
        assert!(matches!(
            ApiError::from_status(404, b""),
            ApiError::Client { status: 404, .. }
        ));
        assert!(matches!(
            ApiError::from_status(502, b""),
            ApiError::Server { status: 502, .. }
        ));
        assert_eq!(ApiError::from_status(409, b"").status(), Some(409));
    }

    #[test]
    fn server_message_prefers_json_fields() {
        assert_eq!(
            server_message(br#"{"message":" Invalid email or password "}"#).as_deref(),
            Some("Invalid email or password")
        );
        assert_eq!(
            server_message(br#"{"error":"Listing not found"}"#).as_deref(),
            Some("Listing not found")
        );
        assert_eq!(server_message(br#"{"success":false}"#), None);
        assert_eq!(server_message(b"  Bad Gateway \n").as_deref(), Some("Bad Gateway"));
        assert_eq!(server_message(b""), None);
    }

    #[test]
    fn user_message_falls_back() {
        let err = ApiError::from_status(500, b"");
        assert_eq!(err.user_message("Failed to load"), "Failed to load");
        let err = ApiError::from_status(400, br#"{"message":"Title is required"}"#);
        assert_eq!(err.user_message("Failed"), "Title is required");
        assert_eq!(ApiError::Timeout.user_message("x"), TIMEOUT_MESSAGE);
        let err = ApiError::Network {
            detail: "refused".into(),
        };
        assert_eq!(err.user_message("x"), NETWORK_ERROR_MESSAGE);
        assert!(err.is_transport());
    }

    #[test]
    fn display_includes_server_message() {
        let err = ApiError::from_status(403, br#"{"message":"Forbidden"}"#);
        assert_eq!(err.to_string(), "request failed with status 403: Forbidden");
        let err = ApiError::Rejected { message: None };
        assert_eq!(err.to_string(), "request rejected");
    }
}
