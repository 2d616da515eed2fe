//! Error types for the payroll API client.
//!
//! # Design
//! Precondition failures are raised before any request is built, so callers
//! can tell a bad argument from a backend rejection. Every non-2xx response
//! lands in `Http` with the raw status code; the message is the response body
//! verbatim, or the canonical reason phrase when the body is empty.

use thiserror::Error;

/// Result type for payroll client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by `PayrollClient` and the resource services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required argument was missing, empty, or a required id was not positive.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The request never produced an HTTP response (DNS, TLS, connect, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A create call succeeded but returned no object.
    #[error("empty create response")]
    EmptyCreateResponse,

    /// A create call succeeded but did not hand back a positive record id.
    #[error("record not created: {path}")]
    RecordNotCreated { path: String },

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The HTTP status carried by a protocol error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        ApiError::Precondition(message.into())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ApiError::Transport(format!("request timed out: {e}"));
        }
        ApiError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Deserialization(e.to_string())
    }
}

/// Fail with a precondition error unless `id` is positive.
pub(crate) fn require_id(name: &str, id: i32) -> ApiResult<()> {
    if id <= 0 {
        return Err(ApiError::precondition(format!("{name} must be positive, got {id}")));
    }
    Ok(())
}

/// Fail with a precondition error if `value` is empty or whitespace.
pub(crate) fn require_text(name: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::precondition(format!("{name} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_status_and_message() {
        let err = ApiError::Http {
            status: 409,
            message: "duplicate identifier".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 409: duplicate identifier");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_detected() {
        let err = ApiError::Http {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn require_id_rejects_zero_and_negative() {
        assert!(require_id("tenantId", 1).is_ok());
        assert!(matches!(require_id("tenantId", 0), Err(ApiError::Precondition(_))));
        assert!(matches!(require_id("tenantId", -4), Err(ApiError::Precondition(_))));
    }

    #[test]
    fn require_text_rejects_blank() {
        assert!(require_text("name", "Birth").is_ok());
        assert!(matches!(require_text("name", ""), Err(ApiError::Precondition(_))));
        assert!(matches!(require_text("name", "  "), Err(ApiError::Precondition(_))));
    }

    #[test]
    fn malformed_json_maps_to_deserialization() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
