use std::fmt;

use serde_json::Value;

/// Category of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced an HTTP response.
    Network,
    /// The backend answered with a non-success status.
    Status(u16),
    /// The response body did not have the expected shape.
    Decode,
    /// An authenticated endpoint was called without a session token.
    MissingToken,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => f.write_str("network error"),
            ApiErrorKind::Status(code) => write!(f, "HTTP {code}"),
            ApiErrorKind::Decode => f.write_str("unexpected response"),
            ApiErrorKind::MissingToken => f.write_str("not signed in"),
        }
    }
}

/// Normalised failure returned from every API call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct ApiError {
    /// What went wrong.
    pub kind: ApiErrorKind,
    /// The `message` field of the backend error envelope, if any.
    pub server_message: Option<String>,
    /// Diagnostic text for logs.
    pub detail: String,
}

/// Result of a single API call.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Transport-level failure.
    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            server_message: None,
            detail: detail.into(),
        }
    }

    /// Response body could not be decoded.
    pub fn decode(detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            server_message: None,
            detail: detail.into(),
        }
    }

    /// No token was available for an authenticated call.
    pub fn missing_token() -> Self {
        Self {
            kind: ApiErrorKind::MissingToken,
            server_message: None,
            detail: "no bearer token in session".to_string(),
        }
    }

    /// Build from a non-success response, lifting `message` out of the body.
    pub fn from_status(status: u16, body: &Value) -> Self {
        let server_message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string);
        Self {
            kind: ApiErrorKind::Status(status),
            detail: server_message
                .clone()
                .unwrap_or_else(|| format!("status {status}")),
            server_message,
        }
    }

    /// Message to show the user: the server's text or the given fallback.
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_message_wins_over_fallback() {
        let err = ApiError::from_status(401, &json!({ "message": "Invalid credentials" }));
        assert_eq!(err.kind, ApiErrorKind::Status(401));
        assert_eq!(err.message_or("Login failed"), "Invalid credentials");
    }

    #[test]
    fn blank_or_missing_message_uses_fallback() {
        let blank = ApiError::from_status(500, &json!({ "message": "  " }));
        assert_eq!(blank.message_or("Login failed"), "Login failed");

        let network = ApiError::network("connection refused");
        assert_eq!(network.message_or("Login failed"), "Login failed");
        assert_eq!(network.to_string(), "network error: connection refused");
    }
}
