//! Errors raised by the remote resource client.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for API calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure of a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },

    /// The configured base URL cannot carry API paths.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The response body did not match the expected record shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Status code of a non-success response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::InvalidBaseUrl(_) | Self::Decode(_) => None,
        }
    }

    /// Whether the server answered with `status`.
    pub fn has_status(&self, status: StatusCode) -> bool {
        self.status() == Some(status)
    }

    /// Human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Status { body, .. } => extract_message(body),
            _ => None,
        }
    }

    /// Server message when present, otherwise `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message()
            .unwrap_or_else(|| fallback.to_string())
    }
}

const MESSAGE_KEYS: [&str; 4] = ["details", "detail", "message", "title"];

fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(text)) => Some(text).filter(|text| !text.trim().is_empty()),
        Ok(Value::Object(map)) => MESSAGE_KEYS
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find(|text| !text.trim().is_empty())
            .map(str::to_string),
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, body: &str) -> ApiError {
        ApiError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn extracts_plain_and_json_messages() {
        assert_eq!(
            status(400, "Invalid NIC or password").server_message().as_deref(),
            Some("Invalid NIC or password")
        );
        assert_eq!(
            status(400, "\"User already exists\"").server_message().as_deref(),
            Some("User already exists")
        );
        assert_eq!(
            status(500, r#"{"message":"boom","details":"Train T1 already exists"}"#)
                .server_message()
                .as_deref(),
            Some("Train T1 already exists")
        );
        assert_eq!(
            status(400, r#"{"title":"One or more validation errors occurred."}"#)
                .server_message()
                .as_deref(),
            Some("One or more validation errors occurred.")
        );
    }

    #[test]
    fn falls_back_without_a_message() {
        assert_eq!(status(404, "").message_or("Failed to add user."), "Failed to add user.");
        assert_eq!(status(500, "{}").message_or("generic"), "generic");
        assert!(status(400, "x").has_status(StatusCode::BAD_REQUEST));
    }
}
