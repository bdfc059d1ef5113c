//! Error handling module for the JobTrack client.
//!
//! Provides a single error type with stable error codes. Network failures are
//! surfaced to the caller unchanged; nothing is retried.

use serde::Deserialize;
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const API_ERROR: &str = "API_ERROR";
    pub const JSON_ERROR: &str = "JSON_ERROR";
    pub const JOB_NOT_FOUND: &str = "JOB_NOT_FOUND";
    pub const REALTIME_ERROR: &str = "REALTIME_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Payload could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A local mutation referenced a job that is not cached
    #[error("Job {0} not found")]
    JobNotFound(i64),

    /// WebSocket or broker protocol failure
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Create an API error from status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a realtime error.
    pub fn realtime(message: impl Into<String>) -> Self {
        Self::Realtime(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Http(_) => codes::HTTP_ERROR,
            ClientError::Api { .. } => codes::API_ERROR,
            ClientError::Json(_) => codes::JSON_ERROR,
            ClientError::JobNotFound(_) => codes::JOB_NOT_FOUND,
            ClientError::Realtime(_) => codes::REALTIME_ERROR,
            ClientError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// HTTP status of the failed request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        tracing::error!("WebSocket error: {:?}", err);
        ClientError::Realtime(format!("WebSocket error: {}", err))
    }
}

/// Error body returned by the API (Laravel style).
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub errors: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ErrorResponse {
    /// Flatten the message and any field validation errors into one line.
    pub fn describe(&self) -> String {
        let Some(errors) = &self.errors else {
            return self.message.clone();
        };

        let details: Vec<String> = errors
            .iter()
            .map(|(field, value)| match value {
                serde_json::Value::Array(items) => {
                    let texts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                    format!("{}: {}", field, texts.join(", "))
                }
                other => format!("{}: {}", field, other),
            })
            .collect();

        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, details.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ClientError::JobNotFound(3).error_code(), codes::JOB_NOT_FOUND);
        assert_eq!(ClientError::api(422, "bad").error_code(), codes::API_ERROR);
        assert_eq!(ClientError::api(422, "bad").status(), Some(422));
        assert_eq!(ClientError::config("x").status(), None);
        assert_eq!(ClientError::JobNotFound(3).to_string(), "Job 3 not found");
    }

    #[test]
    fn test_error_response_describe() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"message":"The given data was invalid.","errors":{"text":["The text field is required."]}}"#,
        )
        .unwrap();
        assert_eq!(
            body.describe(),
            "The given data was invalid. (text: The text field is required.)"
        );

        let plain: ErrorResponse = serde_json::from_str(r#"{"message":"Unauthenticated."}"#).unwrap();
        assert_eq!(plain.describe(), "Unauthenticated.");
    }
}
