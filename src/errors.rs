/// Error types for the Lytics SDK.
///
/// Every fallible operation returns [`LyticsError`]. Lookups whose remote object
/// may legitimately be missing return `Ok(None)` instead of an error.
use serde_json::Value;
use thiserror::Error;

/// The primary error type for the Lytics SDK.
#[derive(Error, Debug)]
pub enum LyticsError {
    // Client-side validation, raised before any request is sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Remote failures
    #[error("Remote operation failed (HTTP {status}): {message}")]
    RemoteOperation {
        status: u16,
        message: String,
        envelope: Value,
    },

    // Transport errors
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    // Configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Record readers
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl LyticsError {
    /// Build a remote failure from the HTTP status and the decoded envelope.
    ///
    /// The message is taken from the envelope's `message` field when present,
    /// otherwise from the envelope itself (truncated).
    pub fn remote(status: u16, envelope: Value) -> Self {
        let message = match envelope.get("message").and_then(|m| m.as_str()) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => {
                let text = match &envelope {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                text.chars().take(500).collect()
            }
        };
        LyticsError::RemoteOperation {
            status,
            message,
            envelope,
        }
    }

    /// Shorthand for an [`LyticsError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        LyticsError::InvalidArgument(message.into())
    }

    /// Returns the HTTP status if this is a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            LyticsError::RemoteOperation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the envelope the remote service answered with, if any.
    pub fn envelope(&self) -> Option<&Value> {
        match self {
            LyticsError::RemoteOperation { envelope, .. } => Some(envelope),
            _ => None,
        }
    }

    /// True if the remote service answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True if the remote service rejected the API key.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<reqwest::Error> for LyticsError {
    fn from(err: reqwest::Error) -> Self {
        LyticsError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LyticsError {
    fn from(err: serde_json::Error) -> Self {
        LyticsError::JsonError(err.to_string())
    }
}

impl From<url::ParseError> for LyticsError {
    fn from(err: url::ParseError) -> Self {
        LyticsError::ConfigError(format!("URL parse error: {err}"))
    }
}

impl From<std::io::Error> for LyticsError {
    fn from(err: std::io::Error) -> Self {
        LyticsError::IoError(err.to_string())
    }
}

impl From<csv::Error> for LyticsError {
    fn from(err: csv::Error) -> Self {
        LyticsError::CsvError(err.to_string())
    }
}
