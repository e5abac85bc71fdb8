//! Drive API Error Types
//!
//! Structured error handling for listing and metadata operations.
//! Maps HTTP status codes to variants used for retry decisions.

/// Drive listing error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriveError {
    /// Missing credential, missing required parameter or bad setting
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Drive API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to decode Drive response: {0}")]
    Decode(String),

    #[error("Traversal aborted: more than {limit} folders discovered")]
    TraversalLimit { limit: usize },

    /// The backend handed back a page cursor it had already issued
    #[error("Traversal aborted: page cursor repeated while listing folder {folder_id}")]
    CursorLoop { folder_id: String },
}

impl DriveError {
    /// Whether this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            DriveError::Upstream { status, .. } => matches!(status, 408 | 429 | 500..=599),
            DriveError::Network(_) | DriveError::Timeout => true,
            DriveError::Config(_)
            | DriveError::Decode(_)
            | DriveError::TraversalLimit { .. }
            | DriveError::CursorLoop { .. } => false,
        }
    }

    /// Create a DriveError from an HTTP status code and response body
    pub fn from_status(status: u16, body: &str) -> Self {
        DriveError::Upstream {
            status,
            body: body.to_string(),
        }
    }

    /// Classify a transport-level reqwest failure
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DriveError::Timeout
        } else if err.is_decode() {
            DriveError::Decode(err.to_string())
        } else {
            DriveError::Network(err.to_string())
        }
    }

    /// Shorthand for configuration failures
    pub fn config(message: impl Into<String>) -> Self {
        DriveError::Config(message.into())
    }
}
