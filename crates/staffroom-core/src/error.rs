use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parsed body of a non-2xx API response.
///
/// The backend reports failures as `{"message": "..."}`, sometimes with a
/// field-level `errors` map attached. Anything that does not parse as JSON is
/// kept verbatim in `message`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Parse a raw response body, falling back to the trimmed text when it is
    /// not the JSON shape the backend uses.
    pub fn from_text(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| {
            let trimmed = text.trim();
            Self {
                message: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                errors: None,
            }
        })
    }

    /// Build a body carrying only a message, for tests and synthetic errors.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: None,
        }
    }
}

/// Error type shared by every layer of the client.
///
/// Cached query state holds the error of a failed fetch, so the whole enum is
/// `Clone + PartialEq` rather than wrapping source errors directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Server returned status {status}")]
    Status { status: u16, body: ErrorBody },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Endpoint already registered: {name}")]
    DuplicateEndpoint { name: String },

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Create a new Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new Timeout error
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Create a new Status error from a response status and raw body text
    pub fn status(status: u16, body_text: &str) -> Self {
        Self::Status {
            status,
            body: ErrorBody::from_text(body_text),
        }
    }

    /// Create a new Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new DuplicateEndpoint error
    pub fn duplicate_endpoint(name: impl Into<String>) -> Self {
        Self::DuplicateEndpoint { name: name.into() }
    }

    /// Create a new InvalidKey error
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// HTTP status of this error, when it came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a rejected-credentials response (401)
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Check if this error originated on the client side (bad input, 4xx)
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Status { status, .. } => (400..500).contains(status),
            Self::Validation(_) | Self::InvalidKey(_) | Self::DuplicateEndpoint { .. } => true,
            _ => false,
        }
    }

    /// Check if this error points at the server or the network (5xx, transport)
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::Transport(_) | Self::Timeout { .. } | Self::Decode(_) => true,
            Self::Configuration(_) => true,
            _ => false,
        }
    }

    /// Message safe to surface to the person using the app.
    ///
    /// Server-provided messages are shown verbatim; everything else collapses
    /// to a short generic line so internals never leak into the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { body, .. } if body.message.is_some() => {
                body.message.clone().unwrap_or_default()
            }
            Self::Status { status, .. } => format!("Request failed with status {status}"),
            Self::Validation(message) => message.clone(),
            Self::Transport(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Timeout { .. } => "The server took too long to respond. Try again.".to_string(),
            _ => "Something went wrong. Try again later.".to_string(),
        }
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => ErrorCategory::Network,
            Self::Status { .. } => ErrorCategory::Http,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::Validation(_) | Self::InvalidKey(_) => ErrorCategory::Validation,
            Self::DuplicateEndpoint { .. } => ErrorCategory::Registry,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Http,
    Decode,
    Validation,
    Registry,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Http => write!(f, "http"),
            Self::Decode => write!(f, "decode"),
            Self::Validation => write!(f, "validation"),
            Self::Registry => write!(f, "registry"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
