//! Error types for Veracross API operations.

use thiserror::Error;

/// Errors that can occur during Veracross API operations.
#[derive(Debug, Error)]
pub enum VeracrossError {
    /// Configuration is missing or incomplete.
    #[error("Veracross configuration required: {0}")]
    ConfigMissing(String),

    /// The declared scope list does not grant the operation's scope.
    #[error("operation '{operation}' requires scope '{scope}'")]
    MissingScope {
        operation: String,
        scope: &'static str,
    },

    /// No operation with this name exists in the catalog.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// A `{placeholder}` in the operation's path was not supplied.
    #[error("operation '{operation}' needs path parameter '{param}'")]
    MissingPathParam { operation: String, param: String },

    /// A path parameter would not address a single path segment.
    #[error("operation '{operation}' got invalid path parameter {param}='{value}'")]
    InvalidPathParam {
        operation: String,
        param: String,
        value: String,
    },

    /// API request failed.
    #[error("Veracross API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// The response body did not have the expected envelope.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },
}

impl VeracrossError {
    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => *status_code,
            Self::RateLimited { .. } => Some(429),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for Veracross operations.
pub type Result<T> = core::result::Result<T, VeracrossError>;
