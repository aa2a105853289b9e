//! Error types for the diagnostic tool

use thiserror::Error;

/// Result type alias for diagnostic operations
pub type GscResult<T> = std::result::Result<T, GscError>;

/// Error types for configuration, authentication and API calls
#[derive(Error, Debug, Clone)]
pub enum GscError {
    /// HTTP request failed
    #[error("HTTP request failed: {message}")]
    HttpError {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parsing error (JSON, token files, credential files)
    #[error("Parsing error: {0}")]
    ParseError(String),

    /// Timeout error
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Search Console API returned an error
    #[error("API error: {0}")]
    ApiError(String),

    /// Generic error for unhandled cases
    #[error("Error: {0}")]
    Other(String),
}

impl GscError {
    /// Short label for the error variant, used when the diagnostic reports
    /// an "error type" alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            GscError::HttpError { .. } => "HttpError",
            GscError::AuthError(_) => "AuthError",
            GscError::ConfigError(_) => "ConfigError",
            GscError::ParseError(_) => "ParseError",
            GscError::Timeout { .. } => "Timeout",
            GscError::ApiError(_) => "ApiError",
            GscError::Other(_) => "Other",
        }
    }
}

impl From<reqwest::Error> for GscError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GscError::Timeout {
                timeout_ms: 15000, // Default timeout
            }
        } else if error.is_status() {
            let status_code = error.status().map(|s| s.as_u16());
            let message = error.to_string();

            // Determine if it's an auth error based on status code
            if let Some(401 | 403) = status_code {
                GscError::AuthError(message)
            } else {
                GscError::HttpError {
                    message,
                    status_code,
                    response_body: None,
                }
            }
        } else {
            GscError::HttpError {
                message: error.to_string(),
                status_code: None,
                response_body: None,
            }
        }
    }
}

impl From<serde_json::Error> for GscError {
    fn from(error: serde_json::Error) -> Self {
        GscError::ParseError(format!("JSON parsing failed: {error}"))
    }
}

impl From<url::ParseError> for GscError {
    fn from(error: url::ParseError) -> Self {
        GscError::ConfigError(format!("Invalid URL: {error}"))
    }
}

impl From<std::io::Error> for GscError {
    fn from(error: std::io::Error) -> Self {
        GscError::Other(format!("IO error: {error}"))
    }
}
