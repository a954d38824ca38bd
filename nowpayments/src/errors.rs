use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Required setting is missing or invalid (e.g. no IPN secret configured).
    ///
    /// Never folded into a negative verification result: a caller that sees this
    /// cannot verify anything and must reject the delivery.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Gateway rejected the API key
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Gateway answered with an error status
    #[error("API error {status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
        body: String,
    },

    /// Network or request construction failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body was not the JSON we expected
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Request parameters rejected before anything was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// HTTP status of the failed gateway call, if the failure came from the gateway
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::Authentication(_) => Some(StatusCode::UNAUTHORIZED),
            Error::Api { status, .. } => Some(*status),
            Error::Request(err) => err.status(),
            Error::Configuration(_) | Error::Json(_) | Error::InvalidRequest(_) | Error::InvalidUrl(_) => None,
        }
    }

    /// Whether this error means the integrator's setup is broken rather than the request
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::InvalidUrl(_))
    }
}
