//! Client error types

use optica_checkout::gateway::GatewayError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered 200 but reported an application error code
    #[error("backend error {code}: {message}")]
    Backend { code: String, message: String },

    /// Invalid response format
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required (HTTP 401)
    #[error("authentication required")]
    Unauthorized,

    /// Permission denied (HTTP 403)
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Resource existed but is past its lifetime (HTTP 410)
    #[error("gone: {0}")]
    Gone(String),

    /// Request rejected by backend validation (HTTP 400)
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Strip the transport specifics off an error before it crosses into
/// the checkout engine.
impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => GatewayError::Network(e.to_string()),
            ClientError::Backend { code, message } => {
                GatewayError::Unknown(format!("{code}: {message}"))
            }
            ClientError::InvalidResponse(msg) => GatewayError::Unknown(msg),
            ClientError::Unauthorized => GatewayError::Unauthenticated,
            ClientError::Forbidden(msg) => GatewayError::Forbidden(msg),
            ClientError::NotFound(_) => GatewayError::NotFound,
            ClientError::Gone(_) => GatewayError::Expired,
            ClientError::Validation(msg) => GatewayError::Malformed(msg),
            ClientError::Internal(msg) => GatewayError::Unknown(msg),
            ClientError::Serialization(e) => GatewayError::Unknown(e.to_string()),
        }
    }
}
