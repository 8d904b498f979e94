use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

/// Every failure the client can surface. The backend does not distinguish
/// partial failures, so neither do we: a request either succeeded or it
/// collapses into one of these.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed ({status}): {error}")]
    Api { status: u16, error: ApiError },
    #[error("invalid response payload: {0}")]
    Decode(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported server url scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("not logged in")]
    MissingToken,
    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// True when the caller should re-authenticate before retrying.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ClientError::MissingToken => true,
            ClientError::Api { error, .. } => error.code == ErrorCode::Unauthorized,
            _ => false,
        }
    }
}
