//! Error types for the Discourse client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the gateway and the resource clients
#[derive(Debug, Error)]
pub enum Error {
    /// The API answered with anything other than 200
    #[error("{method} request to {path} returned a code of {status}")]
    Request {
        method: reqwest::Method,
        path: String,
        status: u16,
    },

    /// A named entity the operation depends on does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Strict creation of an entity that already exists
    #[error("already exists: {0}")]
    Duplicate(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by a [`Error::Request`], if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Duplicate(_))
    }
}
