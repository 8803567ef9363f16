//! Error types of the client layers.

use thiserror::Error;

/// Failure of a call to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the credential; the stored session has already been reset.
    #[error("unauthorized")]
    Unauthorized { message: Option<String> },

    #[error("API error ({status})")]
    Api { status: u16, message: Option<String> },

    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message from the server's error payload, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Api { message, .. } | ApiError::Unauthorized { message } => message.as_deref(),
            _ => None,
        }
    }
}

/// Failure of the durable key-value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
