// src/error.rs
use thiserror::Error;

/// Errors surfaced by the job finder client.
///
/// `Validation` is raised before any network call. `Upload` and `Poll` carry the
/// message that ends up in front of the user.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Poll(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Export(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
