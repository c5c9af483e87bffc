//! Error types for arr-warden
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Common result type for arr-warden operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the arr-warden service
#[derive(Error, Debug)]
pub enum Error {
    /// Profile file loading or serialization error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Webhook payload failed validation before any remediation was attempted
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors talking to a backend
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from a backend API
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Filesystem watch errors
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Feature not yet implemented for this backend type
    #[error("Not yet supported: {0}")]
    Unsupported(String),
}
