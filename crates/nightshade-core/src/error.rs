use std::io;

use thiserror::Error;

/// Errors produced by a single render attempt. None of them are fatal; the
/// caller recovers by issuing a new request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Rejected before anything was scheduled.
    #[error("Invalid render request: {0}")]
    InvalidRequest(String),

    /// The drawing routine could not produce an image.
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

impl RenderError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RenderError::InvalidRequest(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        RenderError::RenderFailed(message.into())
    }
}

/// Errors loading configuration or color catalogs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}
