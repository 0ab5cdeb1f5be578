//! Stack service error types

use thiserror::Error;

/// Errors raised while talking to the remote orchestration service
#[derive(Error, Debug)]
pub enum CloudError {
    /// The remote service rejected a request. Carries the raw message,
    /// which is the only thing [`crate::classify`] looks at.
    #[error("{0}")]
    Validation(String),

    #[error("Build not found: {0}")]
    BuildNotFound(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
