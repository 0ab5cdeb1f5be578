//! AWS provider error types

use buildstack_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("aws CLI not found. Please install: https://aws.amazon.com/cli/")]
    AwsCliNotFound,

    /// `(ValidationError)` reported by the service; carries the message part only
    #[error("{0}")]
    Validation(String),

    #[error("aws credentials rejected: {0}")]
    AuthenticationFailed(String),

    #[error("aws command failed: {0}")]
    CommandFailed(String),

    #[error("Build not found: {0}")]
    BuildNotFound(String),

    #[error("Unexpected aws output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Validation(message) => CloudError::Validation(message),
            AwsError::AuthenticationFailed(message) => CloudError::AuthenticationFailed(message),
            AwsError::BuildNotFound(id) => CloudError::BuildNotFound(id),
            AwsError::UnexpectedOutput(message) => CloudError::UnexpectedResponse(message),
            AwsError::JsonError(e) => CloudError::Json(e),
            AwsError::IoError(e) => CloudError::Io(e),
            other => CloudError::CommandFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
