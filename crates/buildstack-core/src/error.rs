use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Project definition not found: {0}")]
    ProjectNotFound(PathBuf),

    #[error("Invalid definition: {path}\nReason: {source}")]
    InvalidDefinition {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write template: {path}\nReason: {source}")]
    TemplateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize template: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("No builds found for project: {0}")]
    NoBuilds(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Cloud(#[from] buildstack_cloud::CloudError),

    #[error(transparent)]
    Config(#[from] buildstack_config::ConfigError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
