//! Remote service traits

use crate::classify::{ClassifiedError, ErrorContext, classify};
use crate::error::{CloudError, Result};
use crate::status::StackStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Region used for console links when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Infrastructure orchestration service
///
/// Implementations decide on their own whether a submission creates or
/// updates the stack; callers never branch on prior existence.
#[async_trait]
pub trait StackService: Send + Sync {
    /// Returns the provider name (e.g., "aws")
    fn name(&self) -> &str;

    /// Create or update `stack_name` from the template stored at `template_path`
    async fn deploy_stack(&self, stack_name: &str, template_path: &Path) -> Result<()>;

    /// Describe a stack. Absent stacks surface as [`CloudError::Validation`].
    async fn describe_stack(&self, stack_name: &str) -> Result<StackDescription>;

    /// Region the provider is configured for, if it can be determined
    async fn region(&self) -> Option<String>;

    /// Describe a stack, mapping "does not exist" to `None`
    async fn find_stack(&self, stack_name: &str) -> Result<Option<StackDescription>> {
        match self.describe_stack(stack_name).await {
            Ok(stack) => Ok(Some(stack)),
            Err(CloudError::Validation(message)) => {
                match classify(&message, ErrorContext::Lookup) {
                    ClassifiedError::StackNotFound => Ok(None),
                    _ => Err(CloudError::Validation(message)),
                }
            }
            Err(e) => Err(e),
        }
    }
}

/// Build service that runs the provisioned project
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Build identifiers for a project, most recent first
    async fn list_build_ids(&self, project_name: &str) -> Result<Vec<String>>;

    /// Status and log location of a single build
    async fn build_info(&self, build_id: &str) -> Result<BuildInfo>;

    /// One page of log events, starting after `next_token` when given
    async fn log_events(
        &self,
        log: &LogLocation,
        next_token: Option<&str>,
    ) -> Result<LogPage>;
}

/// Snapshot of a stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDescription {
    pub stack_name: String,
    pub status: StackStatus,
    pub status_reason: Option<String>,
}

impl StackDescription {
    pub fn new(stack_name: impl Into<String>, status: StackStatus) -> Self {
        Self {
            stack_name: stack_name.into(),
            status,
            status_reason: None,
        }
    }
}

/// Snapshot of a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub id: String,
    /// e.g. IN_PROGRESS, SUCCEEDED, FAILED
    pub status: String,
    pub log: Option<LogLocation>,
}

impl BuildInfo {
    pub fn is_in_progress(&self) -> bool {
        self.status == "IN_PROGRESS"
    }
}

/// Where a build writes its output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLocation {
    pub group_name: String,
    pub stream_name: String,
}

/// A page of log lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogPage {
    pub lines: Vec<LogLine>,
    /// Token to resume from on the next call
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    /// Milliseconds since the epoch
    pub timestamp: Option<i64>,
    pub message: String,
}

/// Console link to the stack list for a region
pub fn console_url(region: Option<&str>) -> String {
    let region = region
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REGION);
    format!(
        "https://console.aws.amazon.com/cloudformation/home?region={}#/stacks",
        region
    )
}
