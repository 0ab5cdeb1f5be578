//! AWS provider implementation

use crate::aws_cli::{AwsCli, BuildDetail, StackInfo};
use async_trait::async_trait;
use buildstack_cloud::{
    BuildInfo, BuildService, LogLine, LogLocation, LogPage, StackDescription, StackService,
    StackStatus,
};
use std::path::Path;

/// AWS provider (CloudFormation + CodeBuild + CloudWatch Logs)
pub struct AwsProvider {
    cli: AwsCli,
}

impl AwsProvider {
    /// `region` overrides the aws CLI configuration when set
    pub fn new(region: Option<String>, profile: Option<String>) -> Self {
        Self {
            cli: AwsCli::new(region, profile),
        }
    }
}

impl From<StackInfo> for StackDescription {
    fn from(info: StackInfo) -> Self {
        Self {
            stack_name: info.stack_name,
            status: StackStatus::from(info.stack_status),
            status_reason: info.stack_status_reason,
        }
    }
}

impl From<BuildDetail> for BuildInfo {
    fn from(detail: BuildDetail) -> Self {
        let log = detail.logs.and_then(|logs| match (logs.group_name, logs.stream_name) {
            (Some(group_name), Some(stream_name)) => Some(LogLocation {
                group_name,
                stream_name,
            }),
            _ => None,
        });

        Self {
            id: detail.id,
            status: detail.build_status,
            log,
        }
    }
}

#[async_trait]
impl StackService for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn deploy_stack(
        &self,
        stack_name: &str,
        template_path: &Path,
    ) -> buildstack_cloud::Result<()> {
        match self.find_stack(stack_name).await? {
            None => {
                tracing::info!(stack = stack_name, "Creating stack");
                self.cli.create_stack(stack_name, template_path).await?;
            }
            Some(stack) if stack.status == StackStatus::RollbackComplete => {
                // A stack that failed its first create can only be deleted
                tracing::info!(stack = stack_name, "Replacing stack in ROLLBACK_COMPLETE");
                self.cli.delete_stack_and_wait(stack_name).await?;
                self.cli.create_stack(stack_name, template_path).await?;
            }
            Some(_) => {
                tracing::info!(stack = stack_name, "Updating stack");
                self.cli.update_stack(stack_name, template_path).await?;
            }
        }
        Ok(())
    }

    async fn describe_stack(&self, stack_name: &str) -> buildstack_cloud::Result<StackDescription> {
        let info = self.cli.describe_stack(stack_name).await?;
        Ok(info.into())
    }

    async fn region(&self) -> Option<String> {
        if let Some(region) = self.cli.region() {
            return Some(region.to_string());
        }

        match self.cli.configured_region().await {
            Ok(region) => region,
            Err(e) => {
                tracing::warn!("Region lookup failed, using the default region: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl BuildService for AwsProvider {
    async fn list_build_ids(&self, project_name: &str) -> buildstack_cloud::Result<Vec<String>> {
        Ok(self.cli.list_builds_for_project(project_name).await?)
    }

    async fn build_info(&self, build_id: &str) -> buildstack_cloud::Result<BuildInfo> {
        let detail = self.cli.get_build(build_id).await?;
        Ok(detail.into())
    }

    async fn log_events(
        &self,
        log: &LogLocation,
        next_token: Option<&str>,
    ) -> buildstack_cloud::Result<LogPage> {
        let response = self
            .cli
            .get_log_events(&log.group_name, &log.stream_name, next_token)
            .await?;

        Ok(LogPage {
            lines: response
                .events
                .into_iter()
                .map(|event| LogLine {
                    timestamp: event.timestamp,
                    message: event.message,
                })
                .collect(),
            next_token: response.next_forward_token,
        })
    }
}
