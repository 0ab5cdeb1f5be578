//! aws CLI wrapper
//!
//! Wraps the `aws` CLI commands used for CloudFormation, CodeBuild and
//! CloudWatch Logs operations.

use crate::error::{AwsError, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Capabilities required because templates may create named IAM roles
const CAPABILITIES: [&str; 2] = ["CAPABILITY_IAM", "CAPABILITY_NAMED_IAM"];

/// aws CLI wrapper
pub struct AwsCli {
    region: Option<String>,
    profile: Option<String>,
}

impl AwsCli {
    pub fn new(region: Option<String>, profile: Option<String>) -> Self {
        Self { region, profile }
    }

    /// Region explicitly passed to every command, if any
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Run an aws command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("aws");
        cmd.args(args);
        if let Some(ref region) = self.region {
            cmd.arg("--region").arg(region);
        }
        if let Some(ref profile) = self.profile {
            cmd.arg("--profile").arg(profile);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: aws {}", args.join(" "));

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(AwsError::AwsCliNotFound),
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(parse_error_output(&stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a command that prints JSON and decode it
    async fn run_json<T: serde::de::DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let mut args = args.to_vec();
        args.extend(["--output", "json"]);
        let output = self.run_command(&args).await?;
        Ok(serde_json::from_str(&output)?)
    }

    // ========== CloudFormation ==========

    /// Describe a single stack
    pub async fn describe_stack(&self, stack_name: &str) -> Result<StackInfo> {
        let response: DescribeStacksResponse = self
            .run_json(&["cloudformation", "describe-stacks", "--stack-name", stack_name])
            .await?;

        response
            .stacks
            .into_iter()
            .next()
            .ok_or_else(|| {
                AwsError::UnexpectedOutput(format!("no stack in response for {}", stack_name))
            })
    }

    /// Create a stack from a template file
    pub async fn create_stack(&self, stack_name: &str, template_path: &Path) -> Result<()> {
        self.submit_stack("create-stack", stack_name, template_path).await
    }

    /// Update a stack from a template file
    pub async fn update_stack(&self, stack_name: &str, template_path: &Path) -> Result<()> {
        self.submit_stack("update-stack", stack_name, template_path).await
    }

    async fn submit_stack(
        &self,
        operation: &str,
        stack_name: &str,
        template_path: &Path,
    ) -> Result<()> {
        let template_body = template_body_arg(template_path);
        let mut args = vec![
            "cloudformation",
            operation,
            "--stack-name",
            stack_name,
            "--template-body",
            template_body.as_str(),
            "--capabilities",
        ];
        args.extend(CAPABILITIES);

        let _: SubmitStackResponse = self.run_json(&args).await?;
        Ok(())
    }

    /// Delete a stack and block until the deletion has finished
    pub async fn delete_stack_and_wait(&self, stack_name: &str) -> Result<()> {
        self.run_command(&["cloudformation", "delete-stack", "--stack-name", stack_name])
            .await?;
        self.run_command(&[
            "cloudformation",
            "wait",
            "stack-delete-complete",
            "--stack-name",
            stack_name,
        ])
        .await?;
        Ok(())
    }

    /// Region from the local aws configuration
    pub async fn configured_region(&self) -> Result<Option<String>> {
        let mut args = vec!["configure", "get", "region"];
        if let Some(ref profile) = self.profile {
            args.extend(["--profile", profile.as_str()]);
        }

        // `configure get` exits 1 when the key is unset
        let output = Command::new("aws")
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await?;

        let region = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || region.is_empty() {
            return Ok(None);
        }
        Ok(Some(region))
    }

    // ========== CodeBuild ==========

    /// Build ids for a project, most recent first
    pub async fn list_builds_for_project(&self, project_name: &str) -> Result<Vec<String>> {
        let response: ListBuildsResponse = self
            .run_json(&[
                "codebuild",
                "list-builds-for-project",
                "--project-name",
                project_name,
                "--sort-order",
                "DESCENDING",
            ])
            .await?;
        Ok(response.ids)
    }

    /// Fetch a single build
    pub async fn get_build(&self, build_id: &str) -> Result<BuildDetail> {
        let response: BatchGetBuildsResponse = self
            .run_json(&["codebuild", "batch-get-builds", "--ids", build_id])
            .await?;

        response
            .builds
            .into_iter()
            .next()
            .ok_or_else(|| AwsError::BuildNotFound(build_id.to_string()))
    }

    // ========== CloudWatch Logs ==========

    /// Fetch one page of log events, oldest first
    pub async fn get_log_events(
        &self,
        group_name: &str,
        stream_name: &str,
        next_token: Option<&str>,
    ) -> Result<LogEventsResponse> {
        let mut args = vec![
            "logs",
            "get-log-events",
            "--log-group-name",
            group_name,
            "--log-stream-name",
            stream_name,
            "--start-from-head",
        ];
        if let Some(token) = next_token {
            args.extend(["--next-token", token]);
        }
        self.run_json(&args).await
    }
}

/// `--template-body` value pointing at a local file
fn template_body_arg(template_path: &Path) -> String {
    format!("file://{}", template_path.display())
}

/// Map CLI stderr to an error
///
/// The CLI prints service errors as
/// `An error occurred (<Code>) when calling the <Op> operation: <message>`.
pub(crate) fn parse_error_output(stderr: &str) -> AwsError {
    let stderr = stderr.trim();

    let Some(rest) = stderr
        .find("An error occurred (")
        .map(|idx| &stderr[idx + "An error occurred (".len()..])
    else {
        return AwsError::CommandFailed(stderr.to_string());
    };

    let code = rest.split(')').next().unwrap_or_default();
    let message = rest
        .split_once("operation: ")
        .map(|(_, message)| message.trim().to_string())
        .unwrap_or_else(|| stderr.to_string());

    match code {
        "ValidationError" => AwsError::Validation(message),
        "ExpiredToken" | "InvalidClientTokenId" | "UnrecognizedClientException"
        | "AccessDenied" | "AccessDeniedException" => AwsError::AuthenticationFailed(message),
        _ => AwsError::CommandFailed(format!("{}: {}", code, message)),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DescribeStacksResponse {
    #[serde(rename = "Stacks", default)]
    stacks: Vec<StackInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct SubmitStackResponse {
    #[serde(rename = "StackId")]
    #[allow(dead_code)]
    stack_id: Option<String>,
}

/// Stack information from describe-stacks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackInfo {
    #[serde(rename = "StackName")]
    pub stack_name: String,

    #[serde(rename = "StackStatus")]
    pub stack_status: String,

    #[serde(rename = "StackStatusReason")]
    pub stack_status_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListBuildsResponse {
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchGetBuildsResponse {
    #[serde(default)]
    builds: Vec<BuildDetail>,
}

/// Build information from batch-get-builds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDetail {
    pub id: String,

    #[serde(rename = "buildStatus")]
    pub build_status: String,

    pub logs: Option<BuildLogs>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildLogs {
    #[serde(rename = "groupName")]
    pub group_name: Option<String>,

    #[serde(rename = "streamName")]
    pub stream_name: Option<String>,
}

/// Response of get-log-events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEventsResponse {
    #[serde(default)]
    pub events: Vec<LogEvent>,

    #[serde(rename = "nextForwardToken")]
    pub next_forward_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: Option<i64>,
    pub message: String,
}
