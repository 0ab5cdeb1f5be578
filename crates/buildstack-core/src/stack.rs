//! Stack deployment
//!
//! Composes the template from the project, role and schedule fragments,
//! writes it, submits it and optionally waits for the stack to settle.
//! Steps run strictly in that order.

use crate::error::{CoreError, Result};
use crate::naming::{inferred_project_name, inferred_stack_name, project_name_convention};
use crate::project::ProjectBuilder;
use crate::role::RoleBuilder;
use crate::schedule::ScheduleBuilder;
use crate::template::{Template, compose, needs_generated_role, write_template};
use buildstack_cloud::{
    ClassifiedError, CloudError, ErrorContext, StackService, StatusPoller, WaitConfig, classify,
    console_url,
};
use buildstack_config::Settings;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Options as given on the command line
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub stack_name: Option<String>,
    pub project_name: Option<String>,
    pub wait: bool,
    pub noop: bool,
}

/// Names and flags for one deployment, fixed for the whole run
///
/// The template document is not part of the request. [`StackDeployer::run`]
/// composes it from the definitions on disk after checking that the project
/// exists, so a missing project never gets as far as composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub stack_name: String,
    pub project_name: String,
    pub full_project_name: String,
    pub wait: bool,
    pub noop: bool,
}

impl DeploymentRequest {
    /// Fill in names that were not given explicitly
    pub fn resolve(options: DeployOptions, project_root: &Path, settings: &Settings) -> Self {
        let project_name = options
            .project_name
            .unwrap_or_else(|| inferred_project_name(project_root));
        let full_project_name =
            project_name_convention(&project_name, settings.env_extra.as_deref());
        let stack_name = options
            .stack_name
            .unwrap_or_else(|| inferred_stack_name(&full_project_name));

        Self {
            stack_name,
            project_name,
            full_project_name,
            wait: options.wait,
            noop: options.noop,
        }
    }

    /// Template description
    pub fn description(&self) -> String {
        format!("CodeBuild Project: {}", self.full_project_name)
    }
}

/// How a deployment ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Template written and, unless no-op, submitted (and settled if waited on)
    Success,
    /// A local definition is missing or unreadable
    ConfigurationError,
    /// The remote service rejected the submission
    ValidationError,
    /// The stack settled in a non-success status
    WaitFailed,
}

impl DeployOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            DeployOutcome::Success => 0,
            DeployOutcome::ConfigurationError | DeployOutcome::ValidationError => 1,
            DeployOutcome::WaitFailed => 2,
        }
    }

    pub fn is_success(self) -> bool {
        self == DeployOutcome::Success
    }
}

/// Drives one deployment against a stack service
pub struct StackDeployer<'a> {
    service: &'a dyn StackService,
    project_root: PathBuf,
    settings: Settings,
}

impl<'a> StackDeployer<'a> {
    pub fn new(
        service: &'a dyn StackService,
        project_root: impl Into<PathBuf>,
        settings: Settings,
    ) -> Self {
        Self {
            service,
            project_root: project_root.into(),
            settings,
        }
    }

    /// Compose the template without touching disk or the remote service
    pub fn build_template(&self, request: &DeploymentRequest) -> Result<Template> {
        let project = ProjectBuilder::new(&self.project_root, &request.full_project_name).build()?;

        let mut fragments = Vec::with_capacity(3);
        let role_needed = needs_generated_role(&project);
        fragments.push(project);

        if role_needed {
            fragments.push(RoleBuilder::new(&self.project_root).build()?);
        }
        if let Some(schedule) = ScheduleBuilder::new(&self.project_root).build()? {
            fragments.push(schedule);
        }

        Ok(compose(request.description(), fragments))
    }

    /// Run the deployment
    ///
    /// Template write failures and unexpected remote failures are returned
    /// as errors; every classified condition becomes a [`DeployOutcome`].
    pub async fn run(&self, request: &DeploymentRequest) -> Result<DeployOutcome> {
        let project = ProjectBuilder::new(&self.project_root, &request.full_project_name);
        if !project.exists() {
            println!(
                "{} buildstack project does not exist: {}",
                "ERROR:".red().bold(),
                project.project_path().display()
            );
            return Ok(DeployOutcome::ConfigurationError);
        }

        let template = match self.build_template(request) {
            Ok(template) => template,
            Err(e @ (CoreError::InvalidDefinition { .. } | CoreError::ProjectNotFound(_))) => {
                println!("{} {}", "ERROR:".red().bold(), e);
                return Ok(DeployOutcome::ConfigurationError);
            }
            Err(e) => return Err(e),
        };

        write_template(&template, &self.settings.template_path)?;
        if request.noop {
            tracing::info!("No-op mode, skipping submission");
            return Ok(DeployOutcome::Success);
        }

        println!(
            "Deploying stack {} with CodeBuild project {}",
            request.stack_name.green(),
            request.full_project_name.green()
        );

        match self.submit_and_wait(request).await {
            Ok(outcome) => Ok(outcome),
            Err(CloudError::Validation(message)) => {
                self.handle_validation(request, &message).await
            }
            Err(CloudError::Timeout(message)) => {
                println!("{} {}", "ERROR:".red().bold(), message);
                Ok(DeployOutcome::WaitFailed)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn submit_and_wait(
        &self,
        request: &DeploymentRequest,
    ) -> buildstack_cloud::Result<DeployOutcome> {
        self.service
            .deploy_stack(&request.stack_name, &self.settings.template_path)
            .await?;
        self.print_stack_info(&request.stack_name).await;

        if !request.wait {
            return Ok(DeployOutcome::Success);
        }

        let config = WaitConfig {
            interval: self.settings.poll_interval,
            max_wait: self.settings.max_wait,
        };
        let mut poller = StatusPoller::new(self.service, config);
        let status = poller.wait(&request.stack_name).await?;

        if poller.success() {
            println!("Stack {} is {}", request.stack_name.green(), status.as_str().green());
            Ok(DeployOutcome::Success)
        } else {
            println!(
                "{} Stack {} finished with status {}",
                "ERROR:".red().bold(),
                request.stack_name,
                status.as_str().red()
            );
            Ok(DeployOutcome::WaitFailed)
        }
    }

    async fn handle_validation(
        &self,
        request: &DeploymentRequest,
        message: &str,
    ) -> Result<DeployOutcome> {
        match classify(message, ErrorContext::Submission) {
            ClassifiedError::NoUpdatesNeeded => {
                println!("{} {}", "WARN:".yellow().bold(), message.yellow());
                self.print_stack_info(&request.stack_name).await;
                Ok(DeployOutcome::Success)
            }
            ClassifiedError::StackNotFound | ClassifiedError::Fatal(_) => {
                println!("{} {}", "ERROR ValidationError:".red().bold(), message.red());
                Ok(DeployOutcome::ValidationError)
            }
        }
    }

    /// Print stack status and console link. Never fails the run.
    async fn print_stack_info(&self, stack_name: &str) {
        for line in self.stack_info_lines(stack_name).await {
            println!("{}", line);
        }
    }

    /// Stack status line and console link. A failed lookup becomes a
    /// `WARN:` line instead of an error.
    async fn stack_info_lines(&self, stack_name: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);

        match self.service.find_stack(stack_name).await {
            Ok(Some(stack)) => lines.push(format!(
                "Stack name {} status {}",
                stack_name.yellow(),
                stack.status.as_str().yellow()
            )),
            Ok(None) => tracing::debug!(stack = stack_name, "Stack not visible yet"),
            Err(e) => {
                tracing::warn!(stack = stack_name, "Stack lookup failed: {}", e);
                lines.push(format!(
                    "{} Could not look up stack {}: {}",
                    "WARN:".yellow().bold(),
                    stack_name,
                    e
                ));
            }
        }

        let region = match self.settings.region {
            Some(ref region) => Some(region.clone()),
            None => self.service.region().await,
        };
        lines.push(format!(
            "Here's the CloudFormation url to check for more details {}",
            console_url(region.as_deref())
        ));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            env_extra: Some("staging".to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_resolve_inferred_names() {
        let request = DeploymentRequest::resolve(
            DeployOptions {
                wait: true,
                ..Default::default()
            },
            Path::new("/src/demo-web"),
            &settings(),
        );

        assert_eq!(request.project_name, "demo-web");
        assert_eq!(request.full_project_name, "demo-web-staging");
        assert_eq!(request.stack_name, "demo-web-staging-cb");
        assert_eq!(request.description(), "CodeBuild Project: demo-web-staging");
        assert!(request.wait);
    }

    #[test]
    fn test_resolve_explicit_names() {
        let request = DeploymentRequest::resolve(
            DeployOptions {
                stack_name: Some("custom-stack".to_string()),
                project_name: Some("api".to_string()),
                ..Default::default()
            },
            Path::new("/src/demo-web"),
            &Settings::default(),
        );

        assert_eq!(request.project_name, "api");
        assert_eq!(request.full_project_name, "api");
        assert_eq!(request.stack_name, "custom-stack");
    }

    /// Stack service whose lookups fail with a fixed error
    struct FailingLookup;

    #[async_trait::async_trait]
    impl StackService for FailingLookup {
        fn name(&self) -> &str {
            "failing-lookup"
        }

        async fn deploy_stack(
            &self,
            _stack_name: &str,
            _template_path: &Path,
        ) -> buildstack_cloud::Result<()> {
            Ok(())
        }

        async fn describe_stack(
            &self,
            _stack_name: &str,
        ) -> buildstack_cloud::Result<buildstack_cloud::StackDescription> {
            Err(CloudError::AuthenticationFailed("token expired".to_string()))
        }

        async fn region(&self) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn test_failed_lookup_is_reported() {
        colored::control::set_override(false);
        let deployer = StackDeployer::new(&FailingLookup, "/src/demo", Settings::default());

        let lines = deployer.stack_info_lines("demo-cb").await;

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("WARN: Could not look up stack demo-cb"));
        assert!(lines[0].contains("token expired"));
        assert!(lines[1].ends_with("region=us-east-1#/stacks"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(DeployOutcome::Success.exit_code(), 0);
        assert_eq!(DeployOutcome::ConfigurationError.exit_code(), 1);
        assert_eq!(DeployOutcome::ValidationError.exit_code(), 1);
        assert_eq!(DeployOutcome::WaitFailed.exit_code(), 2);
    }
}
