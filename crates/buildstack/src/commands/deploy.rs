use buildstack_config::Settings;
use buildstack_core::{DeployOptions, DeployOutcome, DeploymentRequest, StackDeployer};
use std::path::Path;

pub async fn handle(
    project_root: &Path,
    settings: Settings,
    options: DeployOptions,
) -> anyhow::Result<DeployOutcome> {
    let request = DeploymentRequest::resolve(options, project_root, &settings);
    tracing::info!(
        stack = %request.stack_name,
        project = %request.full_project_name,
        wait = request.wait,
        noop = request.noop,
        "Starting deployment"
    );

    let provider = super::aws_provider(&settings);
    let deployer = StackDeployer::new(&provider, project_root, settings);
    let outcome = deployer.run(&request).await?;

    tracing::info!(outcome = ?outcome, "Deployment finished");
    Ok(outcome)
}
