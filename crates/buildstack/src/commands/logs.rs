use buildstack_config::Settings;
use buildstack_core::{LogFetcher, inferred_project_name, project_name_convention};
use std::path::Path;

pub async fn handle(
    project_root: &Path,
    settings: Settings,
    project_name: Option<String>,
    build_id: Option<String>,
    follow: bool,
) -> anyhow::Result<()> {
    let project_name = project_name.unwrap_or_else(|| inferred_project_name(project_root));
    let full_project_name = project_name_convention(&project_name, settings.env_extra.as_deref());

    let provider = super::aws_provider(&settings);
    let fetcher = LogFetcher::new(&provider, settings.poll_interval);

    let build_id = fetcher
        .resolve_build_id(build_id.as_deref(), &full_project_name)
        .await?;
    fetcher.run(&build_id, follow).await?;

    Ok(())
}
