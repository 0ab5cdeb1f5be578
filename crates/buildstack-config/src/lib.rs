pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding project, role, schedule and settings definitions
pub const DEFINITION_DIR: &str = ".buildstack";

/// Settings file name inside [`DEFINITION_DIR`] (and the global config dir)
pub const SETTINGS_FILE: &str = "settings.yml";

/// Where the generated template is written unless overridden
pub const DEFAULT_TEMPLATE_PATH: &str = "/tmp/buildstack/codebuild.yml";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Generated template location; also the deployment payload
    pub template_path: PathBuf,
    /// Delay between stack status queries
    pub poll_interval: Duration,
    /// Upper bound on a stack wait. `None` waits until a terminal status.
    pub max_wait: Option<Duration>,
    /// Region override; otherwise the aws CLI configuration decides
    pub region: Option<String>,
    /// aws CLI profile
    pub profile: Option<String>,
    /// Suffix appended to the full project name (e.g. "staging")
    pub env_extra: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_wait: None,
            region: None,
            profile: None,
            env_extra: None,
        }
    }
}

/// On-disk shape of a settings file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    template_path: Option<PathBuf>,
    poll_interval_secs: Option<u64>,
    max_wait_secs: Option<u64>,
    region: Option<String>,
    profile: Option<String>,
    env_extra: Option<String>,
}

impl Settings {
    /// Load settings for a project
    ///
    /// Layers, lowest priority first:
    /// 1. built-in defaults
    /// 2. ~/.config/buildstack/settings.yml
    /// 3. <project_root>/.buildstack/settings.yml
    /// 4. BUILDSTACK_* environment variables
    pub fn load(project_root: &Path) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(config_dir) = dirs::config_dir() {
            let global = config_dir.join("buildstack").join(SETTINGS_FILE);
            settings.merge_file(&global)?;
        }

        settings.merge_file(&project_root.join(DEFINITION_DIR).join(SETTINGS_FILE))?;
        settings.apply_env()?;

        tracing::debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(());
        }

        let file: SettingsFile =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::InvalidSettings {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Merging settings file");
        self.merge(file);
        Ok(())
    }

    fn merge(&mut self, file: SettingsFile) {
        if let Some(path) = file.template_path {
            self.template_path = path;
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = file.max_wait_secs {
            self.max_wait = Some(Duration::from_secs(secs));
        }
        if file.region.is_some() {
            self.region = file.region;
        }
        if file.profile.is_some() {
            self.profile = file.profile;
        }
        if file.env_extra.is_some() {
            self.env_extra = file.env_extra;
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(path) = env_value("BUILDSTACK_TEMPLATE_PATH") {
            self.template_path = PathBuf::from(path);
        }
        if let Some(secs) = env_secs("BUILDSTACK_POLL_INTERVAL")? {
            self.poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = env_secs("BUILDSTACK_MAX_WAIT")? {
            self.max_wait = Some(Duration::from_secs(secs));
        }
        if let Some(region) = env_value("BUILDSTACK_REGION") {
            self.region = Some(region);
        }
        if let Some(profile) = env_value("BUILDSTACK_PROFILE") {
            self.profile = Some(profile);
        }
        if let Some(extra) = env_value("BUILDSTACK_ENV_EXTRA") {
            self.env_extra = Some(extra);
        }
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(name: &str) -> Result<Option<u64>> {
    match env_value(name) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue {
                name: name.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

/// Locate the project root
///
/// Search order:
/// 1. BUILDSTACK_PROJECT_ROOT environment variable
/// 2. the nearest ancestor of the current directory containing `.buildstack/`
/// 3. the current directory
pub fn find_project_root() -> Result<PathBuf> {
    if let Some(root) = env_value("BUILDSTACK_PROJECT_ROOT") {
        tracing::debug!(root = %root, "Using BUILDSTACK_PROJECT_ROOT");
        return Ok(PathBuf::from(root));
    }

    let start_dir = std::env::current_dir()?;
    let mut current = start_dir.clone();
    loop {
        if current.join(DEFINITION_DIR).is_dir() {
            tracing::debug!(project_root = %current.display(), "Found project root");
            return Ok(current);
        }
        if !current.pop() {
            break;
        }
    }

    Ok(start_dir)
}
