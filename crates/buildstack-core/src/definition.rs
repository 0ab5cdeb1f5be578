//! Definition files under `.buildstack/`

use crate::error::{CoreError, Result};
use buildstack_config::DEFINITION_DIR;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE: &str = "project.yml";
pub const ROLE_FILE: &str = "role.yml";
pub const SCHEDULE_FILE: &str = "schedule.yml";

/// Path of a definition file for a project root
pub fn definition_path(project_root: &Path, file_name: &str) -> PathBuf {
    project_root.join(DEFINITION_DIR).join(file_name)
}

/// Read and decode a definition file. Missing files yield `None`;
/// an empty file decodes as the type's default.
pub fn read_definition<T>(path: &Path) -> Result<Option<T>>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Some(T::default()));
    }

    let definition = serde_yaml::from_str(&content).map_err(|source| CoreError::InvalidDefinition {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded definition");
    Ok(Some(definition))
}
