//! CodeBuild project fragment
//!
//! Reads `.buildstack/project.yml` and produces the `CodeBuild` resource.

use crate::definition::{PROJECT_FILE, definition_path, read_definition};
use crate::error::{CoreError, Result};
use crate::template::{Fragment, PROJECT_RESOURCE, ROLE_RESOURCE};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_TIMEOUT_MINUTES: u32 = 20;

/// Contents of `project.yml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDefinition {
    pub description: Option<String>,

    #[serde(default)]
    pub source: SourceDefinition,

    #[serde(default)]
    pub environment: EnvironmentDefinition,

    /// Existing role ARN. When absent the generated role is referenced.
    pub service_role: Option<String>,

    pub timeout_in_minutes: Option<u32>,

    /// Raw `Artifacts` block; defaults to no artifacts
    pub artifacts: Option<Value>,

    /// Raw properties merged over the generated ones
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SourceDefinition {
    #[serde(rename = "type")]
    pub source_type: String,
    pub location: Option<String>,
    pub buildspec: Option<String>,
    pub git_clone_depth: Option<u32>,
}

impl Default for SourceDefinition {
    fn default() -> Self {
        Self {
            source_type: "GITHUB".to_string(),
            location: None,
            buildspec: None,
            git_clone_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EnvironmentDefinition {
    pub compute_type: String,
    pub image: String,
    #[serde(rename = "type")]
    pub environment_type: String,
    pub privileged_mode: bool,
    pub variables: BTreeMap<String, String>,
}

impl Default for EnvironmentDefinition {
    fn default() -> Self {
        Self {
            compute_type: "BUILD_GENERAL1_SMALL".to_string(),
            image: "aws/codebuild/standard:7.0".to_string(),
            environment_type: "LINUX_CONTAINER".to_string(),
            privileged_mode: false,
            variables: BTreeMap::new(),
        }
    }
}

/// Builds the `CodeBuild` fragment for one project
pub struct ProjectBuilder {
    path: PathBuf,
    full_project_name: String,
}

impl ProjectBuilder {
    pub fn new(project_root: &Path, full_project_name: impl Into<String>) -> Self {
        Self {
            path: definition_path(project_root, PROJECT_FILE),
            full_project_name: full_project_name.into(),
        }
    }

    /// Expected location of the project definition
    pub fn project_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn build(&self) -> Result<Fragment> {
        let definition: ProjectDefinition = read_definition(&self.path)?
            .ok_or_else(|| CoreError::ProjectNotFound(self.path.clone()))?;

        let mut fragment = Fragment::new();
        fragment.insert(
            PROJECT_RESOURCE.to_string(),
            project_resource(&definition, &self.full_project_name),
        );
        Ok(fragment)
    }
}

fn project_resource(definition: &ProjectDefinition, name: &str) -> Value {
    let mut source = Map::new();
    source.insert("Type".into(), json!(definition.source.source_type));
    if let Some(ref location) = definition.source.location {
        source.insert("Location".into(), json!(location));
    }
    if let Some(ref buildspec) = definition.source.buildspec {
        source.insert("BuildSpec".into(), json!(buildspec));
    }
    if let Some(depth) = definition.source.git_clone_depth {
        source.insert("GitCloneDepth".into(), json!(depth));
    }

    let env = &definition.environment;
    let variables: Vec<Value> = env
        .variables
        .iter()
        .map(|(name, value)| json!({"Name": name, "Value": value, "Type": "PLAINTEXT"}))
        .collect();

    let service_role = match definition.service_role {
        Some(ref arn) => json!(arn),
        None => json!({"Ref": ROLE_RESOURCE}),
    };

    let mut properties = Map::new();
    properties.insert("Name".into(), json!(name));
    if let Some(ref description) = definition.description {
        properties.insert("Description".into(), json!(description));
    }
    properties.insert("Source".into(), Value::Object(source));
    properties.insert(
        "Artifacts".into(),
        definition
            .artifacts
            .clone()
            .unwrap_or_else(|| json!({"Type": "NO_ARTIFACTS"})),
    );
    properties.insert(
        "Environment".into(),
        json!({
            "ComputeType": env.compute_type,
            "Image": env.image,
            "Type": env.environment_type,
            "PrivilegedMode": env.privileged_mode,
            "EnvironmentVariables": variables,
        }),
    );
    properties.insert("ServiceRole".into(), service_role);
    properties.insert(
        "TimeoutInMinutes".into(),
        json!(definition.timeout_in_minutes.unwrap_or(DEFAULT_TIMEOUT_MINUTES)),
    );

    for (key, value) in &definition.properties {
        properties.insert(key.clone(), value.clone());
    }

    json!({
        "Type": "AWS::CodeBuild::Project",
        "Properties": properties,
    })
}
