//! Template composition and persistence
//!
//! A template is a description plus a flat `Resources` mapping. Fragment
//! builders each contribute named resources; [`compose`] merges them and
//! [`write_template`] stores the result as the deployment payload.

use crate::error::{CoreError, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Logical resource name -> resource document
///
/// Ordered so that serializing the same input twice yields identical bytes.
pub type Fragment = BTreeMap<String, Value>;

/// Logical name of the CodeBuild project resource
pub const PROJECT_RESOURCE: &str = "CodeBuild";

/// Logical name of the generated IAM role resource
pub const ROLE_RESOURCE: &str = "IamRole";

/// Infrastructure template document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Resources")]
    pub resources: Fragment,
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            resources: Fragment::new(),
        }
    }

    /// Merge a fragment; later entries replace earlier ones on name collision
    pub fn merge(&mut self, fragment: Fragment) {
        self.resources.extend(fragment);
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Compose a template from fragments, last write wins on collisions
pub fn compose<I>(description: impl Into<String>, fragments: I) -> Template
where
    I: IntoIterator<Item = Fragment>,
{
    let mut template = Template::new(description);
    for fragment in fragments {
        template.merge(fragment);
    }
    template
}

/// Whether the project fragment points at the generated IAM role
///
/// True iff `CodeBuild.Properties.ServiceRole` is exactly `{"Ref": "IamRole"}`.
pub fn needs_generated_role(project_fragment: &Fragment) -> bool {
    project_fragment
        .get(PROJECT_RESOURCE)
        .and_then(|project| project.get("Properties"))
        .and_then(|properties| properties.get("ServiceRole"))
        .and_then(Value::as_object)
        .is_some_and(|role| {
            role.len() == 1 && role.get("Ref").and_then(Value::as_str) == Some(ROLE_RESOURCE)
        })
}

/// Write the template as YAML, creating the parent directory if needed
pub fn write_template(template: &Template, path: &Path) -> Result<()> {
    let content = template.to_yaml()?;

    let write_err = |source: std::io::Error| CoreError::TemplateWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, content).map_err(write_err)?;

    tracing::debug!(path = %path.display(), "Wrote template");
    println!(
        "Generated CloudFormation template at {}",
        path.display().to_string().green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(entries: &[(&str, Value)]) -> Fragment {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_compose_disjoint_fragments_is_union() {
        let a = fragment(&[("CodeBuild", json!({"Type": "AWS::CodeBuild::Project"}))]);
        let b = fragment(&[
            ("IamRole", json!({"Type": "AWS::IAM::Role"})),
            ("EventsRule", json!({"Type": "AWS::Events::Rule"})),
        ]);

        let template = compose("demo", vec![a.clone(), b.clone()]);

        assert_eq!(template.description, "demo");
        assert_eq!(template.resources.len(), 3);
        for (name, value) in a.iter().chain(b.iter()) {
            assert_eq!(template.resources.get(name), Some(value));
        }
    }

    #[test]
    fn test_compose_last_write_wins() {
        let first = fragment(&[("IamRole", json!({"Version": 1}))]);
        let second = fragment(&[("IamRole", json!({"Version": 2}))]);

        let template = compose("demo", vec![first.clone(), second.clone()]);
        assert_eq!(template.resources["IamRole"], json!({"Version": 2}));

        let reversed = compose("demo", vec![second, first]);
        assert_eq!(reversed.resources["IamRole"], json!({"Version": 1}));
    }

    #[test]
    fn test_compose_without_fragments() {
        let template = compose("empty", Vec::new());
        assert!(template.resources.is_empty());
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let build = || {
            compose(
                "CodeBuild Project: demo",
                vec![
                    fragment(&[("Zeta", json!({"b": 1, "a": 2}))]),
                    fragment(&[("Alpha", json!([1, 2, 3]))]),
                ],
            )
        };
        let first = build().to_yaml().unwrap();
        let second = build().to_yaml().unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("Description:"));
        assert!(first.find("Alpha").unwrap() < first.find("Zeta").unwrap());
    }

    #[test]
    fn test_needs_generated_role() {
        let with_ref = fragment(&[(
            "CodeBuild",
            json!({"Properties": {"ServiceRole": {"Ref": "IamRole"}}}),
        )]);
        assert!(needs_generated_role(&with_ref));

        let with_arn = fragment(&[(
            "CodeBuild",
            json!({"Properties": {"ServiceRole": "arn:aws:iam::123456789012:role/build"}}),
        )]);
        assert!(!needs_generated_role(&with_arn));

        let other_ref = fragment(&[(
            "CodeBuild",
            json!({"Properties": {"ServiceRole": {"Ref": "OtherRole"}}}),
        )]);
        assert!(!needs_generated_role(&other_ref));

        assert!(!needs_generated_role(&Fragment::new()));
    }

    #[test]
    fn test_write_template_creates_parent_and_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("codebuild.yml");

        write_template(&compose("first", Vec::new()), &path).unwrap();
        write_template(&compose("second", Vec::new()), &path).unwrap();

        let written: Template =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.description, "second");
    }

    #[test]
    fn test_write_template_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = write_template(&compose("x", Vec::new()), &blocker.join("codebuild.yml"));
        assert!(matches!(result, Err(CoreError::TemplateWrite { .. })));
    }
}
