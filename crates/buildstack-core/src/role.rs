//! Generated IAM service role for the CodeBuild project

use crate::definition::{ROLE_FILE, definition_path, read_definition};
use crate::error::Result;
use crate::template::{Fragment, ROLE_RESOURCE};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Contents of `role.yml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleDefinition {
    #[serde(default)]
    pub statements: Vec<StatementDefinition>,

    #[serde(default)]
    pub managed_policy_arns: Vec<String>,
}

/// One IAM policy statement
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatementDefinition {
    #[serde(default = "default_effect")]
    pub effect: String,
    pub actions: Vec<String>,
    #[serde(default = "default_resources")]
    pub resources: Vec<String>,
}

fn default_effect() -> String {
    "Allow".to_string()
}

fn default_resources() -> Vec<String> {
    vec!["*".to_string()]
}

/// Builds the `IamRole` fragment
pub struct RoleBuilder {
    path: PathBuf,
}

impl RoleBuilder {
    pub fn new(project_root: &Path) -> Self {
        Self {
            path: definition_path(project_root, ROLE_FILE),
        }
    }

    /// Always produces a role; `role.yml` only adds to the baseline policy
    pub fn build(&self) -> Result<Fragment> {
        let definition: RoleDefinition = read_definition(&self.path)?.unwrap_or_default();

        let mut statements = vec![json!({
            "Effect": "Allow",
            "Action": [
                "logs:CreateLogGroup",
                "logs:CreateLogStream",
                "logs:PutLogEvents",
                "ssm:GetParameters",
            ],
            "Resource": "*",
        })];
        statements.extend(definition.statements.iter().map(|s| {
            json!({
                "Effect": s.effect,
                "Action": s.actions,
                "Resource": s.resources,
            })
        }));

        let mut properties = json!({
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {"Service": ["codebuild.amazonaws.com"]},
                    "Action": ["sts:AssumeRole"],
                }],
            },
            "Path": "/",
            "Policies": [{
                "PolicyName": "CodeBuildAccess",
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": statements,
                },
            }],
        });
        if !definition.managed_policy_arns.is_empty() {
            properties["ManagedPolicyArns"] = Value::from(definition.managed_policy_arns);
        }

        let mut fragment = Fragment::new();
        fragment.insert(
            ROLE_RESOURCE.to_string(),
            json!({
                "Type": "AWS::IAM::Role",
                "Properties": properties,
            }),
        );
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_role_without_definition() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fragment = RoleBuilder::new(temp_dir.path()).build().unwrap();

        let role = &fragment["IamRole"];
        assert_eq!(role["Type"], "AWS::IAM::Role");
        let statements = &role["Properties"]["Policies"][0]["PolicyDocument"]["Statement"];
        assert_eq!(statements.as_array().unwrap().len(), 1);
        assert!(role["Properties"].get("ManagedPolicyArns").is_none());
    }

    #[test]
    fn test_extra_statements_and_managed_policies() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = definition_path(temp_dir.path(), ROLE_FILE);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"
statements:
  - actions: ["s3:GetObject", "s3:PutObject"]
    resources: ["arn:aws:s3:::demo-artifacts/*"]
managed_policy_arns:
  - arn:aws:iam::aws:policy/AmazonEC2ContainerRegistryPowerUser
"#,
        )
        .unwrap();

        let fragment = RoleBuilder::new(temp_dir.path()).build().unwrap();
        let properties = &fragment["IamRole"]["Properties"];
        let statements = &properties["Policies"][0]["PolicyDocument"]["Statement"];

        assert_eq!(statements.as_array().unwrap().len(), 2);
        assert_eq!(statements[1]["Effect"], "Allow");
        assert_eq!(statements[1]["Action"][1], "s3:PutObject");
        assert_eq!(
            properties["ManagedPolicyArns"][0],
            "arn:aws:iam::aws:policy/AmazonEC2ContainerRegistryPowerUser"
        );
    }
}
