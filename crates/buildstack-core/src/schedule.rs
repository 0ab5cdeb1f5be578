//! Scheduled builds
//!
//! An events rule that starts the CodeBuild project on a rate or cron
//! expression, plus the role the rule assumes to do so.

use crate::definition::{SCHEDULE_FILE, definition_path, read_definition};
use crate::error::Result;
use crate::template::{Fragment, PROJECT_RESOURCE};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};

pub const RULE_RESOURCE: &str = "EventsRule";
pub const RULE_ROLE_RESOURCE: &str = "EventsRuleRole";

/// Contents of `schedule.yml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleDefinition {
    /// `rate(...)` or `cron(...)`
    pub expression: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub description: Option<String>,
}

impl Default for ScheduleDefinition {
    fn default() -> Self {
        Self {
            expression: None,
            enabled: default_enabled(),
            description: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Builds the schedule fragment, if a schedule is configured
pub struct ScheduleBuilder {
    path: PathBuf,
}

impl ScheduleBuilder {
    pub fn new(project_root: &Path) -> Self {
        Self {
            path: definition_path(project_root, SCHEDULE_FILE),
        }
    }

    /// `None` when there is no schedule file or it has no expression
    pub fn build(&self) -> Result<Option<Fragment>> {
        let Some(definition) = read_definition::<ScheduleDefinition>(&self.path)? else {
            return Ok(None);
        };
        let Some(expression) = definition
            .expression
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
        else {
            tracing::debug!(path = %self.path.display(), "Schedule has no expression");
            return Ok(None);
        };

        let project_arn = json!({"Fn::GetAtt": [PROJECT_RESOURCE, "Arn"]});
        let description = definition
            .description
            .clone()
            .unwrap_or_else(|| "Scheduled CodeBuild run".to_string());
        let state = if definition.enabled { "ENABLED" } else { "DISABLED" };

        let rule = json!({
            "Type": "AWS::Events::Rule",
            "Properties": {
                "Description": description,
                "ScheduleExpression": expression,
                "State": state,
                "Targets": [{
                    "Arn": project_arn,
                    "Id": "CodeBuildTarget",
                    "RoleArn": {"Fn::GetAtt": [RULE_ROLE_RESOURCE, "Arn"]},
                }],
            },
        });

        let rule_role = json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": {"Service": ["events.amazonaws.com"]},
                        "Action": ["sts:AssumeRole"],
                    }],
                },
                "Path": "/",
                "Policies": [{
                    "PolicyName": "StartBuild",
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Action": ["codebuild:StartBuild"],
                            "Resource": project_arn,
                        }],
                    },
                }],
            },
        });

        let mut fragment = Fragment::new();
        fragment.insert(RULE_RESOURCE.to_string(), rule);
        fragment.insert(RULE_ROLE_RESOURCE.to_string(), rule_role);
        Ok(Some(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_schedule(root: &Path, content: &str) {
        let path = definition_path(root, SCHEDULE_FILE);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_no_schedule_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(ScheduleBuilder::new(temp_dir.path()).build().unwrap().is_none());
    }

    #[test]
    fn test_schedule_without_expression() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_schedule(temp_dir.path(), "enabled: true\n");
        assert!(ScheduleBuilder::new(temp_dir.path()).build().unwrap().is_none());
    }

    #[test]
    fn test_schedule_fragment() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_schedule(
            temp_dir.path(),
            "expression: \"cron(0 8 * * ? *)\"\nenabled: false\n",
        );

        let fragment = ScheduleBuilder::new(temp_dir.path())
            .build()
            .unwrap()
            .unwrap();

        let rule = &fragment[RULE_RESOURCE]["Properties"];
        assert_eq!(rule["ScheduleExpression"], "cron(0 8 * * ? *)");
        assert_eq!(rule["State"], "DISABLED");
        assert_eq!(rule["Targets"][0]["Arn"]["Fn::GetAtt"][0], "CodeBuild");
        assert!(fragment.contains_key(RULE_ROLE_RESOURCE));
    }
}
