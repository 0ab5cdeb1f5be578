use async_trait::async_trait;
use buildstack_cloud::{
    BuildInfo, BuildService, CloudError, LogLine, LogLocation, LogPage, StackDescription,
    StackService, StackStatus,
};
use buildstack_config::Settings;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    fn write_definition(&self, file_name: &str, content: &str) {
        let dir = self.root.path().join(".buildstack");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file_name), content).unwrap();
    }

    pub fn write_project(&self, content: &str) {
        self.write_definition("project.yml", content);
    }

    #[allow(dead_code)]
    pub fn write_role(&self, content: &str) {
        self.write_definition("role.yml", content);
    }

    #[allow(dead_code)]
    pub fn write_schedule(&self, content: &str) {
        self.write_definition("schedule.yml", content);
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.path().join("out").join("codebuild.yml")
    }

    pub fn settings(&self) -> Settings {
        Settings {
            template_path: self.template_path(),
            poll_interval: Duration::from_secs(5),
            region: Some("ap-northeast-1".to_string()),
            ..Settings::default()
        }
    }
}

/// In-memory stack service
///
/// `describe_stack` replays `statuses` front to back and then keeps
/// returning the last one; with no statuses the stack does not exist.
/// `describe_error`, when set, is returned by the next lookup instead.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeStackService {
    pub deploy_error: Mutex<Option<CloudError>>,
    pub statuses: Mutex<VecDeque<StackStatus>>,
    pub describe_error: Mutex<Option<CloudError>>,
    pub deployed: Mutex<Vec<(String, PathBuf)>>,
    pub describe_calls: Mutex<usize>,
}

#[allow(dead_code)]
impl FakeStackService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: &[StackStatus]) -> Self {
        let service = Self::default();
        *service.statuses.lock().unwrap() = statuses.iter().cloned().collect();
        service
    }

    pub fn failing_with(error: CloudError) -> Self {
        let service = Self::default();
        *service.deploy_error.lock().unwrap() = Some(error);
        service
    }

    pub fn deploy_count(&self) -> usize {
        self.deployed.lock().unwrap().len()
    }

    pub fn describe_count(&self) -> usize {
        *self.describe_calls.lock().unwrap()
    }
}

#[async_trait]
impl StackService for FakeStackService {
    fn name(&self) -> &str {
        "fake"
    }

    async fn deploy_stack(
        &self,
        stack_name: &str,
        template_path: &Path,
    ) -> buildstack_cloud::Result<()> {
        if let Some(error) = self.deploy_error.lock().unwrap().take() {
            return Err(error);
        }
        self.deployed
            .lock()
            .unwrap()
            .push((stack_name.to_string(), template_path.to_path_buf()));
        Ok(())
    }

    async fn describe_stack(&self, stack_name: &str) -> buildstack_cloud::Result<StackDescription> {
        *self.describe_calls.lock().unwrap() += 1;
        if let Some(error) = self.describe_error.lock().unwrap().take() {
            return Err(error);
        }
        let mut statuses = self.statuses.lock().unwrap();
        let status = match statuses.len() {
            0 => {
                return Err(CloudError::Validation(format!(
                    "Stack with id {} does not exist",
                    stack_name
                )));
            }
            1 => statuses[0].clone(),
            _ => statuses.pop_front().unwrap(),
        };
        Ok(StackDescription::new(stack_name, status))
    }

    async fn region(&self) -> Option<String> {
        None
    }
}

/// In-memory build service serving pre-recorded log pages
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeBuildService {
    pub build_ids: Vec<String>,
    /// Status reported on each `build_info` call; the last one repeats
    pub build_statuses: Mutex<VecDeque<String>>,
    /// Pages keyed by the token that requests them (`None` = first page)
    pub pages: Vec<(Option<String>, LogPage)>,
    pub listed_projects: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeBuildService {
    pub fn page(lines: &[&str], next_token: &str) -> LogPage {
        LogPage {
            lines: lines
                .iter()
                .map(|message| LogLine {
                    timestamp: None,
                    message: message.to_string(),
                })
                .collect(),
            next_token: Some(next_token.to_string()),
        }
    }
}

#[async_trait]
impl BuildService for FakeBuildService {
    async fn list_build_ids(&self, project_name: &str) -> buildstack_cloud::Result<Vec<String>> {
        self.listed_projects
            .lock()
            .unwrap()
            .push(project_name.to_string());
        Ok(self.build_ids.clone())
    }

    async fn build_info(&self, build_id: &str) -> buildstack_cloud::Result<BuildInfo> {
        let mut statuses = self.build_statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses.front().cloned().unwrap_or_else(|| "SUCCEEDED".to_string())
        };
        Ok(BuildInfo {
            id: build_id.to_string(),
            status,
            log: Some(LogLocation {
                group_name: "/aws/codebuild/demo".to_string(),
                stream_name: build_id.to_string(),
            }),
        })
    }

    async fn log_events(
        &self,
        _log: &LogLocation,
        next_token: Option<&str>,
    ) -> buildstack_cloud::Result<LogPage> {
        let page = self
            .pages
            .iter()
            .find(|(token, _)| token.as_deref() == next_token)
            .map(|(_, page)| page.clone())
            .unwrap_or_else(|| LogPage {
                lines: Vec::new(),
                next_token: next_token.map(str::to_string),
            });
        Ok(page)
    }
}
