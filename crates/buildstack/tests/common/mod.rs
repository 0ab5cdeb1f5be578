use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
    home: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        Self { root, home }
    }

    pub fn write_project(&self, content: &str) {
        let dir = self.root.path().join(".buildstack");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("project.yml"), content).unwrap();
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.path().join("out").join("codebuild.yml")
    }

    /// `buildstack` isolated from the caller's settings and AWS configuration
    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("buildstack").unwrap();
        cmd.current_dir(self.root.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env("BUILDSTACK_PROJECT_ROOT", self.root.path())
            .env("BUILDSTACK_TEMPLATE_PATH", self.template_path())
            .env_remove("BUILDSTACK_ENV_EXTRA")
            .env_remove("BUILDSTACK_MAX_WAIT")
            .env_remove("BUILDSTACK_POLL_INTERVAL")
            .env_remove("RUST_LOG");
        cmd
    }
}
