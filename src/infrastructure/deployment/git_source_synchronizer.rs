use crate::domain::deployment::{DeployError, SourceSynchronizer, SyncOutcome};
use crate::infrastructure::command::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct GitSourceSynchronizer {
    runner: Arc<dyn CommandRunner>,
    project_dir: PathBuf,
    remote: String,
    branch: String,
}

impl GitSourceSynchronizer {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        project_dir: impl Into<PathBuf>,
        remote: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            project_dir: project_dir.into(),
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    fn git(&self) -> CommandSpec {
        CommandSpec::new("git")
            .env("GIT_TERMINAL_PROMPT", "0")
            .current_dir(&self.project_dir)
    }
}

#[async_trait]
impl SourceSynchronizer for GitSourceSynchronizer {
    async fn sync(&self) -> Result<SyncOutcome, DeployError> {
        if !self.project_dir.join(".git").exists() {
            info!("No git working copy in {}, skipping source sync", self.project_dir.display());
            return Ok(SyncOutcome::Skipped {
                reason: "not a git working copy".to_string(),
            });
        }

        // Remote and branch names go straight onto the git command line
        if self.remote.starts_with('-') || self.branch.starts_with('-') {
            return Err(DeployError::InvalidSourceRef(format!(
                "{}/{}",
                self.remote, self.branch
            )));
        }

        let remote_check = self
            .runner
            .run(&self.git().args(["remote", "get-url", self.remote.as_str()]))
            .await
            .map_err(DeployError::SourceSyncFailed)?;

        if !remote_check.success() {
            info!("Remote '{}' is not configured, skipping source sync", self.remote);
            return Ok(SyncOutcome::Skipped {
                reason: format!("remote '{}' not configured", self.remote),
            });
        }

        info!("Pulling latest changes from {}/{}...", self.remote, self.branch);
        let output = self
            .runner
            .run_checked(&self.git().args(["pull", self.remote.as_str(), self.branch.as_str()]))
            .await
            .map_err(DeployError::SourceSyncFailed)?;
        info!("Source updated: {}", output.stdout.trim());

        Ok(SyncOutcome::Updated {
            branch: self.branch.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::command::testing::RecordingCommandRunner;

    fn working_copy() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_skips_without_working_copy() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingCommandRunner::new());
        let sync = GitSourceSynchronizer::new(runner.clone(), dir.path(), "origin", "main");

        let outcome = sync.sync().await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Skipped { .. }));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_skips_without_remote() {
        let dir = working_copy();
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("git remote get-url", 2, "");
        let sync = GitSourceSynchronizer::new(runner.clone(), dir.path(), "origin", "main");

        let outcome = sync.sync().await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Skipped { .. }));
        assert_eq!(runner.calls(), vec!["git remote get-url origin"]);
    }

    #[tokio::test]
    async fn test_pulls_branch() {
        let dir = working_copy();
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("git remote get-url", 0, "git@example.org:volcano/dashboard.git\n");
        let sync = GitSourceSynchronizer::new(runner.clone(), dir.path(), "origin", "main");

        let outcome = sync.sync().await.unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Updated {
                branch: "main".to_string()
            }
        );
        assert_eq!(
            runner.calls(),
            vec!["git remote get-url origin", "git pull origin main"]
        );
        assert!(runner.specs().iter().all(|spec| spec.current_dir.as_deref() == Some(dir.path())));
    }

    #[tokio::test]
    async fn test_merge_failure_is_fatal() {
        let dir = working_copy();
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("git remote get-url", 0, "origin-url\n");
        runner.respond("git pull", 1, "");
        let sync = GitSourceSynchronizer::new(runner, dir.path(), "origin", "main");

        let err = sync.sync().await.unwrap_err();
        assert!(matches!(err, DeployError::SourceSyncFailed(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
