use crate::domain::deployment::{ContainerOrchestrator, DeployError};
use crate::infrastructure::command::{CommandRunner, CommandSpec, find_executable};
use crate::measure_time;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Which compose frontend the host provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeCommand {
    /// `docker compose` (v2 plugin)
    Plugin,
    /// standalone `docker-compose`
    Standalone,
}

impl ComposeCommand {
    fn base(&self) -> CommandSpec {
        match self {
            ComposeCommand::Plugin => CommandSpec::new("docker").arg("compose"),
            ComposeCommand::Standalone => CommandSpec::new("docker-compose"),
        }
    }
}

pub struct DockerComposeOrchestrator {
    runner: Arc<dyn CommandRunner>,
    project_dir: PathBuf,
    compose_file: PathBuf,
    compose: OnceCell<ComposeCommand>,
}

impl DockerComposeOrchestrator {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        project_dir: impl Into<PathBuf>,
        compose_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            project_dir: project_dir.into(),
            compose_file: compose_file.into(),
            compose: OnceCell::new(),
        }
    }

    /// Skips detection, for hosts where the frontend is known.
    pub fn with_compose_command(self, command: ComposeCommand) -> Self {
        Self {
            compose: OnceCell::new_with(Some(command)),
            ..self
        }
    }

    async fn detect_compose_command(&self) -> ComposeCommand {
        let plugin = self
            .runner
            .run(&CommandSpec::new("docker").args(["compose", "version"]))
            .await;

        match plugin {
            Ok(output) if output.success() => ComposeCommand::Plugin,
            _ if find_executable("docker-compose").is_some() => ComposeCommand::Standalone,
            // Let the real invocation report the failure
            _ => ComposeCommand::Plugin,
        }
    }

    async fn compose(&self, args: &[&str]) -> Result<(), DeployError> {
        let command = *self
            .compose
            .get_or_init(|| self.detect_compose_command())
            .await;
        debug!("Using compose frontend {:?}", command);

        let spec = command
            .base()
            .arg("-f")
            .arg(self.compose_file.display().to_string())
            .args(args.iter().copied())
            .current_dir(&self.project_dir);

        info!(">>> {}", spec);
        self.runner
            .run_checked(&spec)
            .await
            .map_err(DeployError::OrchestrationFailed)?;
        Ok(())
    }
}

#[async_trait]
impl ContainerOrchestrator for DockerComposeOrchestrator {
    async fn tear_down(&self) -> Result<(), DeployError> {
        info!("Stopping and removing existing containers...");
        self.compose(&["down", "--remove-orphans"]).await
    }

    async fn build(&self) -> Result<(), DeployError> {
        info!("Rebuilding image without cache...");
        measure_time!("compose_build", { self.compose(&["build", "--no-cache"]).await })
    }

    async fn start(&self) -> Result<(), DeployError> {
        info!("Starting containers in the background...");
        self.compose(&["up", "-d"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::command::testing::RecordingCommandRunner;

    fn orchestrator(runner: Arc<RecordingCommandRunner>) -> DockerComposeOrchestrator {
        DockerComposeOrchestrator::new(runner, "/srv/volcano", "/srv/volcano/docker-compose.yml")
    }

    #[tokio::test]
    async fn test_full_cycle_uses_plugin() {
        let runner = Arc::new(RecordingCommandRunner::new());
        let orchestrator = orchestrator(runner.clone());

        orchestrator.tear_down().await.unwrap();
        orchestrator.build().await.unwrap();
        orchestrator.start().await.unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "docker compose version",
                "docker compose -f /srv/volcano/docker-compose.yml down --remove-orphans",
                "docker compose -f /srv/volcano/docker-compose.yml build --no-cache",
                "docker compose -f /srv/volcano/docker-compose.yml up -d",
            ]
        );
    }

    #[tokio::test]
    async fn test_standalone_frontend() {
        let runner = Arc::new(RecordingCommandRunner::new());
        let orchestrator =
            orchestrator(runner.clone()).with_compose_command(ComposeCommand::Standalone);

        orchestrator.start().await.unwrap();
        assert_eq!(
            runner.calls(),
            vec!["docker-compose -f /srv/volcano/docker-compose.yml up -d"]
        );
    }

    #[tokio::test]
    async fn test_build_failure_carries_exit_code() {
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("docker compose -f /srv/volcano/docker-compose.yml build", 17, "");
        let orchestrator = orchestrator(runner).with_compose_command(ComposeCommand::Plugin);

        let err = orchestrator.build().await.unwrap_err();
        assert!(matches!(err, DeployError::OrchestrationFailed(_)));
        assert_eq!(err.exit_code(), 17);
    }
}
