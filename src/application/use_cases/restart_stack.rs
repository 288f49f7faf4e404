use crate::domain::deployment::{ContainerOrchestrator, ContainerState, DeployError};
use crate::domain::environment::RuntimeCapabilities;
use std::sync::Arc;
use tracing::info;

/// コンテナスタックを再構築して起動するユースケース
pub struct RestartStackUseCase {
    orchestrator: Arc<dyn ContainerOrchestrator>,
}

impl RestartStackUseCase {
    pub fn new(orchestrator: Arc<dyn ContainerOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Outside the sandbox a container engine is a hard precondition.
    pub fn check_available(capabilities: &RuntimeCapabilities) -> Result<(), DeployError> {
        if !capabilities.sandbox && !capabilities.can_manage_containers {
            return Err(DeployError::ContainerEngineUnavailable);
        }
        Ok(())
    }

    /// Tears down, rebuilds without cache and starts the stack.
    ///
    /// Returns `None` when the sandbox supervisor owns the runtime and
    /// nothing was done.
    pub async fn execute(
        &self,
        capabilities: &RuntimeCapabilities,
    ) -> Result<Option<ContainerState>, DeployError> {
        if capabilities.sandbox {
            info!("Sandbox environment: container orchestration skipped, the host supervisor runs the dashboard");
            return Ok(None);
        }
        Self::check_available(capabilities)?;

        info!("Stopping existing containers...");
        self.orchestrator.tear_down().await?;
        let mut state = ContainerState::NotRunning;

        info!("Building image (no cache)...");
        self.orchestrator.build().await?;
        state = advance(state, ContainerState::Built)?;

        info!("Starting containers...");
        self.orchestrator.start().await?;
        state = advance(state, ContainerState::Running)?;

        info!("Container stack is {}", state);
        Ok(Some(state))
    }
}

fn advance(from: ContainerState, to: ContainerState) -> Result<ContainerState, DeployError> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(DeployError::InvalidTransition { from, to })
    }
}
