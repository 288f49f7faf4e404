use super::restart_stack::RestartStackUseCase;
use super::validate_environment::ValidateEnvironmentUseCase;
use super::verify_health::VerifyHealthUseCase;
use crate::domain::deployment::{
    ContainerOrchestrator, DeployError, DeploymentLock, DeploymentReport, HealthCheckSettings,
    HealthProbe, PermissionHardener, SourceSynchronizer,
};
use crate::domain::environment::{DeploymentConfigLoader, RuntimeCapabilities};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// ベースデプロイを実行するユースケース
///
/// 検証 → ロック取得 → ソース同期 → コンテナ再構築 → パーミッション強化 →
/// ヘルスチェックの順に実行します。ロックはパーミッション強化まで保持します。
pub struct DeployApplicationUseCase {
    validator: ValidateEnvironmentUseCase,
    lock: Arc<dyn DeploymentLock>,
    synchronizer: Arc<dyn SourceSynchronizer>,
    restart: RestartStackUseCase,
    hardener: Arc<dyn PermissionHardener>,
    health: VerifyHealthUseCase,
}

impl DeployApplicationUseCase {
    pub fn new(
        config_loader: Arc<dyn DeploymentConfigLoader>,
        lock: Arc<dyn DeploymentLock>,
        synchronizer: Arc<dyn SourceSynchronizer>,
        orchestrator: Arc<dyn ContainerOrchestrator>,
        hardener: Arc<dyn PermissionHardener>,
        probe: Arc<dyn HealthProbe>,
        health_settings: HealthCheckSettings,
    ) -> Self {
        Self {
            validator: ValidateEnvironmentUseCase::new(config_loader),
            lock,
            synchronizer,
            restart: RestartStackUseCase::new(orchestrator),
            hardener,
            health: VerifyHealthUseCase::new(probe, health_settings),
        }
    }

    pub async fn execute(
        &self,
        capabilities: &RuntimeCapabilities,
        run_id: Uuid,
    ) -> Result<DeploymentReport, DeployError> {
        info!("Starting deployment ({})...", capabilities.label());

        self.validator.execute(capabilities)?;
        RestartStackUseCase::check_available(capabilities)?;

        let lease = self.lock.acquire()?;

        let sync = self.synchronizer.sync().await?;
        let container_state = self.restart.execute(capabilities).await?;

        info!("Hardening data and log permissions...");
        let hardened_paths = self.hardener.harden()?;

        drop(lease);

        let health = self.health.execute(capabilities).await?;

        info!("Deployment completed successfully!");
        Ok(DeploymentReport {
            run_id,
            capabilities: *capabilities,
            sync,
            container_state,
            hardened_paths,
            health,
        })
    }
}
