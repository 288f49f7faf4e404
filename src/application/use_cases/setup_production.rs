use super::restart_stack::RestartStackUseCase;
use super::validate_environment::ValidateEnvironmentUseCase;
use crate::config::DeployConfig;
use crate::domain::deployment::{ContainerOrchestrator, DeploymentLock};
use crate::domain::environment::RuntimeCapabilities;
use crate::domain::provisioning::{
    CertificateProvisioner, Feature, FeatureSelection, InstalledFeature, PackageManager,
    ProvisionError, ProvisionReport, ReverseProxyManager, ScheduledTask, ScriptAsset,
    ScriptInstaller, ServiceSupervisor, SupervisedService, TaskScheduler,
};
use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const NGINX_PACKAGES: [&str; 1] = ["nginx"];
const CERTBOT_PACKAGES: [&str; 2] = ["certbot", "python3-certbot-nginx"];
const MONITORING_PACKAGES: [&str; 3] = ["sysstat", "mailutils", "curl"];

const BACKUP_DIR_MODE: u32 = 0o750;
const BACKUP_RETENTION_DAYS: u32 = 7;
const MONITOR_INTERVAL_SECS: u32 = 300;
const DISK_ALERT_PERCENT: u32 = 90;
const MEMORY_ALERT_PERCENT: u32 = 90;

/// Host adapters used to install production features.
pub struct ProductionInstallers {
    pub packages: Arc<dyn PackageManager>,
    pub proxy: Arc<dyn ReverseProxyManager>,
    pub certificates: Arc<dyn CertificateProvisioner>,
    pub scheduler: Arc<dyn TaskScheduler>,
    pub supervisor: Arc<dyn ServiceSupervisor>,
    pub scripts: Arc<dyn ScriptInstaller>,
}

/// 本番機能（TLS、バックアップ、監視）をインストールするユースケース
///
/// 各機能は冪等にインストールされ、同じフラグで再実行しても
/// 同じファイル構成になります。
pub struct SetupProductionUseCase {
    installers: ProductionInstallers,
    lock: Arc<dyn DeploymentLock>,
    restart: RestartStackUseCase,
    config: DeployConfig,
}

impl SetupProductionUseCase {
    pub fn new(
        installers: ProductionInstallers,
        lock: Arc<dyn DeploymentLock>,
        orchestrator: Arc<dyn ContainerOrchestrator>,
        config: DeployConfig,
    ) -> Self {
        Self {
            installers,
            lock,
            restart: RestartStackUseCase::new(orchestrator),
            config,
        }
    }

    pub async fn execute(
        &self,
        capabilities: &RuntimeCapabilities,
        selection: &FeatureSelection,
        run_id: Uuid,
    ) -> Result<ProvisionReport, ProvisionError> {
        info!("Starting production setup...");
        ValidateEnvironmentUseCase::check_privileges(capabilities)?;
        Self::check_prerequisites(capabilities, selection)?;

        let mut installed = Vec::new();
        for feature in selection.requested() {
            info!("Installing {}...", feature);
            let detail = match feature {
                Feature::Nginx => self.install_nginx(selection).await?,
                Feature::Backups => self.install_backups()?,
                Feature::Monitoring => self.install_monitoring(selection).await?,
            };
            info!("✅ {}: {}", feature, detail);
            installed.push(InstalledFeature { feature, detail });
        }

        let stack_rebuilt = if capabilities.can_manage_containers {
            info!("Rebuilding container stack...");
            let _lease = self.lock.acquire()?;
            self.restart.execute(capabilities).await?;
            true
        } else if capabilities.sandbox {
            info!("Sandbox environment: container rebuild skipped");
            false
        } else {
            warn!("No container engine found: container rebuild skipped");
            false
        };

        info!("Production setup completed successfully!");
        Ok(ProvisionReport {
            run_id,
            installed,
            stack_rebuilt,
        })
    }

    /// Fails before any package is installed when a requested feature
    /// cannot run on this host.
    pub fn check_prerequisites(
        capabilities: &RuntimeCapabilities,
        selection: &FeatureSelection,
    ) -> Result<(), ProvisionError> {
        if selection.includes(Feature::Monitoring) && !capabilities.can_manage_systemd {
            return Err(ProvisionError::ServiceManagerUnavailable(Feature::Monitoring));
        }
        Ok(())
    }

    async fn install_nginx(&self, selection: &FeatureSelection) -> Result<String, ProvisionError> {
        let tls = selection.tls_target().ok_or_else(|| {
            ProvisionError::Usage("--nginx requires both --domain and --email".to_string())
        })?;

        self.installers
            .packages
            .ensure_installed(&NGINX_PACKAGES)
            .await?;
        let site = self
            .installers
            .proxy
            .ensure_site(&tls.domain, self.config.port)
            .await?;

        self.installers
            .packages
            .ensure_installed(&CERTBOT_PACKAGES)
            .await?;
        self.installers
            .certificates
            .provision(&tls.domain, &tls.email)
            .await?;
        self.installers.proxy.reload().await?;

        Ok(format!(
            "https://{} -> 127.0.0.1:{} (site {})",
            tls.domain, self.config.port, site
        ))
    }

    fn install_backups(&self) -> Result<String, ProvisionError> {
        let vars = BTreeMap::from([
            ("DATA_DIR", self.config.data_dir.display().to_string()),
            (
                "DATABASE_FILE",
                self.config.database_file().display().to_string(),
            ),
            ("BACKUP_DIR", self.config.backup_dir.display().to_string()),
            ("RETENTION_DAYS", BACKUP_RETENTION_DAYS.to_string()),
        ]);
        let (script, _) = self.installers.scripts.install(ScriptAsset::Backup, &vars)?;

        ensure_directory(&self.config.backup_dir, BACKUP_DIR_MODE)?;

        let task = ScheduledTask::daily_backup(&script, &self.config.backup_log_file());
        self.installers.scheduler.ensure_task(&task)?;

        Ok(format!(
            "{} daily at 02:00 into {}",
            script.display(),
            self.config.backup_dir.display()
        ))
    }

    async fn install_monitoring(
        &self,
        selection: &FeatureSelection,
    ) -> Result<String, ProvisionError> {
        self.installers
            .packages
            .ensure_installed(&MONITORING_PACKAGES)
            .await?;

        let alert_email = selection.alert_email().unwrap_or_default();
        if alert_email.is_empty() {
            warn!("No --email given: monitor alerts are only written to the log");
        }

        let vars = BTreeMap::from([
            ("PORT", self.config.port.to_string()),
            ("ALERT_EMAIL", alert_email.to_string()),
            ("INTERVAL_SECS", MONITOR_INTERVAL_SECS.to_string()),
            ("DISK_THRESHOLD", DISK_ALERT_PERCENT.to_string()),
            ("MEMORY_THRESHOLD", MEMORY_ALERT_PERCENT.to_string()),
            ("PROJECT_DIR", self.config.project_dir.display().to_string()),
            (
                "LOG_FILE",
                self.config.monitor_log_file().display().to_string(),
            ),
        ]);
        let (script, _) = self.installers.scripts.install(ScriptAsset::Monitor, &vars)?;

        let service = SupervisedService::monitor(&script);
        self.installers.supervisor.ensure_running(&service).await?;

        Ok(format!("{} running {}", service.unit_name(), script.display()))
    }
}

fn ensure_directory(path: &Path, mode: u32) -> Result<(), ProvisionError> {
    let write_failed = |source| ProvisionError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(path).map_err(write_failed)?;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(write_failed)?;
    Ok(())
}
