use crate::domain::environment::{DeploymentConfigLoader, EnvironmentError, RuntimeCapabilities};
use crate::domain::provisioning::{
    ReverseProxyManager, ScheduledTask, ScriptAsset, ScriptInstaller, ServiceSupervisor,
    SupervisedService, TaskScheduler,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfigStatus {
    Missing,
    Invalid(String),
    Incomplete(Vec<String>),
    Ready { ai_integration: bool },
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureStatus {
    pub nginx_site: bool,
    pub backup_task: bool,
    pub backup_script: bool,
    pub monitor_service: bool,
    pub monitor_script: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentStatus {
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub capabilities: RuntimeCapabilities,
    pub config_path: PathBuf,
    pub config: ConfigStatus,
    pub features: FeatureStatus,
}

/// デプロイ状態を表示するユースケース
pub struct ShowDeploymentInfoUseCase {
    config_loader: Arc<dyn DeploymentConfigLoader>,
    proxy: Arc<dyn ReverseProxyManager>,
    scheduler: Arc<dyn TaskScheduler>,
    supervisor: Arc<dyn ServiceSupervisor>,
    scripts: Arc<dyn ScriptInstaller>,
}

impl ShowDeploymentInfoUseCase {
    pub fn new(
        config_loader: Arc<dyn DeploymentConfigLoader>,
        proxy: Arc<dyn ReverseProxyManager>,
        scheduler: Arc<dyn TaskScheduler>,
        supervisor: Arc<dyn ServiceSupervisor>,
        scripts: Arc<dyn ScriptInstaller>,
    ) -> Self {
        Self {
            config_loader,
            proxy,
            scheduler,
            supervisor,
            scripts,
        }
    }

    /// Read-only snapshot; never fails on a broken configuration.
    pub fn collect(&self, capabilities: &RuntimeCapabilities) -> DeploymentStatus {
        let config = match self.config_loader.load() {
            Ok(config) => {
                let missing = config.missing_required_keys();
                if missing.is_empty() {
                    ConfigStatus::Ready {
                        ai_integration: config.has_ai_integration(),
                    }
                } else {
                    ConfigStatus::Incomplete(missing.into_iter().map(String::from).collect())
                }
            }
            Err(EnvironmentError::ConfigMissing(_)) => ConfigStatus::Missing,
            Err(e) => ConfigStatus::Invalid(e.to_string()),
        };

        DeploymentStatus {
            version: env!("CARGO_PKG_VERSION"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
            capabilities: *capabilities,
            config_path: self.config_loader.location(),
            config,
            features: FeatureStatus {
                nginx_site: self.proxy.is_configured(),
                backup_task: self.scheduler.is_registered(ScheduledTask::BACKUP_TASK_NAME),
                backup_script: self.scripts.installed_path(ScriptAsset::Backup).is_file(),
                monitor_service: self.supervisor.is_installed(SupervisedService::MONITOR_NAME),
                monitor_script: self.scripts.installed_path(ScriptAsset::Monitor).is_file(),
            },
        }
    }

    pub fn execute(
        &self,
        capabilities: &RuntimeCapabilities,
        verbose: bool,
    ) -> Result<(), serde_json::Error> {
        let status = self.collect(capabilities);

        println!("🌋 Volcano Dashboard Deployment");
        println!("===============================");
        println!("   Version: {} (built {})", status.version, status.build_timestamp);

        println!("\n🖥️  Runtime:");
        println!("   Environment: {}", status.capabilities.label());
        println!("   Root: {}", yes_no(status.capabilities.has_root));
        println!(
            "   Container engine: {}",
            yes_no(status.capabilities.can_manage_containers)
        );
        println!("   systemd: {}", yes_no(status.capabilities.can_manage_systemd));

        println!("\n📋 Configuration ({}):", status.config_path.display());
        match &status.config {
            ConfigStatus::Missing => println!("   ❌ Not found"),
            ConfigStatus::Invalid(reason) => println!("   ❌ Unreadable: {}", reason),
            ConfigStatus::Incomplete(keys) => {
                println!("   ⚠️  Missing required values: {}", keys.join(", "))
            }
            ConfigStatus::Ready { ai_integration } => {
                println!("   ✅ Complete");
                println!(
                    "   AI integration: {}",
                    if *ai_integration { "enabled" } else { "disabled" }
                );
            }
        }

        println!("\n⚙️  Production Features:");
        println!("   Reverse proxy + TLS: {}", installed(status.features.nginx_site));
        println!(
            "   Daily backups: {}",
            installed(status.features.backup_task && status.features.backup_script)
        );
        println!(
            "   Monitoring: {}",
            installed(status.features.monitor_service && status.features.monitor_script)
        );

        if verbose {
            println!("\n🔍 Details:");
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "✅ Yes" } else { "❌ No" }
}

fn installed(value: bool) -> &'static str {
    if value { "✅ Installed" } else { "❌ Not installed" }
}
