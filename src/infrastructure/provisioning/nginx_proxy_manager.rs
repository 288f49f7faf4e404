use super::managed_file::write_managed_file;
use crate::domain::provisioning::{
    EnsureOutcome, ProvisionError, ReverseProxyManager, validate_domain,
};
use crate::infrastructure::assets::{NGINX_SITE_TEMPLATE, render_asset};
use crate::infrastructure::command::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const SITE_NAME: &str = "volcano-dashboard";

pub struct NginxProxyManager {
    runner: Arc<dyn CommandRunner>,
    base_path: PathBuf,
}

impl NginxProxyManager {
    pub fn new(runner: Arc<dyn CommandRunner>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            base_path: base_path.into(),
        }
    }

    fn available_path(&self) -> PathBuf {
        self.base_path.join("sites-available").join(SITE_NAME)
    }

    fn enabled_path(&self) -> PathBuf {
        self.base_path.join("sites-enabled").join(SITE_NAME)
    }

    async fn test_config(&self) -> Result<(), ProvisionError> {
        let check = self.runner.run(&CommandSpec::new("nginx").arg("-t")).await?;
        if !check.success() {
            return Err(ProvisionError::ProxyConfigurationFailed(format!(
                "nginx -t rejected the configuration: {}",
                check.stderr.trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ReverseProxyManager for NginxProxyManager {
    async fn ensure_site(
        &self,
        domain: &str,
        upstream_port: u16,
    ) -> Result<EnsureOutcome, ProvisionError> {
        validate_domain(domain)?;

        let vars = BTreeMap::from([
            ("DOMAIN", domain.to_string()),
            ("PORT", upstream_port.to_string()),
        ]);
        let site = render_asset(NGINX_SITE_TEMPLATE, &vars)?;

        let config_path = self.available_path();
        let outcome = write_managed_file(&config_path, &site, 0o644)?;
        info!("Proxy site {} {}", config_path.display(), outcome);

        let enabled_link = self.enabled_path();
        if enabled_link.symlink_metadata().is_err() {
            if let Some(parent) = enabled_link.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::symlink(&config_path, &enabled_link).await?;
            info!("Enabled proxy site via {}", enabled_link.display());
        }

        self.test_config().await?;
        Ok(outcome)
    }

    async fn reload(&self) -> Result<(), ProvisionError> {
        self.test_config().await?;
        self.runner
            .run_checked(&CommandSpec::new("systemctl").args(["reload", "nginx"]))
            .await
            .map_err(ProvisionError::ServiceFailed)?;
        info!("Reloaded nginx");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.enabled_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::command::testing::RecordingCommandRunner;

    #[tokio::test]
    async fn test_ensure_site_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingCommandRunner::new());
        let nginx = NginxProxyManager::new(runner.clone(), dir.path());

        let first = nginx.ensure_site("volcano.example.org", 8501).await.unwrap();
        let second = nginx.ensure_site("volcano.example.org", 8501).await.unwrap();
        assert_eq!(first, EnsureOutcome::Created);
        assert_eq!(second, EnsureOutcome::Unchanged);
        assert!(nginx.is_configured());

        let site = std::fs::read_to_string(dir.path().join("sites-available/volcano-dashboard"))
            .unwrap();
        assert!(site.contains("server_name volcano.example.org;"));
        let link = std::fs::read_link(dir.path().join("sites-enabled/volcano-dashboard")).unwrap();
        assert_eq!(link, dir.path().join("sites-available/volcano-dashboard"));
        assert_eq!(runner.calls(), vec!["nginx -t", "nginx -t"]);
    }

    #[tokio::test]
    async fn test_rejected_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("nginx -t", 1, "");
        let nginx = NginxProxyManager::new(runner, dir.path());

        let err = nginx.ensure_site("volcano.example.org", 8501).await.unwrap_err();
        assert!(matches!(err, ProvisionError::ProxyConfigurationFailed(_)));
    }

    #[tokio::test]
    async fn test_reload() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingCommandRunner::new());
        let nginx = NginxProxyManager::new(runner.clone(), dir.path());

        nginx.reload().await.unwrap();
        assert_eq!(runner.calls(), vec!["nginx -t", "systemctl reload nginx"]);
    }
}
