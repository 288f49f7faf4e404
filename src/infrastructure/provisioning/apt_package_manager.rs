use crate::domain::provisioning::{PackageManager, ProvisionError};
use crate::infrastructure::command::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct AptPackageManager {
    runner: Arc<dyn CommandRunner>,
}

impl AptPackageManager {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn apt_get(&self) -> CommandSpec {
        CommandSpec::new("apt-get").env("DEBIAN_FRONTEND", "noninteractive")
    }
}

#[async_trait]
impl PackageManager for AptPackageManager {
    async fn is_installed(&self, package: &str) -> Result<bool, ProvisionError> {
        let output = self
            .runner
            .run(&CommandSpec::new("dpkg-query").args(["-W", "-f=${Status}", package]))
            .await?;

        Ok(output.success() && output.stdout.contains("install ok installed"))
    }

    async fn ensure_installed(&self, packages: &[&str]) -> Result<Vec<String>, ProvisionError> {
        let mut missing = Vec::new();
        for package in packages {
            if self.is_installed(package).await? {
                info!("Package {} already installed", package);
            } else {
                missing.push(package.to_string());
            }
        }

        if missing.is_empty() {
            return Ok(missing);
        }

        let install_failed = |source| ProvisionError::PackageInstallFailed {
            packages: missing.clone(),
            source,
        };

        info!("Installing packages: {}", missing.join(" "));
        self.runner
            .run_checked(&self.apt_get().args(["update", "-qq"]))
            .await
            .map_err(install_failed)?;
        self.runner
            .run_checked(
                &self
                    .apt_get()
                    .args(["install", "-y", "-qq", "--no-install-recommends"])
                    .args(missing.iter().cloned()),
            )
            .await
            .map_err(install_failed)?;

        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::command::testing::RecordingCommandRunner;

    #[tokio::test]
    async fn test_installs_only_missing_packages() {
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("dpkg-query -W -f=${Status} nginx", 0, "install ok installed");
        runner.respond("dpkg-query -W -f=${Status} certbot", 1, "");
        let apt = AptPackageManager::new(runner.clone());

        let installed = apt.ensure_installed(&["nginx", "certbot"]).await.unwrap();
        assert_eq!(installed, vec!["certbot".to_string()]);

        let calls = runner.calls();
        assert_eq!(
            &calls[2..],
            &[
                "apt-get update -qq".to_string(),
                "apt-get install -y -qq --no-install-recommends certbot".to_string(),
            ]
        );
        let install = runner.specs().pop().unwrap();
        assert!(install
            .envs
            .contains(&("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())));
    }

    #[tokio::test]
    async fn test_nothing_to_install() {
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("dpkg-query", 0, "install ok installed");
        let apt = AptPackageManager::new(runner.clone());

        assert!(apt.ensure_installed(&["sysstat", "mailutils"]).await.unwrap().is_empty());
        assert!(runner.calls().iter().all(|call| call.starts_with("dpkg-query")));
    }

    #[tokio::test]
    async fn test_install_failure_propagates() {
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("dpkg-query", 1, "");
        runner.respond("apt-get install", 100, "");
        let apt = AptPackageManager::new(runner);

        let err = apt.ensure_installed(&["nginx"]).await.unwrap_err();
        assert!(matches!(err, ProvisionError::PackageInstallFailed { .. }));
        assert_eq!(err.exit_code(), 100);
    }
}
