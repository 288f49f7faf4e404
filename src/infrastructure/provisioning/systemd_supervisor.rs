use super::managed_file::write_managed_file;
use crate::domain::provisioning::{
    EnsureOutcome, ProvisionError, ServiceSupervisor, SupervisedService,
};
use crate::infrastructure::command::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct SystemdSupervisor {
    runner: Arc<dyn CommandRunner>,
    unit_dir: PathBuf,
}

impl SystemdSupervisor {
    pub fn new(runner: Arc<dyn CommandRunner>, unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            unit_dir: unit_dir.into(),
        }
    }

    async fn systemctl(&self, args: &[&str]) -> Result<(), ProvisionError> {
        self.runner
            .run_checked(&CommandSpec::new("systemctl").args(args.iter().copied()))
            .await
            .map_err(ProvisionError::ServiceFailed)?;
        Ok(())
    }
}

#[async_trait]
impl ServiceSupervisor for SystemdSupervisor {
    async fn ensure_running(
        &self,
        service: &SupervisedService,
    ) -> Result<EnsureOutcome, ProvisionError> {
        let unit_name = service.unit_name();
        let unit_path = self.unit_dir.join(&unit_name);

        info!("Installing systemd unit {}...", unit_name);
        let outcome = write_managed_file(&unit_path, &service.render_unit(), 0o644)?;

        match outcome {
            EnsureOutcome::Created => {
                self.systemctl(&["daemon-reload"]).await?;
                self.systemctl(&["enable", "--now", &unit_name]).await?;
            }
            EnsureOutcome::Updated => {
                // A running unit keeps the old definition until restarted
                self.systemctl(&["daemon-reload"]).await?;
                self.systemctl(&["enable", &unit_name]).await?;
                self.systemctl(&["restart", &unit_name]).await?;
            }
            EnsureOutcome::Unchanged => {
                self.systemctl(&["enable", "--now", &unit_name]).await?;
            }
        }

        info!("Service {} {} and running", unit_name, outcome);
        Ok(outcome)
    }

    fn is_installed(&self, service_name: &str) -> bool {
        self.unit_dir
            .join(format!("{service_name}.service"))
            .is_file()
    }
}
