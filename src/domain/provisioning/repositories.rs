use super::entities::{EnsureOutcome, Feature, ScheduledTask, ScriptAsset, SupervisedService};
use crate::domain::deployment::DeployError;
use crate::domain::environment::EnvironmentError;
use crate::domain::shared::CommandError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid domain name: '{0}'")]
    InvalidDomain(String),

    #[error("Invalid contact email: '{0}'")]
    InvalidEmail(String),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("Failed to install packages {packages:?}: {source}")]
    PackageInstallFailed {
        packages: Vec<String>,
        #[source]
        source: CommandError,
    },

    #[error("{0} requires systemd, which is not running on this host")]
    ServiceManagerUnavailable(Feature),

    #[error("Reverse proxy configuration failed: {0}")]
    ProxyConfigurationFailed(String),

    #[error("Certificate provisioning failed for {domain}: {source}")]
    CertificateFailed {
        domain: String,
        #[source]
        source: CommandError,
    },

    #[error("Service manager operation failed: {0}")]
    ServiceFailed(#[source] CommandError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Embedded asset not found: {0}")]
    AssetMissing(String),

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stack rebuild failed: {0}")]
    Rebuild(#[from] DeployError),

    #[error("File system error: {0}")]
    FileSystemError(#[from] std::io::Error),
}

impl ProvisionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::PackageInstallFailed { source, .. }
            | ProvisionError::CertificateFailed { source, .. }
            | ProvisionError::ServiceFailed(source)
            | ProvisionError::Command(source) => source.exit_code(),
            ProvisionError::Rebuild(e) => e.exit_code(),
            _ => 1,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ProvisionError::Usage(_)
                | ProvisionError::InvalidDomain(_)
                | ProvisionError::InvalidEmail(_)
        )
    }
}

#[async_trait]
pub trait PackageManager: Send + Sync {
    async fn is_installed(&self, package: &str) -> Result<bool, ProvisionError>;
    /// Installs only the packages that are missing; returns what was installed.
    async fn ensure_installed(&self, packages: &[&str]) -> Result<Vec<String>, ProvisionError>;
}

#[async_trait]
pub trait ReverseProxyManager: Send + Sync {
    /// Writes and enables the site for `domain`, proxying to the local port.
    async fn ensure_site(&self, domain: &str, upstream_port: u16)
    -> Result<EnsureOutcome, ProvisionError>;
    async fn reload(&self) -> Result<(), ProvisionError>;
    fn is_configured(&self) -> bool;
}

#[async_trait]
pub trait CertificateProvisioner: Send + Sync {
    async fn provision(&self, domain: &str, email: &str) -> Result<(), ProvisionError>;
}

pub trait TaskScheduler: Send + Sync {
    fn ensure_task(&self, task: &ScheduledTask) -> Result<EnsureOutcome, ProvisionError>;
    fn is_registered(&self, task_name: &str) -> bool;
}

#[async_trait]
pub trait ServiceSupervisor: Send + Sync {
    /// Writes the unit, enables it at boot and starts it now.
    async fn ensure_running(
        &self,
        service: &SupervisedService,
    ) -> Result<EnsureOutcome, ProvisionError>;
    fn is_installed(&self, service_name: &str) -> bool;
}

pub trait ScriptInstaller: Send + Sync {
    /// Renders the embedded script with `vars` and installs it executable.
    fn install(
        &self,
        script: ScriptAsset,
        vars: &BTreeMap<&str, String>,
    ) -> Result<(PathBuf, EnsureOutcome), ProvisionError>;
    fn installed_path(&self, script: ScriptAsset) -> PathBuf;
}
