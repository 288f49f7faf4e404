use super::entities::{ContainerState, LockLease, ProbeOutcome, SyncOutcome};
use crate::domain::environment::EnvironmentError;
use crate::domain::shared::CommandError;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("Container engine is not available on this host and no sandbox marker was found")]
    ContainerEngineUnavailable,

    #[error("Another deployment is already running (lock held at {})", .0.display())]
    LockHeld(PathBuf),

    #[error("Refusing to sync suspicious remote/branch '{0}'")]
    InvalidSourceRef(String),

    #[error("Source sync failed: {0}")]
    SourceSyncFailed(#[source] CommandError),

    #[error("Container orchestration failed: {0}")]
    OrchestrationFailed(#[source] CommandError),

    #[error("Invalid container state transition: {from} -> {to}")]
    InvalidTransition {
        from: ContainerState,
        to: ContainerState,
    },

    #[error("Failed to harden permissions on {}: {source}", .path.display())]
    PermissionHardeningFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Health check failed for {url} after {attempts} attempt(s): last result {last}")]
    HealthCheckFailed {
        url: String,
        attempts: u32,
        last: ProbeOutcome,
    },

    #[error("File system error: {0}")]
    FileSystemError(#[from] std::io::Error),
}

impl DeployError {
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::SourceSyncFailed(e) | DeployError::OrchestrationFailed(e) => e.exit_code(),
            _ => 1,
        }
    }

    pub fn is_health_failure(&self) -> bool {
        matches!(self, DeployError::HealthCheckFailed { .. })
    }
}

#[async_trait]
pub trait SourceSynchronizer: Send + Sync {
    /// Pulls the designated branch when a working copy with a configured
    /// remote exists; skips otherwise.
    async fn sync(&self) -> Result<SyncOutcome, DeployError>;
}

#[async_trait]
pub trait ContainerOrchestrator: Send + Sync {
    async fn tear_down(&self) -> Result<(), DeployError>;
    /// Rebuilds the image without the layer cache.
    async fn build(&self) -> Result<(), DeployError>;
    /// Starts the stack detached.
    async fn start(&self) -> Result<(), DeployError>;
}

pub trait PermissionHardener: Send + Sync {
    /// Returns the roots that were hardened.
    fn harden(&self) -> Result<Vec<PathBuf>, DeployError>;
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn url(&self) -> String;
    async fn probe(&self) -> ProbeOutcome;
}

pub trait DeploymentLock: Send + Sync {
    /// Fails fast with `LockHeld` instead of waiting.
    fn acquire(&self) -> Result<LockLease, DeployError>;
}
