use super::entities::{DeploymentConfig, RuntimeCapabilities};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Deployment configuration not found at {}. Create it with the database and SMS credentials first.", .0.display())]
    ConfigMissing(PathBuf),

    #[error("Deployment configuration is missing required values: {}", .0.join(", "))]
    ConfigIncomplete(Vec<String>),

    #[error("Invalid line {line} in {}: {reason}", .path.display())]
    ConfigParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("File system error: {0}")]
    FileSystemError(#[from] std::io::Error),
}

pub trait CapabilityProbe: Send + Sync {
    fn probe(&self) -> RuntimeCapabilities;
}

pub trait DeploymentConfigLoader: Send + Sync {
    fn location(&self) -> PathBuf;
    fn exists(&self) -> bool;
    fn load(&self) -> Result<DeploymentConfig, EnvironmentError>;
}
