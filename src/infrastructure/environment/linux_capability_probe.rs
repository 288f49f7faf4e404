use crate::domain::environment::{CapabilityProbe, RuntimeCapabilities};
use crate::infrastructure::command::find_executable;
use nix::unistd::Uid;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SANDBOX_MARKER_FILE: &str = ".replit";
const SANDBOX_MARKER_ENV: &str = "REPL_ID";
const SYSTEMD_RUNTIME_DIR: &str = "/run/systemd/system";

pub struct LinuxCapabilityProbe {
    project_dir: PathBuf,
    sandbox_override: Option<bool>,
}

impl LinuxCapabilityProbe {
    pub fn new(project_dir: impl Into<PathBuf>, sandbox_override: Option<bool>) -> Self {
        Self {
            project_dir: project_dir.into(),
            sandbox_override,
        }
    }

    fn detect_sandbox(&self) -> bool {
        if let Some(forced) = self.sandbox_override {
            debug!("Sandbox mode forced to {} by VOLCANO_SANDBOX", forced);
            return forced;
        }

        let marker = self.project_dir.join(SANDBOX_MARKER_FILE);
        if marker.exists() {
            debug!("Sandbox marker found at {}", marker.display());
            return true;
        }

        std::env::var_os(SANDBOX_MARKER_ENV).is_some()
    }
}

impl CapabilityProbe for LinuxCapabilityProbe {
    fn probe(&self) -> RuntimeCapabilities {
        let sandbox = self.detect_sandbox();
        let has_root = Uid::effective().is_root();
        let can_manage_containers = !sandbox && find_executable("docker").is_some();
        let can_manage_systemd = Path::new(SYSTEMD_RUNTIME_DIR).is_dir();

        let capabilities = RuntimeCapabilities {
            sandbox,
            has_root,
            can_manage_containers,
            can_manage_systemd,
        };
        info!(
            "Runtime environment: {} (root: {}, containers: {}, systemd: {})",
            capabilities.label(),
            has_root,
            can_manage_containers,
            can_manage_systemd
        );

        capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_file_enables_sandbox() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".replit"), "run = \"streamlit run app.py\"\n").unwrap();

        let capabilities = LinuxCapabilityProbe::new(dir.path(), None).probe();
        assert!(capabilities.sandbox);
        assert!(!capabilities.can_manage_containers);
    }

    #[test]
    fn test_override_wins_over_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".replit"), "").unwrap();

        let capabilities = LinuxCapabilityProbe::new(dir.path(), Some(false)).probe();
        assert!(!capabilities.sandbox);
        assert_eq!(capabilities.has_root, Uid::effective().is_root());
    }
}
