use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Keys that must be present and non-empty before any container start.
pub const REQUIRED_KEYS: [&str; 4] = [
    "DATABASE_URL",
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "TWILIO_PHONE_NUMBER",
];

pub const OPTIONAL_KEYS: [&str; 1] = ["OPENAI_API_KEY"];

/// What the current host allows this process to do.
///
/// Probed once at startup and passed into every use case, so no component
/// has to sniff the filesystem on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RuntimeCapabilities {
    /// Restricted cloud shell: no root, no container engine, the host
    /// supervisor runs the dashboard itself.
    pub sandbox: bool,
    pub has_root: bool,
    pub can_manage_containers: bool,
    pub can_manage_systemd: bool,
}

impl RuntimeCapabilities {
    pub fn full_server() -> Self {
        Self {
            sandbox: false,
            has_root: true,
            can_manage_containers: true,
            can_manage_systemd: true,
        }
    }

    pub fn restricted_sandbox() -> Self {
        Self {
            sandbox: true,
            has_root: false,
            can_manage_containers: false,
            can_manage_systemd: false,
        }
    }

    /// Mutating steps are allowed for root, or inside the sandbox where
    /// root is never available.
    pub fn may_mutate(&self) -> bool {
        self.has_root || self.sandbox
    }

    pub fn label(&self) -> &'static str {
        if self.sandbox {
            "restricted sandbox"
        } else {
            "full server"
        }
    }
}

/// Parsed deployment configuration file.
#[derive(Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    source: PathBuf,
    values: BTreeMap<String, String>,
}

impl DeploymentConfig {
    pub fn new(source: impl Into<PathBuf>, values: BTreeMap<String, String>) -> Self {
        Self {
            source: source.into(),
            values,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Required keys that are absent or blank, in declaration order.
    pub fn missing_required_keys(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| self.get(key).is_none_or(|value| value.trim().is_empty()))
            .collect()
    }

    pub fn has_ai_integration(&self) -> bool {
        OPTIONAL_KEYS
            .iter()
            .any(|key| self.get(key).is_some_and(|value| !value.trim().is_empty()))
    }
}

// Values are credentials; only key names are ever printed.
impl fmt::Debug for DeploymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentConfig")
            .field("source", &self.source)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
