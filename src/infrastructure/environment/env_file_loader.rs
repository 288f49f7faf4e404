use crate::domain::environment::{DeploymentConfig, DeploymentConfigLoader, EnvironmentError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct EnvFileLoader {
    path: PathBuf,
}

impl EnvFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DeploymentConfigLoader for EnvFileLoader {
    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<DeploymentConfig, EnvironmentError> {
        if !self.exists() {
            return Err(EnvironmentError::ConfigMissing(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let values = parse_env_file(&self.path, &content)?;
        info!(
            "Loaded {} configuration value(s) from {}",
            values.len(),
            self.path.display()
        );
        debug!("Configuration keys: {:?}", values.keys().collect::<Vec<_>>());

        Ok(DeploymentConfig::new(self.path.clone(), values))
    }
}

/// Parses `KEY=VALUE` lines. Blank lines and `#` comments are ignored, an
/// optional `export ` prefix is accepted and matching outer quotes are
/// stripped. Later duplicates win, as with `docker compose --env-file`.
pub fn parse_env_file(
    path: &Path,
    content: &str,
) -> Result<BTreeMap<String, String>, EnvironmentError> {
    let mut values = BTreeMap::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();

        let (key, value) = line.split_once('=').ok_or_else(|| EnvironmentError::ConfigParse {
            path: path.to_path_buf(),
            line: index + 1,
            reason: "expected KEY=VALUE".to_string(),
        })?;

        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(EnvironmentError::ConfigParse {
                path: path.to_path_buf(),
                line: index + 1,
                reason: format!("invalid key '{key}'"),
            });
        }

        values.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    Ok(values)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        let Some(rest) = value.strip_prefix(quote) else {
            continue;
        };
        if let Some(end) = rest.find(quote) {
            // Anything after the closing quote must be a comment
            let trailing = rest[end + 1..].trim_start();
            if trailing.is_empty() || trailing.starts_with('#') {
                return &rest[..end];
            }
        }
    }
    // Unquoted values may carry a trailing comment
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    }
}
