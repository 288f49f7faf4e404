//! 設定
//!
//! 環境変数から読み込むデプロイ設定。値が無ければ本番の固定パスを使用します。

use crate::domain::deployment::HealthCheckSettings;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid value for {key}: '{value}' ({reason})")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub project_dir: PathBuf,
    pub env_file: PathBuf,
    pub compose_file: PathBuf,
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub lock_file: PathBuf,
    pub port: u16,
    pub health_path: String,
    pub git_remote: String,
    pub git_branch: String,
    pub backup_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub cron_dir: PathBuf,
    pub systemd_dir: PathBuf,
    pub nginx_dir: PathBuf,
    pub system_log_dir: PathBuf,
    pub sandbox_override: Option<bool>,
    pub health: HealthCheckSettings,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self::for_project(".")
    }
}

impl DeployConfig {
    pub const DEFAULT_PORT: u16 = 8501;

    /// Production defaults rooted at `project_dir`.
    pub fn for_project(project_dir: impl AsRef<Path>) -> Self {
        let project_dir = project_dir.as_ref().to_path_buf();
        Self {
            env_file: project_dir.join(".env"),
            compose_file: project_dir.join("docker-compose.yml"),
            data_dir: project_dir.join("data"),
            logs_dir: project_dir.join("logs"),
            lock_file: project_dir.join(".volcano-deploy.lock"),
            port: Self::DEFAULT_PORT,
            health_path: "/".to_string(),
            git_remote: "origin".to_string(),
            git_branch: "main".to_string(),
            backup_dir: PathBuf::from("/var/backups/volcano-dashboard"),
            bin_dir: PathBuf::from("/usr/local/bin"),
            cron_dir: PathBuf::from("/etc/cron.d"),
            systemd_dir: PathBuf::from("/etc/systemd/system"),
            nginx_dir: PathBuf::from("/etc/nginx"),
            system_log_dir: PathBuf::from("/var/log"),
            sandbox_override: None,
            health: HealthCheckSettings::default(),
            project_dir,
        }
    }

    /// Reads `VOLCANO_*` variables from the process environment.
    pub fn from_env(project_dir_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::from_lookup(project_dir_override, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(
        project_dir_override: Option<PathBuf>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_dir = project_dir_override
            .or_else(|| lookup("VOLCANO_PROJECT_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let mut config = Self::for_project(&project_dir);

        // Relative file names resolve against the project directory
        let in_project = |value: String| {
            let path = PathBuf::from(value);
            if path.is_absolute() {
                path
            } else {
                project_dir.join(path)
            }
        };

        if let Some(value) = lookup("VOLCANO_ENV_FILE") {
            config.env_file = in_project(value);
        }
        if let Some(value) = lookup("VOLCANO_COMPOSE_FILE") {
            config.compose_file = in_project(value);
        }
        if let Some(value) = lookup("VOLCANO_PORT") {
            config.port = parse("VOLCANO_PORT", &value)?;
        }
        if let Some(value) = lookup("VOLCANO_HEALTH_PATH") {
            config.health_path = if value.starts_with('/') {
                value
            } else {
                format!("/{value}")
            };
        }
        if let Some(value) = lookup("VOLCANO_GIT_REMOTE") {
            config.git_remote = value;
        }
        if let Some(value) = lookup("VOLCANO_GIT_BRANCH") {
            config.git_branch = value;
        }
        if let Some(value) = lookup("VOLCANO_BACKUP_DIR") {
            config.backup_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("VOLCANO_BIN_DIR") {
            config.bin_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("VOLCANO_CRON_DIR") {
            config.cron_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("VOLCANO_SYSTEMD_DIR") {
            config.systemd_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("VOLCANO_NGINX_DIR") {
            config.nginx_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("VOLCANO_LOG_DIR") {
            config.system_log_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("VOLCANO_SETTLE_SECS") {
            config.health.settle_delay =
                Duration::from_secs(parse("VOLCANO_SETTLE_SECS", &value)?);
        }
        if let Some(value) = lookup("VOLCANO_HEALTH_ATTEMPTS") {
            let attempts: u32 = parse("VOLCANO_HEALTH_ATTEMPTS", &value)?;
            if attempts == 0 {
                return Err(ConfigError {
                    key: "VOLCANO_HEALTH_ATTEMPTS".to_string(),
                    value,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.health.max_attempts = attempts;
        }
        if let Some(value) = lookup("VOLCANO_SANDBOX") {
            config.sandbox_override = Some(parse_flag("VOLCANO_SANDBOX", &value)?);
        }

        Ok(config)
    }

    pub fn health_url(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, self.health_path)
    }

    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("volcano_dashboard.db")
    }

    pub fn backup_log_file(&self) -> PathBuf {
        self.system_log_dir.join("volcano-backup.log")
    }

    pub fn monitor_log_file(&self) -> PathBuf {
        self.system_log_dir.join("volcano-monitor.log")
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DeployConfig::from_lookup(None, lookup(&[])).unwrap();
        assert_eq!(config.project_dir, PathBuf::from("."));
        assert_eq!(config.env_file, PathBuf::from("./.env"));
        assert_eq!(config.port, 8501);
        assert_eq!(config.health_url(), "http://127.0.0.1:8501/");
        assert_eq!(config.cron_dir, PathBuf::from("/etc/cron.d"));
        assert_eq!(config.sandbox_override, None);
        assert_eq!(config.database_file(), PathBuf::from("./data/volcano_dashboard.db"));
    }

    #[test]
    fn test_overrides() {
        let config = DeployConfig::from_lookup(
            Some(PathBuf::from("/srv/volcano")),
            lookup(&[
                ("VOLCANO_PROJECT_DIR", "/ignored"),
                ("VOLCANO_ENV_FILE", "config/prod.env"),
                ("VOLCANO_PORT", "9000"),
                ("VOLCANO_HEALTH_PATH", "_stcore/health"),
                ("VOLCANO_SANDBOX", "true"),
                ("VOLCANO_HEALTH_ATTEMPTS", "3"),
            ]),
        )
        .unwrap();
        assert_eq!(config.project_dir, PathBuf::from("/srv/volcano"));
        assert_eq!(config.env_file, PathBuf::from("/srv/volcano/config/prod.env"));
        assert_eq!(config.health_url(), "http://127.0.0.1:9000/_stcore/health");
        assert_eq!(config.sandbox_override, Some(true));
        assert_eq!(config.health.max_attempts, 3);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = DeployConfig::from_lookup(None, lookup(&[("VOLCANO_PORT", "http")])).unwrap_err();
        assert_eq!(err.key, "VOLCANO_PORT");

        let err = DeployConfig::from_lookup(None, lookup(&[("VOLCANO_HEALTH_ATTEMPTS", "0")]))
            .unwrap_err();
        assert_eq!(err.reason, "must be at least 1");

        let err =
            DeployConfig::from_lookup(None, lookup(&[("VOLCANO_SANDBOX", "maybe")])).unwrap_err();
        assert_eq!(err.key, "VOLCANO_SANDBOX");
    }
}
