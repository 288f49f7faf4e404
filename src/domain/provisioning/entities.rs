use super::repositories::ProvisionError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Feature {
    Nginx,
    Backups,
    Monitoring,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Feature::Nginx => "nginx + TLS",
            Feature::Backups => "backups",
            Feature::Monitoring => "monitoring",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsTarget {
    pub domain: String,
    pub email: String,
}

/// Validated set of production features requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSelection {
    nginx: bool,
    backups: bool,
    monitoring: bool,
    domain: Option<String>,
    email: Option<String>,
}

impl FeatureSelection {
    pub fn new(
        nginx: bool,
        backups: bool,
        monitoring: bool,
        domain: Option<String>,
        email: Option<String>,
    ) -> Result<Self, ProvisionError> {
        if !(nginx || backups || monitoring) {
            return Err(ProvisionError::Usage(
                "No feature selected. Pass --nginx, --backups, --monitoring or --all.".to_string(),
            ));
        }

        if nginx && (domain.is_none() || email.is_none()) {
            return Err(ProvisionError::Usage(
                "--nginx requires both --domain and --email".to_string(),
            ));
        }

        if let Some(domain) = &domain {
            validate_domain(domain)?;
        }
        if let Some(email) = &email {
            validate_email(email)?;
        }

        Ok(Self {
            nginx,
            backups,
            monitoring,
            domain,
            email,
        })
    }

    pub fn all(domain: String, email: String) -> Result<Self, ProvisionError> {
        Self::new(true, true, true, Some(domain), Some(email))
    }

    /// Features in installation order.
    pub fn requested(&self) -> Vec<Feature> {
        [
            (self.nginx, Feature::Nginx),
            (self.backups, Feature::Backups),
            (self.monitoring, Feature::Monitoring),
        ]
        .into_iter()
        .filter_map(|(on, feature)| on.then_some(feature))
        .collect()
    }

    pub fn includes(&self, feature: Feature) -> bool {
        self.requested().contains(&feature)
    }

    pub fn tls_target(&self) -> Option<TlsTarget> {
        match (&self.domain, &self.email) {
            (Some(domain), Some(email)) if self.nginx => Some(TlsTarget {
                domain: domain.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }

    /// Address the monitor mails alerts to, when one was given.
    pub fn alert_email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Host names end up inside the proxy config and on the certbot command
/// line, so only plain DNS characters are accepted.
pub fn validate_domain(domain: &str) -> Result<(), ProvisionError> {
    if domain.is_empty() || domain.len() > 253 {
        return Err(ProvisionError::InvalidDomain(domain.to_string()));
    }
    if domain.contains("..") || domain.starts_with(['.', '-']) || domain.ends_with('.') {
        return Err(ProvisionError::InvalidDomain(domain.to_string()));
    }
    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ProvisionError::InvalidDomain(domain.to_string()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ProvisionError> {
    let invalid = || ProvisionError::InvalidEmail(email.to_string());

    if email.chars().any(|c| c.is_whitespace() || c.is_control()) || email.starts_with('-') {
        return Err(invalid());
    }
    let (local, host) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || host.is_empty() || host.contains('@') {
        return Err(invalid());
    }
    validate_domain(host).map_err(|_| invalid())
}

/// Result of an "ensure state" step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnsureOutcome {
    Created,
    Updated,
    Unchanged,
}

impl EnsureOutcome {
    pub fn from_previous(previous: Option<&str>, desired: &str) -> Self {
        match previous {
            None => EnsureOutcome::Created,
            Some(existing) if existing == desired => EnsureOutcome::Unchanged,
            Some(_) => EnsureOutcome::Updated,
        }
    }
}

impl fmt::Display for EnsureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnsureOutcome::Created => "created",
            EnsureOutcome::Updated => "updated",
            EnsureOutcome::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

/// Helper scripts shipped inside the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAsset {
    Backup,
    Monitor,
}

impl ScriptAsset {
    pub fn asset_path(&self) -> &'static str {
        match self {
            ScriptAsset::Backup => "scripts/volcano-backup.sh",
            ScriptAsset::Monitor => "scripts/volcano-monitor.sh",
        }
    }

    pub fn install_name(&self) -> &'static str {
        match self {
            ScriptAsset::Backup => "volcano-backup.sh",
            ScriptAsset::Monitor => "volcano-monitor.sh",
        }
    }
}

/// A recurring job registered with cron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub name: String,
    pub schedule: String,
    pub user: String,
    pub command: PathBuf,
    pub log_file: PathBuf,
}

impl ScheduledTask {
    pub const BACKUP_TASK_NAME: &'static str = "volcano-dashboard-backup";
    pub const DAILY_BACKUP_SCHEDULE: &'static str = "0 2 * * *";

    pub fn daily_backup(script: &Path, log_file: &Path) -> Self {
        Self {
            name: Self::BACKUP_TASK_NAME.to_string(),
            schedule: Self::DAILY_BACKUP_SCHEDULE.to_string(),
            user: "root".to_string(),
            command: script.to_path_buf(),
            log_file: log_file.to_path_buf(),
        }
    }

    pub fn cron_line(&self) -> String {
        format!(
            "{} {} {} >> {} 2>&1",
            self.schedule,
            self.user,
            self.command.display(),
            self.log_file.display()
        )
    }

    /// Full contents of the cron.d drop-in. The file holds exactly one
    /// entry, so rewriting it can never duplicate the schedule.
    pub fn cron_file_contents(&self) -> String {
        format!(
            "# Managed by volcano-deploy ({name}). Changes are overwritten.\n\
             SHELL=/bin/sh\n\
             PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin\n\
             {line}\n",
            name = self.name,
            line = self.cron_line()
        )
    }
}

/// A long-running process kept alive by the service manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisedService {
    pub name: String,
    pub description: String,
    pub exec_start: String,
    pub restart_sec: u32,
}

impl SupervisedService {
    pub const MONITOR_NAME: &'static str = "volcano-monitor";

    pub fn monitor(script: &Path) -> Self {
        Self {
            name: Self::MONITOR_NAME.to_string(),
            description: "Volcano Dashboard system monitor".to_string(),
            exec_start: script.display().to_string(),
            restart_sec: 10,
        }
    }

    pub fn unit_name(&self) -> String {
        format!("{}.service", self.name)
    }

    pub fn render_unit(&self) -> String {
        format!(
            r#"[Unit]
Description={description}
After=network-online.target docker.service
Wants=network-online.target

[Service]
Type=simple
ExecStart={exec_start}
Restart=always
RestartSec={restart_sec}
StandardOutput=journal
StandardError=journal

[Install]
WantedBy=multi-user.target
"#,
            description = self.description,
            exec_start = self.exec_start,
            restart_sec = self.restart_sec,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledFeature {
    pub feature: Feature,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub run_id: Uuid,
    pub installed: Vec<InstalledFeature>,
    pub stack_rebuilt: bool,
}
