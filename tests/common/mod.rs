#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use volcano_deploy::config::DeployConfig;
use volcano_deploy::domain::shared::CommandError;
use volcano_deploy::infrastructure::command::{CommandOutput, CommandRunner, CommandSpec};

/// Records commands instead of running them. Prefix-matched responses
/// override the default success.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<String>>,
    responses: Mutex<Vec<(String, i32, String)>>,
}

impl FakeRunner {
    pub fn respond(&self, prefix: &str, code: i32, stdout: &str) {
        self.responses
            .lock()
            .unwrap()
            .push((prefix.to_string(), code, stdout.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.split_whitespace().next() == Some(program))
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let line = spec.to_string();
        self.calls.lock().unwrap().push(line.clone());

        let responses = self.responses.lock().unwrap();
        let matched = responses
            .iter()
            .rev()
            .find(|(prefix, _, _)| line.starts_with(prefix.as_str()));
        Ok(match matched {
            Some((_, code, stdout)) => CommandOutput {
                code: Some(*code),
                stdout: stdout.clone(),
                stderr: String::new(),
            },
            None => CommandOutput {
                code: Some(0),
                ..Default::default()
            },
        })
    }
}

/// Project and system directories all rooted in one temp dir.
pub fn sandboxed_config(root: &Path) -> DeployConfig {
    let mut config = DeployConfig::for_project(root.join("project"));
    config.backup_dir = root.join("var/backups/volcano-dashboard");
    config.bin_dir = root.join("usr/local/bin");
    config.cron_dir = root.join("etc/cron.d");
    config.systemd_dir = root.join("etc/systemd/system");
    config.nginx_dir = root.join("etc/nginx");
    config.system_log_dir = root.join("var/log");
    std::fs::create_dir_all(&config.project_dir).unwrap();
    config
}

pub fn write_env_file(config: &DeployConfig) {
    std::fs::write(
        &config.env_file,
        "DATABASE_URL=sqlite:///app/data/volcano_dashboard.db\n\
         TWILIO_ACCOUNT_SID=AC0000\n\
         TWILIO_AUTH_TOKEN=token\n\
         TWILIO_PHONE_NUMBER=+15550100\n",
    )
    .unwrap();
}

/// Path → (mode, contents) for every regular file under `root`.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, (u32, String)> {
    let mut files = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries {
            let path = entry.unwrap().path();
            let meta = std::fs::symlink_metadata(&path).unwrap();
            if meta.is_dir() {
                pending.push(path);
            } else if meta.is_file() {
                let contents = std::fs::read_to_string(&path).unwrap_or_default();
                files.insert(path, (meta.permissions().mode() & 0o777, contents));
            }
        }
    }
    files
}

pub fn mode_of(path: &Path) -> u32 {
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}
