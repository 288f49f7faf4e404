use super::managed_file::write_managed_file;
use crate::domain::provisioning::{EnsureOutcome, ProvisionError, ScheduledTask, TaskScheduler};
use std::path::PathBuf;
use tracing::info;

/// One drop-in file per task under `/etc/cron.d`. Rewriting the file
/// replaces the entry, so repeated runs never stack duplicate schedules.
pub struct CronDScheduler {
    cron_dir: PathBuf,
}

impl CronDScheduler {
    pub fn new(cron_dir: impl Into<PathBuf>) -> Self {
        Self {
            cron_dir: cron_dir.into(),
        }
    }

    fn task_path(&self, task_name: &str) -> PathBuf {
        // cron ignores drop-ins whose names contain dots
        self.cron_dir.join(task_name.replace('.', "-"))
    }
}

impl TaskScheduler for CronDScheduler {
    fn ensure_task(&self, task: &ScheduledTask) -> Result<EnsureOutcome, ProvisionError> {
        let path = self.task_path(&task.name);
        let outcome = write_managed_file(&path, &task.cron_file_contents(), 0o644)?;
        info!(
            "Scheduled task {} {} ({})",
            task.name,
            outcome,
            task.cron_line()
        );
        Ok(outcome)
    }

    fn is_registered(&self, task_name: &str) -> bool {
        self.task_path(task_name).is_file()
    }
}
