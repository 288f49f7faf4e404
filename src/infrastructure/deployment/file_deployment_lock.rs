use crate::domain::deployment::{DeployError, DeploymentLock, LockLease};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Advisory `flock` on a fixed file. The kernel drops the lock when the
/// holder exits, so a crashed deployment never leaves it stuck.
pub struct FileDeploymentLock {
    path: PathBuf,
}

impl FileDeploymentLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DeploymentLock for FileDeploymentLock {
    fn acquire(&self) -> Result<LockLease, DeployError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file: File = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)?;

        let mut guard = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(guard) => guard,
            Err((_, Errno::EAGAIN)) => return Err(DeployError::LockHeld(self.path.clone())),
            Err((_, errno)) => return Err(DeployError::FileSystemError(errno.into())),
        };

        // Holder details help an operator find the competing run
        guard.set_len(0)?;
        writeln!(
            guard,
            "pid={} started={}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        )?;
        debug!("Wrote holder details to {}", self.path.display());

        info!("Acquired deployment lock {}", self.path.display());
        Ok(LockLease::new(guard))
    }
}
