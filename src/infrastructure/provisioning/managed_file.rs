use crate::domain::provisioning::{EnsureOutcome, ProvisionError};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::debug;

/// Ensures `path` holds exactly `contents` with `mode`.
///
/// The new contents go to a sibling temp file that is renamed into place,
/// so cron and systemd never read a half-written file.
pub fn write_managed_file(
    path: &Path,
    contents: &str,
    mode: u32,
) -> Result<EnsureOutcome, ProvisionError> {
    let write_failed = |source| ProvisionError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let previous = match fs::read_to_string(path) {
        Ok(existing) => Some(existing),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(write_failed(e)),
    };
    let outcome = EnsureOutcome::from_previous(previous.as_deref(), contents);

    if outcome == EnsureOutcome::Unchanged {
        // Content matches; only repair the mode if someone changed it
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(write_failed)?;
        debug!("{} already up to date", path.display());
        return Ok(outcome);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{file_name}.volcano-tmp"));

    fs::write(&staging, contents).map_err(write_failed)?;
    fs::set_permissions(&staging, fs::Permissions::from_mode(mode)).map_err(write_failed)?;
    fs::rename(&staging, path).map_err(write_failed)?;

    debug!("{} {} (mode {:o})", path.display(), outcome, mode);
    Ok(outcome)
}
