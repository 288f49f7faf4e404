use crate::domain::deployment::{DeployError, PermissionHardener};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// rwxr-x---
pub const DIR_MODE: u32 = 0o750;
/// rw-r-----
pub const FILE_MODE: u32 = 0o640;

pub struct UnixPermissionHardener {
    /// Created when missing, then hardened.
    required_dirs: Vec<PathBuf>,
    /// Hardened only when they already exist.
    optional_dirs: Vec<PathBuf>,
}

impl UnixPermissionHardener {
    pub fn new(required_dirs: Vec<PathBuf>, optional_dirs: Vec<PathBuf>) -> Self {
        Self {
            required_dirs,
            optional_dirs,
        }
    }

    fn set_mode(path: &Path, mode: u32) -> Result<(), DeployError> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
            DeployError::PermissionHardeningFailed {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Walks the tree without following symlinks.
    fn harden_tree(root: &Path) -> Result<usize, DeployError> {
        let failed = |source| DeployError::PermissionHardeningFailed {
            path: root.to_path_buf(),
            source,
        };

        Self::set_mode(root, DIR_MODE)?;
        let mut count = 1;

        for entry in fs::read_dir(root).map_err(failed)? {
            let entry = entry.map_err(failed)?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(failed)?;

            if file_type.is_dir() {
                count += Self::harden_tree(&path)?;
            } else if file_type.is_file() {
                Self::set_mode(&path, FILE_MODE)?;
                count += 1;
            } else {
                debug!("Skipping non-regular entry {}", path.display());
            }
        }

        Ok(count)
    }
}

impl PermissionHardener for UnixPermissionHardener {
    fn harden(&self) -> Result<Vec<PathBuf>, DeployError> {
        let mut hardened = Vec::new();

        for dir in &self.required_dirs {
            fs::create_dir_all(dir).map_err(|source| DeployError::PermissionHardeningFailed {
                path: dir.clone(),
                source,
            })?;
        }

        let existing_optional = self.optional_dirs.iter().filter(|dir| dir.is_dir());
        for dir in self.required_dirs.iter().chain(existing_optional) {
            let count = Self::harden_tree(dir)?;
            info!(
                "Hardened {} ({} entries, dirs {:o}, files {:o})",
                dir.display(),
                count,
                DIR_MODE,
                FILE_MODE
            );
            hardened.push(dir.clone());
        }

        Ok(hardened)
    }
}
