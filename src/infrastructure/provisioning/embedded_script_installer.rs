use super::managed_file::write_managed_file;
use crate::domain::provisioning::{EnsureOutcome, ProvisionError, ScriptAsset, ScriptInstaller};
use crate::infrastructure::assets::render_asset;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

const SCRIPT_MODE: u32 = 0o755;

/// Installs the helper scripts compiled into the binary.
pub struct EmbeddedScriptInstaller {
    bin_dir: PathBuf,
}

impl EmbeddedScriptInstaller {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }
}

impl ScriptInstaller for EmbeddedScriptInstaller {
    fn install(
        &self,
        script: ScriptAsset,
        vars: &BTreeMap<&str, String>,
    ) -> Result<(PathBuf, EnsureOutcome), ProvisionError> {
        let contents = render_asset(script.asset_path(), vars)?;
        let path = self.installed_path(script);
        let outcome = write_managed_file(&path, &contents, SCRIPT_MODE)?;
        info!("Script {} {}", path.display(), outcome);
        Ok((path, outcome))
    }

    fn installed_path(&self, script: ScriptAsset) -> PathBuf {
        self.bin_dir.join(script.install_name())
    }
}
