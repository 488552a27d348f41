use crate::identity::InstallIdentity;
use std::path::{Path, PathBuf};

/// On-disk layout rooted at a storage directory (spec §6 "On-disk layout").
///
/// ```text
/// {storageRoot}/{installId}/...
/// {storageRoot}/install scripts/dotnet-install.{ps1|sh}
/// ```
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default storage root: `~/.dotnet-acquire`, mirroring the teacher's
    /// `~/.vx` convention for a tool-managed store.
    pub fn default_root() -> Self {
        let root = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dotnet-acquire");
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn install_dir(&self, identity: &InstallIdentity) -> PathBuf {
        self.root.join(identity.install_id())
    }

    pub fn install_scripts_dir(&self) -> PathBuf {
        self.root.join("install scripts")
    }

    pub fn install_script_path(&self, windows: bool) -> PathBuf {
        let ext = if windows { "ps1" } else { "sh" };
        self.install_scripts_dir().join(format!("dotnet-install.{ext}"))
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.install_scripts_dir())?;
        Ok(())
    }

    /// Whether `dir` falls under this layout's root — used by the Install
    /// Tracker's `getInstalled` to filter out installs not managed by this
    /// library instance (spec §4.5).
    pub fn owns(&self, dir: &Path) -> bool {
        dir.starts_with(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{InstallMode, InstallScope};
    use dotnet_acquire_version::parse;

    #[test]
    fn install_dir_is_under_root() {
        let layout = StorageLayout::new("/tmp/store");
        let id = InstallIdentity::new(parse("7.0.100").unwrap(), InstallMode::Sdk, "x64", InstallScope::Local);
        let dir = layout.install_dir(&id);
        assert!(layout.owns(&dir));
        assert!(dir.starts_with("/tmp/store"));
    }
}
