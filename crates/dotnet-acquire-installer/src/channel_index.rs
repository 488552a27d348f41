//! Release metadata channel index (spec §6 "Wire formats consumed").

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelIndex {
    #[serde(rename = "channel-version")]
    pub channel_version: String,
    #[serde(rename = "latest-sdk")]
    pub latest_sdk: String,
    #[serde(rename = "latest-runtime")]
    pub latest_runtime: String,
    pub releases: Vec<Release>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(rename = "release-version")]
    pub release_version: String,
    pub sdk: Option<FileSet>,
    pub runtime: Option<FileSet>,
    #[serde(rename = "aspnetcore-runtime")]
    pub aspnetcore_runtime: Option<FileSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSet {
    pub version: String,
    pub files: Vec<InstallerFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallerFile {
    pub name: String,
    pub rid: String,
    pub url: String,
    pub hash: Option<String>,
}

impl ChannelIndex {
    /// Finds the release whose `release-version` exactly matches a fully
    /// specified `version`, or whose SDK/runtime version matches it.
    pub fn find_release(&self, version: &str) -> Option<&Release> {
        self.releases.iter().find(|r| {
            r.release_version == version
                || r.sdk.as_ref().is_some_and(|f| f.version == version)
                || r.runtime.as_ref().is_some_and(|f| f.version == version)
        })
    }
}

impl Release {
    pub fn files_for_mode(&self, mode: dotnet_acquire_paths::InstallMode) -> Option<&[InstallerFile]> {
        let set = match mode {
            dotnet_acquire_paths::InstallMode::Sdk => &self.sdk,
            dotnet_acquire_paths::InstallMode::Runtime => &self.runtime,
            dotnet_acquire_paths::InstallMode::AspNetCoreRuntime => &self.aspnetcore_runtime,
        };
        set.as_ref().map(|f| f.files.as_slice())
    }
}

/// Normalises a requested architecture (`x32` is renamed `x86`) and matches
/// it, along with the current OS, to a `rid` in `files` (spec §4.9).
pub fn select_installer_file<'a>(files: &'a [InstallerFile], os: &str, architecture: &str) -> Option<&'a InstallerFile> {
    let arch = if architecture == "x32" { "x86" } else { architecture };
    let wanted_rid = format!("{os}-{arch}");
    files.iter().find(|f| f.rid == wanted_rid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x32_remaps_to_x86() {
        let files = vec![
            InstallerFile { name: "a".into(), rid: "win-x86".into(), url: "u1".into(), hash: None },
            InstallerFile { name: "b".into(), rid: "win-x64".into(), url: "u2".into(), hash: None },
        ];
        let selected = select_installer_file(&files, "win", "x32").unwrap();
        assert_eq!(selected.rid, "win-x86");
    }

    #[test]
    fn find_release_matches_sdk_version() {
        let index = ChannelIndex {
            channel_version: "8.0".into(),
            latest_sdk: "8.0.100".into(),
            latest_runtime: "8.0.0".into(),
            releases: vec![Release {
                release_version: "8.0.0".into(),
                sdk: Some(FileSet { version: "8.0.100".into(), files: vec![] }),
                runtime: None,
                aspnetcore_runtime: None,
            }],
        };
        assert!(index.find_release("8.0.100").is_some());
        assert!(index.find_release("9.9.999").is_none());
    }
}
