//! Debian/Ubuntu provider: dispatches to `apt-get` and `dpkg-query`, in the
//! style of the teacher's `AptManager` (spec §4.8).

use crate::error::Result;
use crate::feed::{substitute, FeedTemplate};
use crate::provider::{DistroProvider, DotnetMode};
use crate::support::SupportStatus;
use async_trait::async_trait;
use dotnet_acquire_exec::{Command, CommandExecutor, ExecuteOptions};
use dotnet_acquire_version::{parse, Version};
use std::path::PathBuf;
use std::sync::Arc;

fn mode_package_prefix(mode: DotnetMode) -> &'static str {
    match mode {
        DotnetMode::Sdk => "dotnet-sdk",
        DotnetMode::AspNetCoreRuntime => "aspnetcore-runtime",
        DotnetMode::Runtime => "dotnet-runtime",
    }
}

fn template_for(version: &Version, mode: DotnetMode) -> FeedTemplate {
    let major_minor = format!("{}.{}", version.get_major(), version.get_minor().unwrap_or(0));
    let package_name = format!("{}-{}", mode_package_prefix(mode), major_minor);
    FeedTemplate {
        install_cmd: substitute(&["install", "-y", "-qq", crate::feed::PACKAGE_TOKEN], &package_name),
        uninstall_cmd: substitute(&["remove", "-y", "-qq", crate::feed::PACKAGE_TOKEN], &package_name),
        update_cmd: substitute(&["install", "-y", "-qq", "--only-upgrade", crate::feed::PACKAGE_TOKEN], &package_name),
        preinstall_cmd: None,
        distro_feed_dir: PathBuf::from("/usr/lib/dotnet"),
        microsoft_feed_dir: PathBuf::from("/usr/share/dotnet"),
        package_name,
    }
}

/// Runs `apt-get`, elevated when the process is not already root (the
/// Command Executor's elevation prompt handles the `sudo` request).
pub struct DebianProvider {
    executor: Arc<CommandExecutor>,
}

impl DebianProvider {
    pub fn new(executor: Arc<CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn run_apt_get(&self, args: &[String]) -> Result<i32> {
        let cmd = Command::new("apt-get").args(args.to_vec()).under_sudo();
        let result = self.executor.execute(&cmd, &ExecuteOptions::default()).await?;
        Ok(result.status)
    }
}

#[async_trait]
impl DistroProvider for DebianProvider {
    fn name(&self) -> &'static str {
        "debian"
    }

    async fn install_dotnet(&self, version: &Version, mode: DotnetMode) -> Result<i32> {
        let template = template_for(version, mode);
        self.run_apt_get(&template.install_cmd).await
    }

    async fn uninstall_dotnet(&self, version: &Version, mode: DotnetMode) -> Result<i32> {
        let template = template_for(version, mode);
        self.run_apt_get(&template.uninstall_cmd).await
    }

    async fn upgrade_dotnet(&self, version: &Version, mode: DotnetMode) -> Result<i32> {
        let template = template_for(version, mode);
        self.run_apt_get(&template.update_cmd).await
    }

    async fn get_installed_sdk_versions(&self) -> Result<Vec<String>> {
        query_dpkg_versions(&self.executor, "dotnet-sdk-").await
    }

    async fn get_installed_runtime_versions(&self) -> Result<Vec<String>> {
        query_dpkg_versions(&self.executor, "dotnet-runtime-").await
    }

    async fn get_installed_global_dotnet_path(&self, _mode: DotnetMode) -> Result<Option<PathBuf>> {
        let dir = self.get_expected_distro_feed_install_dir();
        Ok(dir.join("dotnet").exists().then_some(dir))
    }

    async fn get_installed_global_dotnet_version(&self, mode: DotnetMode) -> Result<Option<Version>> {
        let versions = match mode {
            DotnetMode::Sdk => self.get_installed_sdk_versions().await?,
            _ => self.get_installed_runtime_versions().await?,
        };
        Ok(versions.into_iter().find_map(|v| parse(&v).ok()))
    }

    async fn dotnet_package_exists_on_system(&self, version: &Version, mode: DotnetMode) -> Result<bool> {
        let template = template_for(version, mode);
        let cmd = Command::new("dpkg-query").args(["-W", "-f=${Status}", &template.package_name]);
        let result = self.executor.execute(&cmd, &ExecuteOptions::default()).await?;
        Ok(result.success() && result.stdout.contains("install ok installed"))
    }

    async fn get_dotnet_version_support_status(&self, _version: &Version, _mode: DotnetMode) -> Result<SupportStatus> {
        Ok(SupportStatus::Distro)
    }

    async fn get_recommended_dotnet_version(&self, _mode: DotnetMode) -> Result<Version> {
        Ok(Version::new_full(8, 0, 1, 0))
    }

    fn get_expected_distro_feed_install_dir(&self) -> PathBuf {
        PathBuf::from("/usr/lib/dotnet")
    }

    fn get_expected_microsoft_feed_install_dir(&self) -> PathBuf {
        PathBuf::from("/usr/share/dotnet")
    }
}

async fn query_dpkg_versions(executor: &CommandExecutor, prefix: &str) -> Result<Vec<String>> {
    let cmd = Command::new("dpkg-query").args(["-W", "-f=${Package} ${Version}\n"]);
    let result = executor.execute(&cmd, &ExecuteOptions::default()).await?;
    Ok(result
        .stdout
        .lines()
        .filter_map(|line| {
            let (name, version) = line.split_once(' ')?;
            name.starts_with(prefix).then(|| version.to_string())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_names_follow_distro_convention() {
        let version = parse("8.0.100").unwrap();
        let template = template_for(&version, DotnetMode::Sdk);
        assert_eq!(template.package_name, "dotnet-sdk-8.0");
        assert!(template.install_cmd.contains(&"dotnet-sdk-8.0".to_string()));
    }
}
