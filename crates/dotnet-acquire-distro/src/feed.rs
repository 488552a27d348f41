//! Table-driven command templates: each provider maps a distro+version pair
//! to package names and command templates, substituting a placeholder
//! package-name token into the template (spec §4.8 "Providers are
//! table-driven").

use std::path::PathBuf;

/// A fully resolved set of commands/paths for one (distro, version, mode)
/// combination.
#[derive(Debug, Clone)]
pub struct FeedTemplate {
    pub package_name: String,
    pub install_cmd: Vec<String>,
    pub uninstall_cmd: Vec<String>,
    pub update_cmd: Vec<String>,
    /// Command that adds the vendor feed as an apt/yum source, run once
    /// before the first install on a distro that needs it.
    pub preinstall_cmd: Option<Vec<String>>,
    pub distro_feed_dir: PathBuf,
    pub microsoft_feed_dir: PathBuf,
}

/// Placeholder substituted with the resolved package name in a template's
/// command argument list.
pub const PACKAGE_TOKEN: &str = "{package}";

/// Replaces [`PACKAGE_TOKEN`] with `package` in every argument.
pub fn substitute(args: &[&str], package: &str) -> Vec<String> {
    args.iter()
        .map(|arg| arg.replace(PACKAGE_TOKEN, package))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_package_token() {
        let args = ["install", "-y", PACKAGE_TOKEN];
        let resolved = substitute(&args, "dotnet-sdk-8.0");
        assert_eq!(resolved, vec!["install", "-y", "dotnet-sdk-8.0"]);
    }
}
