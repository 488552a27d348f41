//! Maps a detected distro name to a provider (spec §4.8 "Provider
//! selection").

use crate::error::{DistroError, Result};
use crate::osrelease::DistroVersionPair;
use crate::provider::DistroProvider;
use crate::providers::{DebianProvider, GenericProvider, RedHatProvider};
use dotnet_acquire_exec::CommandExecutor;
use std::sync::Arc;
use tracing::info;

const DEBIAN_LIKE: &[&str] = &["ubuntu", "debian", "linuxmint"];
const REDHAT_LIKE: &[&str] = &["rhel", "red hat enterprise linux", "centos", "fedora", "rocky", "almalinux"];

/// Selects a provider for `distro`, rejecting RHEL 7 outright (spec §4.8).
pub fn select_provider(distro: &DistroVersionPair, executor: Arc<CommandExecutor>) -> Result<Box<dyn DistroProvider>> {
    let name = distro.name.to_ascii_lowercase();

    if is_rhel_like(&name) && distro.version.trim_start().starts_with('7') {
        return Err(DistroError::RhelUnsupported);
    }

    if DEBIAN_LIKE.iter().any(|d| name.contains(d)) {
        return Ok(Box::new(DebianProvider::new(executor)));
    }

    if is_rhel_like(&name) {
        let package_manager = if which::which("dnf").is_ok() { "dnf" } else { "yum" };
        return Ok(Box::new(RedHatProvider::new(executor, package_manager)));
    }

    info!(distro = %distro.name, "unrecognised distribution; falling back to the generic provider");
    Ok(Box::new(GenericProvider::new()))
}

fn is_rhel_like(name: &str) -> bool {
    REDHAT_LIKE.iter().any(|d| name.contains(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotnet_acquire_exec::{AlwaysGrantElevation, TokioProcessRunner};

    fn executor() -> Arc<CommandExecutor> {
        Arc::new(CommandExecutor::with_runner(Arc::new(TokioProcessRunner), Arc::new(AlwaysGrantElevation)))
    }

    #[test]
    fn rejects_rhel_7() {
        let distro = DistroVersionPair { name: "Red Hat Enterprise Linux".into(), version: "7.9".into() };
        let err = select_provider(&distro, executor()).unwrap_err();
        assert!(matches!(err, DistroError::RhelUnsupported));
    }

    #[test]
    fn selects_debian_provider_for_ubuntu() {
        let distro = DistroVersionPair { name: "Ubuntu".into(), version: "22.04".into() };
        let provider = select_provider(&distro, executor()).unwrap();
        assert_eq!(provider.name(), "debian");
    }

    #[test]
    fn selects_redhat_provider_for_rhel_8() {
        let distro = DistroVersionPair { name: "Red Hat Enterprise Linux".into(), version: "8.9".into() };
        let provider = select_provider(&distro, executor()).unwrap();
        assert_eq!(provider.name(), "redhat");
    }

    #[test]
    fn unknown_distro_falls_back_to_generic() {
        let distro = DistroVersionPair { name: "SomeNewDistro".into(), version: "1.0".into() };
        let provider = select_provider(&distro, executor()).unwrap();
        assert_eq!(provider.name(), "generic");
    }
}
