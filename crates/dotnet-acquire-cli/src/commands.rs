//! Command handlers: thin glue between parsed CLI args and
//! [`dotnet_acquire_core::AcquisitionWorker`], with colored status output
//! matching the teacher's `vx-cli` error/success formatting.

use crate::cli::{ModeArg, PolicyArg, ScopeArg};
use colored::Colorize;
use dotnet_acquire_core::{AcquireError, AcquireRequest, AcquisitionConfig, AcquisitionWorker};
use std::path::PathBuf;

pub fn build_config(storage_root: Option<PathBuf>) -> AcquisitionConfig {
    let mut config = AcquisitionConfig::from_env();
    if let Some(root) = storage_root {
        config.storage_root = root;
    }
    config
}

pub async fn acquire(
    worker: &AcquisitionWorker,
    version: String,
    mode: ModeArg,
    scope: ScopeArg,
    policy: PolicyArg,
    extension_id: Option<String>,
    arch: Option<String>,
    reject_previews: bool,
) -> anyhow::Result<()> {
    let mut request = AcquireRequest::new(version, mode.into())
        .with_scope(scope.into())
        .with_policy(policy.into());
    if let Some(id) = extension_id {
        request = request.with_extension_id(id);
    }
    if let Some(arch) = arch {
        request = request.with_architecture(arch);
    }
    request.reject_previews = reject_previews;

    let result = worker.acquire(request).await?;
    println!("{} {}", "installed:".green().bold(), result.path.display());
    println!("{} {}", "install-id:".dimmed(), result.install_id);
    Ok(())
}

pub async fn find_path(worker: &AcquisitionWorker, version: String, mode: ModeArg, policy: PolicyArg, disable_local_lookup: bool) -> anyhow::Result<()> {
    match worker.find_path(mode.into(), &version, policy.into(), disable_local_lookup).await? {
        Some(result) => {
            println!("{} {}", "found:".green().bold(), result.path.display());
        }
        None => {
            println!("{}", "no matching install found".yellow());
        }
    }
    Ok(())
}

pub fn list_installed(worker: &AcquisitionWorker) -> anyhow::Result<()> {
    let records = worker.list_installed()?;
    if records.is_empty() {
        println!("{}", "no installs tracked".dimmed());
        return Ok(());
    }
    for record in records {
        let owners: Vec<String> = record.owners.iter().map(|o| o.clone().unwrap_or_else(|| "<legacy>".into())).collect();
        println!("{}  {} {}", record.install_id.cyan().bold(), "owners:".dimmed(), owners.join(", "));
    }
    Ok(())
}

pub async fn uninstall_all(worker: &AcquisitionWorker, extension_id: Option<String>) -> anyhow::Result<()> {
    let removed = worker.uninstall_all(extension_id.as_deref()).await?;
    println!("{} {removed}", "removed:".green().bold());
    Ok(())
}

/// Mirrors the teacher's `error_handler.rs`: a colored `error[kind]:` header
/// plus, where the condition is actionable, a one-line hint.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {err}", "error:".red().bold());
    if let Some(acquire_err) = err.downcast_ref::<AcquireError>() {
        if let Some(hint) = hint_for(acquire_err) {
            eprintln!("  {} {hint}", "hint:".yellow());
        }
    }
}

fn hint_for(err: &AcquireError) -> Option<&'static str> {
    match err {
        AcquireError::Offline => Some("check network connectivity, or configure a proxy via HTTPS_PROXY"),
        AcquireError::RhelUnsupported => Some("see https://learn.microsoft.com/dotnet/core/install/linux-rhel for supported RHEL versions"),
        AcquireError::ConflictingInstallTypes { .. } => Some("remove the conflicting install or target its feed explicitly"),
        AcquireError::DistroUnknown => Some("this distribution could not be identified from /etc/os-release"),
        _ => None,
    }
}
