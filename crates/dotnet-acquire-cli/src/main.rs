//! `dotnet-acquire` — a thin CLI harness exercising `dotnet-acquire-core`
//! end to end. Not the "host editor/CLI surface" spec.md scopes out (that's
//! the *consumer's* UI); this is the library's own smoke-test binary, the
//! same role `vx-cli` plays for the teacher's `vx` workspace.

mod cli;
mod commands;
mod tracing_setup;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_setup::setup_tracing(cli.verbose);

    let config = commands::build_config(cli.storage_root);
    let worker = dotnet_acquire_core::AcquisitionWorker::new(config)?;

    let result = match cli.command {
        Commands::Acquire {
            version,
            mode,
            scope,
            policy,
            extension_id,
            arch,
            reject_previews,
        } => commands::acquire(&worker, version, mode, scope, policy, extension_id, arch, reject_previews).await,
        Commands::FindPath {
            version,
            mode,
            policy,
            disable_local_lookup,
        } => commands::find_path(&worker, version, mode, policy, disable_local_lookup).await,
        Commands::ListInstalled => commands::list_installed(&worker),
        Commands::UninstallAll { extension_id } => commands::uninstall_all(&worker, extension_id).await,
    };

    if let Err(err) = result {
        commands::print_error(&err);
        std::process::exit(1);
    }

    Ok(())
}
