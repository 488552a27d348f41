//! Elevation prompting is a host UI concern (spec §1 lists "elevation
//! prompts" as an out-of-scope external collaborator); this trait is the
//! narrow seam the Command Executor calls into before running a
//! `run_under_sudo` command on a non-WSL host.

use async_trait::async_trait;

#[async_trait]
pub trait ElevationPrompt: Send + Sync {
    /// Ask the host to grant elevation for the given command description.
    /// Returning `Ok(())` means the caller may proceed to run the command
    /// with `run_under_sudo` honoured (e.g. via `sudo`/a UAC prompt).
    async fn request(&self, command_description: &str) -> std::io::Result<()>;
}

/// No-op prompt that always grants elevation; suitable for headless/CI runs
/// where the caller already has the necessary privileges (e.g. running as
/// root) and for tests.
#[derive(Debug, Default)]
pub struct AlwaysGrantElevation;

#[async_trait]
impl ElevationPrompt for AlwaysGrantElevation {
    async fn request(&self, _command_description: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Returns whether the current process appears to be running inside WSL, by
/// checking for the `WSL_DISTRO_NAME` environment variable the way the
/// shell environment itself advertises it.
pub fn is_wsl() -> bool {
    std::env::var_os("WSL_DISTRO_NAME").is_some() || std::env::var_os("WSL_INTEROP").is_some()
}
