//! The process-spawning primitive is, per spec §1, a narrow external
//! interface — actual `exec`/`spawn` belongs to the host. [`ProcessRunner`]
//! is that narrow interface; [`TokioProcessRunner`] is the default real
//! implementation, and tests substitute a recording/fake runner instead of
//! touching the real process table.

use crate::command::{Command, CommandResult, ExecuteOptions};
use async_trait::async_trait;

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, cmd: &Command, options: &ExecuteOptions) -> std::io::Result<CommandResult>;
}

/// Spawns real OS processes via `tokio::process::Command`.
#[derive(Debug, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, cmd: &Command, options: &ExecuteOptions) -> std::io::Result<CommandResult> {
        let mut builder = if cmd.run_under_sudo && !cfg!(target_os = "windows") {
            let mut b = tokio::process::Command::new("sudo");
            b.arg(&cmd.root);
            b
        } else {
            tokio::process::Command::new(&cmd.root)
        };
        builder.args(&cmd.args);
        if let Some(cwd) = &options.cwd {
            builder.current_dir(cwd);
        }
        for (k, v) in &options.env {
            builder.env(k, v);
        }
        builder.stdout(std::process::Stdio::piped());
        builder.stderr(std::process::Stdio::piped());

        let run = builder.output();
        let output = match options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, run)
                .await
                .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "command timed out"))??,
            None => run.await?,
        };

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        })
    }
}
