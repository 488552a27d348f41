use crate::command::{Command, CommandResult, ExecuteOptions};
use crate::elevation::{is_wsl, AlwaysGrantElevation, ElevationPrompt};
use crate::error::{ExecError, Result};
use crate::runner::{ProcessRunner, TokioProcessRunner};
use dotnet_acquire_cache::InMemoryCache;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Executes commands, optionally under elevation, with memoization through
/// the shared [`InMemoryCache`] and recording of attempted commands for test
/// observation (spec §4.4).
pub struct CommandExecutor {
    runner: Arc<dyn ProcessRunner>,
    elevation: Arc<dyn ElevationPrompt>,
    cache: &'static InMemoryCache,
    attempted: Mutex<Vec<Command>>,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::with_runner(Arc::new(TokioProcessRunner), Arc::new(AlwaysGrantElevation))
    }

    pub fn with_runner(runner: Arc<dyn ProcessRunner>, elevation: Arc<dyn ElevationPrompt>) -> Self {
        Self::with_runner_and_cache(runner, elevation, InMemoryCache::global())
    }

    /// Construct an executor against an explicit cache instance — used by
    /// tests so cached command results from one test can't leak into
    /// another (Design Notes §9, "expose a `newForTest()` constructor").
    pub fn with_runner_and_cache(
        runner: Arc<dyn ProcessRunner>,
        elevation: Arc<dyn ElevationPrompt>,
        cache: &'static InMemoryCache,
    ) -> Self {
        Self {
            runner,
            elevation,
            cache,
            attempted: Mutex::new(Vec::new()),
        }
    }

    /// Commands attempted so far, in order — used by tests to assert on
    /// what the executor tried without mocking the OS process table.
    pub fn attempted_commands(&self) -> Vec<Command> {
        self.attempted.lock().unwrap().clone()
    }

    pub async fn execute(&self, cmd: &Command, options: &ExecuteOptions) -> Result<CommandResult> {
        self.attempted.lock().unwrap().push(cmd.clone());

        if cmd.run_under_sudo {
            if is_wsl() {
                return Err(ExecError::WslSecurity {
                    root: cmd.root.clone(),
                });
            }
            self.elevation
                .request(&cmd.pretty())
                .await
                .map_err(|source| ExecError::Spawn {
                    root: cmd.root.clone(),
                    source,
                })?;
        }

        if let Some(ttl_ms) = options.dotnet_install_tool_cache_ttl_ms {
            let cache_opts = options.as_cache_json();
            if let Some(cached) = self.cache.get_command(&cmd.root, &cmd.args, &cache_opts) {
                if let Ok(result) = serde_json::from_value::<CommandResult>(cached) {
                    debug!(cmd = %cmd.pretty(), "command result served from cache");
                    return Ok(result);
                }
            }

            let result = self.run_with_timeout(cmd, options).await?;
            if let Ok(value) = serde_json::to_value(&result) {
                self.cache.put_command(&cmd.root, &cmd.args, &cache_opts, value, ttl_ms);
            }
            return Ok(result);
        }

        self.run_with_timeout(cmd, options).await
    }

    async fn run_with_timeout(&self, cmd: &Command, options: &ExecuteOptions) -> Result<CommandResult> {
        match self.runner.run(cmd, options).await {
            Ok(result) => Ok(result),
            Err(source) if source.kind() == std::io::ErrorKind::TimedOut => Err(ExecError::Timeout {
                root: cmd.root.clone(),
                timeout_ms: options.timeout.map(|d| d.as_millis() as u64).unwrap_or(0),
            }),
            Err(source) => Err(ExecError::Spawn {
                root: cmd.root.clone(),
                source,
            }),
        }
    }

    /// Run each command in sequence, collecting every result (spec §4.4
    /// `executeMany`).
    pub async fn execute_many(&self, cmds: &[Command], options: &ExecuteOptions) -> Vec<Result<CommandResult>> {
        let mut results = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            results.push(self.execute(cmd, options).await);
        }
        results
    }

    /// Probe candidates in order, returning the first whose exit status is
    /// zero (or, if `predicate` is supplied, the first whose result
    /// satisfies it).
    pub async fn try_find_working_command(
        &self,
        candidates: &[Command],
        options: &ExecuteOptions,
        predicate: Option<&dyn Fn(&CommandResult) -> bool>,
    ) -> Result<Command> {
        for cmd in candidates {
            match self.execute(cmd, options).await {
                Ok(result) => {
                    let matches = predicate.map(|p| p(&result)).unwrap_or_else(|| result.success());
                    if matches {
                        return Ok(cmd.clone());
                    }
                }
                Err(err) => {
                    warn!(cmd = %cmd.pretty(), error = %err, "candidate command failed");
                }
            }
        }
        Err(ExecError::NoWorkingCommand {
            attempted: candidates.len(),
        })
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeRunner {
        calls: AtomicUsize,
        scripted: Vec<std::io::Result<CommandResult>>,
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(&self, _cmd: &Command, _options: &ExecuteOptions) -> std::io::Result<CommandResult> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.scripted[i] {
                Ok(r) => Ok(r.clone()),
                Err(e) => Err(std::io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn executor_with(results: Vec<std::io::Result<CommandResult>>) -> CommandExecutor {
        let runner = Arc::new(FakeRunner {
            calls: AtomicUsize::new(0),
            scripted: results,
        });
        let cache: &'static InMemoryCache = Box::leak(Box::new(InMemoryCache::new_for_test()));
        CommandExecutor::with_runner_and_cache(runner, Arc::new(AlwaysGrantElevation), cache)
    }

    fn ok(stdout: &str, status: i32) -> std::io::Result<CommandResult> {
        Ok(CommandResult {
            stdout: stdout.into(),
            stderr: String::new(),
            status,
        })
    }

    #[tokio::test]
    async fn records_attempted_commands() {
        let executor = executor_with(vec![ok("hi", 0)]);
        let cmd = Command::new("dotnet").arg("--info");
        executor.execute(&cmd, &ExecuteOptions::default()).await.unwrap();
        assert_eq!(executor.attempted_commands(), vec![cmd]);
    }

    #[tokio::test]
    async fn try_find_working_command_picks_first_success() {
        let executor = executor_with(vec![ok("", 1), ok("found", 0)]);
        let candidates = vec![Command::new("a"), Command::new("b")];
        let winner = executor
            .try_find_working_command(&candidates, &ExecuteOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(winner.root, "b");
    }

    #[tokio::test]
    async fn try_find_working_command_uses_predicate() {
        let executor = executor_with(vec![ok("", 0), ok("nonempty", 0)]);
        let candidates = vec![Command::new("a"), Command::new("b")];
        let predicate: &dyn Fn(&CommandResult) -> bool = &|r| !r.stdout.is_empty();
        let winner = executor
            .try_find_working_command(&candidates, &ExecuteOptions::default(), Some(predicate))
            .await
            .unwrap();
        assert_eq!(winner.root, "b");
    }

    #[tokio::test]
    async fn sudo_under_wsl_is_refused() {
        std::env::set_var("WSL_DISTRO_NAME", "Ubuntu");
        let executor = executor_with(vec![ok("", 0)]);
        let cmd = Command::new("dotnet-install").under_sudo();
        let err = executor.execute(&cmd, &ExecuteOptions::default()).await.unwrap_err();
        assert!(matches!(err, ExecError::WslSecurity { .. }));
        std::env::remove_var("WSL_DISTRO_NAME");
    }

    #[tokio::test]
    async fn caches_result_when_ttl_supplied() {
        let executor = executor_with(vec![ok("cached", 0)]);
        let cmd = Command::new("dotnet").arg("--list-sdks");
        let mut options = ExecuteOptions::default();
        options.dotnet_install_tool_cache_ttl_ms = Some(60_000);
        let first = executor.execute(&cmd, &options).await.unwrap();
        // second call must not reach the runner (only one scripted result)
        let second = executor.execute(&cmd, &options).await.unwrap();
        assert_eq!(first, second);
    }
}
