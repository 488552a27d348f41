use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A command to run: a root executable plus arguments, optionally requiring
/// elevation (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub root: String,
    pub args: Vec<String>,
    pub run_under_sudo: bool,
}

impl Command {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            args: Vec::new(),
            run_under_sudo: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn under_sudo(mut self) -> Self {
        self.run_under_sudo = true;
        self
    }

    pub fn pretty(&self) -> String {
        if self.args.is_empty() {
            self.root.clone()
        } else {
            format!("{} {}", self.root, self.args.join(" "))
        }
    }
}

/// Per-call execution options.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub cwd: Option<std::path::PathBuf>,
    pub env: HashMap<String, String>,
    pub timeout: Option<Duration>,
    /// When set, results are memoized in the shared cache under this TTL
    /// (spec §4.4 `dotnetInstallToolCacheTtlMs`).
    pub dotnet_install_tool_cache_ttl_ms: Option<u64>,
}

impl ExecuteOptions {
    /// JSON view used to build the cache key (env keys only, per
    /// `dotnet_acquire_cache::minimise_env`).
    pub fn as_cache_json(&self) -> serde_json::Value {
        serde_json::json!({
            "env": self.env,
            "cwd": self.cwd,
        })
    }
}

/// Outcome of running a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}
