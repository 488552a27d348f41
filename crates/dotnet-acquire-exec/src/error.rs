/// Result type alias for command-executor operations.
pub type Result<T> = std::result::Result<T, ExecError>;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to spawn '{root}': {source}")]
    Spawn {
        root: String,
        #[source]
        source: std::io::Error,
    },

    /// Running an elevated command under WSL is refused outright (spec
    /// §4.4: "under WSL, fail with `WSLSecurityError`").
    #[error("running '{root}' under sudo inside WSL is not supported")]
    WslSecurity { root: String },

    #[error("no candidate command succeeded out of {attempted} tried")]
    NoWorkingCommand { attempted: usize },

    #[error("command '{root}' timed out after {timeout_ms}ms")]
    Timeout { root: String, timeout_ms: u64 },
}
