/// Result type alias for install-tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("I/O error touching the install registry: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialise the install registry: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("'{}' does not hold a dotnet executable", path.display())]
    InvalidInstallPath { path: std::path::PathBuf },

    #[error("failed to acquire the cross-process modifier lock: {reason}")]
    LockFailed { reason: String },
}
