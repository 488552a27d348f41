//! Error types for version parsing and comparison.

/// Result type alias for version operations.
pub type Result<T> = std::result::Result<T, VersionError>;

/// Errors that can occur while parsing or classifying a version string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VersionError {
    /// The input string does not match any of the accepted version shapes
    /// (`M`, `M.m`, `M.m.Fxx`, `M.m.Fpp[-tag]`).
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },
}
