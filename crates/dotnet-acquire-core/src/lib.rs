//! The Acquisition Worker crate: the public API and error taxonomy tying
//! together every other subsystem in this workspace (spec §4.6, §6).
//!
//! Consumers construct an [`AcquisitionWorker`] and call [`AcquisitionWorker::acquire`]
//! with an [`AcquireRequest`]; everything else (version resolution, the
//! install registry, concurrency control, distro dispatch, path validation)
//! happens underneath.

mod channel;
mod config;
mod error;
mod request;
mod resolve;
mod worker;

pub use config::{AcquisitionConfig, ScopedHomeOverride, DEFAULT_RELEASE_METADATA_BASE_URL};
pub use error::{AcquireError, Result};
pub use request::{AcquireRequest, AcquireResult};
pub use worker::AcquisitionWorker;

// Re-exported so callers can build requests without depending on the lower
// crates directly, matching the teacher's pattern of re-exporting the
// option/enum types a top-level `*-core` crate's public functions take
// (e.g. `vx-core` re-exporting `vx-versions::VersionSpec`).
pub use dotnet_acquire_paths::{InstallMode, InstallScope};
pub use dotnet_acquire_version::CompatibilityPolicy;
