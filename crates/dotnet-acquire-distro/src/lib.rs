//! Linux distribution detection and distro-aware `dotnet` install dispatch.

mod decision;
mod error;
mod factory;
mod feed;
mod osrelease;
mod provider;
mod providers;
mod support;

pub use decision::{validate_and_install_sdk, OK_ALREADY_EXISTS, OK_UPDATE};
pub use error::{DistroError, Result};
pub use factory::select_provider;
pub use feed::FeedTemplate;
pub use osrelease::{detect, DistroVersionPair, SYSTEM_INFO_CACHE_TTL_MS};
pub use provider::{DistroProvider, DotnetMode};
pub use providers::{DebianProvider, GenericProvider, RedHatProvider};
pub use support::SupportStatus;
