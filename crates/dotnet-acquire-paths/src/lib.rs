//! On-disk install layout and `dotnet` host discovery (spec §3, §4.10, §6).

mod finder;
mod identity;
mod layout;

pub use finder::{HostInfo, PathFinder, RuntimeEntry, SdkEntry, DOTNET_INFO_TTL_MS};
pub use identity::{InstallIdentity, InstallMode, InstallScope};
pub use layout::StorageLayout;
