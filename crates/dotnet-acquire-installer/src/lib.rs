//! Script-based Local Installer and channel-index-driven Global Installer
//! for acquiring the .NET runtime/SDK.

mod channel_index;
mod error;
mod global;
mod local;
mod sanitize;

pub use channel_index::{select_installer_file, ChannelIndex, InstallerFile, Release};
pub use error::{InstallerError, Result};
pub use global::GlobalInstaller;
pub use local::LocalInstaller;
pub use sanitize::sanitize_user_name;
