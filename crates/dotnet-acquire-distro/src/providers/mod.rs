mod debian;
mod generic;
mod redhat;

pub use debian::DebianProvider;
pub use generic::GenericProvider;
pub use redhat::RedHatProvider;
