//! Domain ports (interfaces to the outside world)

mod vcs_client;

pub use vcs_client::{VcsClient, VcsError, VcsResult};

#[cfg(test)]
pub use vcs_client::FakeVcs;
