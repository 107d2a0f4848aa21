//! Infrastructure layer: filesystem, subprocess, persistence

pub mod fs;
pub mod lock_store;
pub mod scanner;
pub mod vcs;

pub use lock_store::LockStore;
pub use scanner::{scan_project_files, ScannedFile};
pub use vcs::GitCli;
