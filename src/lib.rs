//! kgen-lock - deterministic lock file and drift detection for KGEN projects
//!
//! Scans a project's templates, rules and graph files, hashes them into a
//! versioned `kgen.lock.json` document, and diffs the current project state
//! against that baseline. Ships with Git integration for tracking, committing
//! and auditing the lock and configuration files.
//!
//! The crate is layered hexagonally:
//!
//! - [`domain`] holds the pure types and services: content hashes, the lock
//!   document entity, drift comparison and the version-control port.
//! - [`infrastructure`] adapts the outside world: the filesystem scanner,
//!   the git subprocess client and the atomic lock store.
//! - [`application`] wires them into use cases behind [`LockManager`] and
//!   [`GitIntegration`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{GitIntegration, LockManager};
pub use config::LockConfig;
pub use domain::entities::{LockDocument, LOCK_VERSION};
pub use domain::services::{Change, ChangeKind, Comparison, DriftStatus};
pub use domain::value_objects::ContentHash;
pub use error::{LockError, LockResult};
