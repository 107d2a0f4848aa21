//! Error types for kgen-lock
//!
//! Uses `thiserror` for library errors. Expected, recoverable states
//! (no repository, no lock file, nothing to commit) are represented as
//! typed result values elsewhere; only contract violations live here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lock engine operations
pub type LockResult<T> = Result<T, LockError>;

/// Main error type for lock engine operations
#[derive(Error, Debug)]
pub enum LockError {
    /// Lock file content is not valid JSON
    #[error("Failed to load lock file: {0}")]
    Malformed(String),

    /// Lock file major version does not match the engine's
    #[error("Incompatible lock file version: {0}")]
    IncompatibleVersion(String),

    /// Required top-level field is absent
    #[error("Lock file missing required field: {0}")]
    MissingField(&'static str),

    /// Version field does not parse as a semantic version
    #[error("Invalid lock file version: {0}")]
    InvalidVersion(String),

    /// Category glob pattern failed to compile
    #[error("invalid glob pattern '{pattern}' in category '{category}': {message}")]
    InvalidPattern {
        category: String,
        pattern: String,
        message: String,
    },

    /// Project configuration file could not be parsed
    #[error("invalid configuration in {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
