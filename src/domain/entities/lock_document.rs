//! Lock document entity
//!
//! The lock document is the persisted manifest: project metadata, a Git
//! snapshot, per-category file records and integrity digests. It is a pure
//! data structure - persistence lives in `infrastructure::lock_store`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LockError, LockResult};

/// Current lock format version written by this engine
pub const LOCK_VERSION: &str = "2.0.0";

/// Major version accepted on load; minor/patch float freely within it
pub const LOCK_MAJOR: u64 = 2;

/// Normalize a path for lock file storage (always forward slashes).
pub fn normalize_lock_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Project metadata recorded at generation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
}

/// Git state captured at generation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub branch: Option<String>,
    pub dirty: bool,
    pub timestamp: String,
}

/// Integrity digests: one per category plus the combined project hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integrity {
    pub combined: String,
    pub components: BTreeMap<String, String>,
}

/// Per-file record inside a category map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub hash: String,
    pub size: u64,
    pub modified: String,
}

/// The persisted lock manifest
///
/// Category maps serialize as top-level keys (`templates`, `rules`, ...)
/// next to `integrity`, keyed by project-relative forward-slash paths. A
/// file may appear under several categories when its path matches more
/// than one configured glob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockDocument {
    pub version: String,
    pub timestamp: String,
    pub project: ProjectInfo,
    #[serde(default)]
    pub git: Option<GitInfo>,
    pub integrity: Integrity,
    #[serde(flatten, default)]
    pub files: BTreeMap<String, BTreeMap<String, FileRecord>>,
}

impl LockDocument {
    /// Flatten every category map into a single `path -> hash` view.
    ///
    /// A path listed under several categories carries the same content
    /// hash in each, so the flattened map is well defined.
    pub fn file_hashes(&self) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();
        for records in self.files.values() {
            for (path, record) in records {
                flat.insert(path.clone(), record.hash.clone());
            }
        }
        flat
    }

    /// Total number of distinct tracked paths
    pub fn file_count(&self) -> usize {
        self.file_hashes().len()
    }
}

/// Check whether a lock file version is readable by this engine.
///
/// Compatible iff the major component equals [`LOCK_MAJOR`]; unparseable
/// versions are incompatible.
pub fn is_compatible_version(version: &str) -> bool {
    match semver::Version::parse(version) {
        Ok(v) => v.major == LOCK_MAJOR,
        Err(_) => false,
    }
}

/// Validate the raw JSON shape of a lock document before deserializing.
///
/// Fails closed on the first missing required field, and on a version
/// value that does not parse as a semantic version.
pub fn validate_lock_document(value: &serde_json::Value) -> LockResult<()> {
    match value.get("version").and_then(|v| v.as_str()) {
        Some(version) => {
            if semver::Version::parse(version).is_err() {
                return Err(LockError::InvalidVersion(version.to_string()));
            }
        }
        None => return Err(LockError::MissingField("version")),
    }

    for field in ["timestamp", "project", "integrity"] {
        if value.get(field).is_none() {
            return Err(LockError::MissingField(field));
        }
    }

    Ok(())
}
