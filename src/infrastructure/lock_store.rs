//! Lock file persistence
//!
//! Reads and writes `kgen.lock.json` with atomic writes and optional
//! timestamped backups. Validation and version gating happen here, on
//! the raw JSON, before deserialization.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::entities::{
    is_compatible_version, validate_lock_document, LockDocument,
};
use crate::error::{LockError, LockResult};
use crate::infrastructure::fs::atomic_write;

/// JSON lock document store
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the lock document.
    ///
    /// Returns `Ok(None)` when no lock file exists - that is a normal
    /// state, not an error. Malformed JSON, schema violations and
    /// incompatible versions fail closed.
    pub fn load(&self) -> LockResult<Option<LockDocument>> {
        if !self.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| LockError::Malformed(e.to_string()))?;

        validate_lock_document(&value)?;

        let version = value["version"].as_str().unwrap_or_default();
        if !is_compatible_version(version) {
            return Err(LockError::IncompatibleVersion(version.to_string()));
        }

        let document: LockDocument =
            serde_json::from_value(value).map_err(|e| LockError::Malformed(e.to_string()))?;
        Ok(Some(document))
    }

    /// Persist the lock document atomically.
    ///
    /// When `backup` is set and a lock file already exists, the old file
    /// is copied to `<name>.backup.<millis>` first. Returns the backup
    /// path when one was taken.
    pub fn save(&self, document: &LockDocument, backup: bool) -> LockResult<Option<PathBuf>> {
        let backup_path = if backup && self.exists() {
            let path = self.backup_path();
            std::fs::copy(&self.path, &path)?;
            Some(path)
        } else {
            None
        };

        let mut content = serde_json::to_string_pretty(document)
            .map_err(|e| LockError::Malformed(e.to_string()))?;
        content.push('\n');
        atomic_write(&self.path, content.as_bytes())?;

        Ok(backup_path)
    }

    fn backup_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "kgen.lock.json".to_string());
        self.path
            .with_file_name(format!("{}.backup.{}", name, Utc::now().timestamp_millis()))
    }
}
