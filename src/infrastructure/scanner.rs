//! Category-aware project file scanner
//!
//! Walks the project tree and buckets files into configured categories
//! by glob pattern. Reads filesystem metadata only, never file content -
//! hashing happens later in the lock manager.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::config::{LockConfig, LOCK_FILE_NAME};
use crate::domain::entities::normalize_lock_path;
use crate::error::{LockError, LockResult};

/// Metadata for a single scanned file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Project-relative path, forward slashes
    pub rel_path: String,
    pub size: u64,
    pub modified: SystemTime,
    /// Every category whose patterns matched; overlap is intentional
    pub categories: BTreeSet<String>,
}

/// Scan the project tree under the configured category globs.
///
/// Ignored directories (`node_modules`, `dist`, ...) are skipped even
/// when a category pattern would match inside them. Files matching no
/// category are not returned.
pub fn scan_project_files(config: &LockConfig) -> LockResult<BTreeMap<PathBuf, ScannedFile>> {
    let matchers = build_matchers(config)?;
    let root = &config.project_root;
    // owned set: the filter closure must be 'static
    let ignored: BTreeSet<String> = config.ignore.iter().cloned().collect();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_some_and(|t| t.is_dir())
                && ignored.contains(name.as_ref() as &str))
        })
        .build();

    let mut scanned = BTreeMap::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // unreadable entries are skipped, not fatal
            Err(_) => continue,
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let rel = match path.strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let rel_path = normalize_lock_path(rel);

        if is_engine_artifact(&rel_path) {
            continue;
        }

        let categories: BTreeSet<String> = matchers
            .iter()
            .filter(|(_, set)| set.is_match(Path::new(&rel_path)))
            .map(|(name, _)| name.clone())
            .collect();
        if categories.is_empty() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        scanned.insert(
            path.to_path_buf(),
            ScannedFile {
                path: path.to_path_buf(),
                rel_path,
                size: metadata.len(),
                modified,
                categories,
            },
        );
    }

    Ok(scanned)
}

/// The lock file and its backups never track themselves.
fn is_engine_artifact(rel_path: &str) -> bool {
    rel_path == LOCK_FILE_NAME || rel_path.starts_with("kgen.lock.json.backup.")
}

fn build_matchers(config: &LockConfig) -> LockResult<Vec<(String, GlobSet)>> {
    let mut matchers = Vec::with_capacity(config.categories.len());
    for category in &config.categories {
        let mut builder = GlobSetBuilder::new();
        for pattern in &category.patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| LockError::InvalidPattern {
                    category: category.name.clone(),
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| LockError::InvalidPattern {
            category: category.name.clone(),
            pattern: category.patterns.join(", "),
            message: e.to_string(),
        })?;
        matchers.push((category.name.clone(), set));
    }
    Ok(matchers)
}
