//! Lock file manager
//!
//! Orchestrates scanning, hashing and the Git snapshot into a versioned
//! lock document, and diffs the current project state against the
//! persisted baseline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::application::git_ops::GitIntegration;
use crate::config::LockConfig;
use crate::domain::entities::{
    is_compatible_version, validate_lock_document, FileRecord, GitInfo, Integrity, LockDocument,
    ProjectInfo, LOCK_VERSION,
};
use crate::domain::ports::VcsClient;
use crate::domain::services::{diff_file_maps, hash_category, hash_combined, Comparison};
use crate::domain::value_objects::ContentHash;
use crate::error::LockResult;
use crate::infrastructure::lock_store::LockStore;
use crate::infrastructure::scanner::scan_project_files;
use crate::infrastructure::vcs::GitCli;

/// Orchestrates lock document generation, persistence and comparison
pub struct LockManager<C: VcsClient> {
    config: LockConfig,
    store: LockStore,
    git: GitIntegration<C>,
}

impl LockManager<GitCli> {
    /// Manager backed by the real git binary
    pub fn new(config: LockConfig) -> Self {
        let vcs = GitCli::new(&config.project_root);
        Self::with_vcs(config, vcs)
    }
}

impl<C: VcsClient> LockManager<C> {
    /// Manager with an injected VcsClient (used by tests)
    pub fn with_vcs(config: LockConfig, vcs: C) -> Self {
        let store = LockStore::new(config.lock_path());
        let git = GitIntegration::new(vcs, &config.project_root);
        Self { config, store, git }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    pub fn git(&self) -> &GitIntegration<C> {
        &self.git
    }

    /// Scan, hash and snapshot into a fully populated lock document.
    /// Never writes to disk.
    pub fn generate(&self) -> LockResult<LockDocument> {
        let scanned = scan_project_files(&self.config)?;

        let mut categories: BTreeMap<String, BTreeMap<String, FileRecord>> = self
            .config
            .categories
            .iter()
            .map(|spec| (spec.name.clone(), BTreeMap::new()))
            .collect();

        for file in scanned.values() {
            let hash = ContentHash::from_file(&file.path)?;
            let modified: DateTime<Utc> = file.modified.into();
            let record = FileRecord {
                hash: hash.to_string(),
                size: file.size,
                modified: modified.to_rfc3339_opts(SecondsFormat::Secs, true),
            };
            for category in &file.categories {
                if let Some(records) = categories.get_mut(category) {
                    records.insert(file.rel_path.clone(), record.clone());
                }
            }
        }

        // component hashes in configured category order; the order is
        // part of the combined digest
        let ordered: Vec<(String, String)> = self
            .config
            .categories
            .iter()
            .map(|spec| {
                let records = categories.get(&spec.name).expect("category pre-seeded");
                (spec.name.clone(), hash_category(records).to_string())
            })
            .collect();
        let combined =
            hash_combined(ordered.iter().map(|(n, h)| (n.as_str(), h.as_str()))).to_string();

        let timestamp = self.now_timestamp();
        let git = {
            let status = self.git.status();
            if status.is_repo {
                Some(GitInfo {
                    commit: status.commit,
                    branch: status.branch,
                    dirty: status.dirty,
                    timestamp: timestamp.clone(),
                })
            } else {
                None
            }
        };

        Ok(LockDocument {
            version: LOCK_VERSION.to_string(),
            timestamp,
            project: ProjectInfo {
                name: self.config.project_name.clone(),
                version: self.config.project_version.clone(),
            },
            git,
            integrity: Integrity {
                combined,
                components: ordered.into_iter().collect(),
            },
            files: categories,
        })
    }

    /// Persist a lock document atomically; returns the backup path when
    /// one was taken.
    pub fn update(&self, document: &LockDocument, backup: bool) -> LockResult<Option<PathBuf>> {
        self.store.save(document, backup)
    }

    /// Load the persisted lock document; `None` when absent.
    pub fn load(&self) -> LockResult<Option<LockDocument>> {
        self.store.load()
    }

    /// Diff the current project state against the persisted baseline.
    pub fn compare(&self) -> LockResult<Comparison> {
        let Some(baseline) = self.store.load()? else {
            return Ok(Comparison::no_lock());
        };
        let current = self.generate()?;
        let changes = diff_file_maps(&baseline.file_hashes(), &current.file_hashes());
        Ok(Comparison::from_changes(changes))
    }

    /// Version gate: compatible iff the major component matches.
    pub fn is_compatible_version(version: &str) -> bool {
        is_compatible_version(version)
    }

    /// Schema validation over raw JSON; fails on the first missing field.
    pub fn validate_lock_file(value: &serde_json::Value) -> LockResult<()> {
        validate_lock_document(value)
    }

    fn now_timestamp(&self) -> String {
        let now = match self.config.clock_override {
            Some(epoch) => DateTime::from_timestamp(epoch, 0).unwrap_or_else(Utc::now),
            None => Utc::now(),
        };
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FakeVcs;
    use crate::domain::services::{ChangeKind, DriftStatus};
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn manager(root: &Path) -> LockManager<FakeVcs> {
        let config = LockConfig::new(root).with_clock_override(Some(1_700_000_000));
        LockManager::with_vcs(config, FakeVcs::not_a_repo())
    }

    #[test]
    fn generate_buckets_files_under_category_keys() {
        let dir = tempdir().unwrap();
        write(dir.path(), "templates/page.njk", "{{ title }}");
        write(dir.path(), "rules/validation.n3", "rule");
        write(dir.path(), "data.ttl", "graph");

        let doc = manager(dir.path()).generate().unwrap();

        assert!(doc.files["templates"].contains_key("templates/page.njk"));
        assert!(doc.files["rules"].contains_key("rules/validation.n3"));
        assert!(doc.files["graphs"].contains_key("data.ttl"));
        assert_eq!(doc.file_count(), 3);
    }

    #[test]
    fn generate_records_component_per_configured_category() {
        let dir = tempdir().unwrap();
        let doc = manager(dir.path()).generate().unwrap();

        let keys: Vec<&str> = doc
            .integrity
            .components
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["graphs", "rules", "templates"]);
        assert!(doc.integrity.combined.starts_with("sha256:"));
    }

    #[test]
    fn overlapping_file_appears_in_both_category_maps() {
        let dir = tempdir().unwrap();
        write(dir.path(), "rules/shapes.ttl", "shape");

        let doc = manager(dir.path()).generate().unwrap();

        assert!(doc.files["rules"].contains_key("rules/shapes.ttl"));
        assert!(doc.files["graphs"].contains_key("rules/shapes.ttl"));
        assert_eq!(
            doc.files["rules"]["rules/shapes.ttl"].hash,
            doc.files["graphs"]["rules/shapes.ttl"].hash
        );
    }

    #[test]
    fn generate_is_deterministic_under_clock_override() {
        let dir = tempdir().unwrap();
        write(dir.path(), "data.ttl", "graph");

        let mgr = manager(dir.path());
        let a = mgr.generate().unwrap();
        let b = mgr.generate().unwrap();

        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.integrity.combined, b.integrity.combined);
    }

    #[test]
    fn clock_override_maps_epoch_to_rfc3339() {
        let dir = tempdir().unwrap();
        let config = LockConfig::new(dir.path()).with_clock_override(Some(0));
        let mgr = LockManager::with_vcs(config, FakeVcs::not_a_repo());

        let doc = mgr.generate().unwrap();
        assert_eq!(doc.timestamp, "1970-01-01T00:00:00Z");
    }

    #[test]
    fn generate_outside_repository_has_no_git_block() {
        let dir = tempdir().unwrap();
        let doc = manager(dir.path()).generate().unwrap();
        assert!(doc.git.is_none());
    }

    #[test]
    fn generate_embeds_git_snapshot_when_in_repo() {
        let dir = tempdir().unwrap();
        let config = LockConfig::new(dir.path()).with_clock_override(Some(1_700_000_000));
        let mgr = LockManager::with_vcs(config, FakeVcs::repo());

        let doc = mgr.generate().unwrap();
        let git = doc.git.unwrap();
        assert_eq!(
            git.commit.as_deref(),
            Some("0123456789abcdef0123456789abcdef01234567")
        );
        assert_eq!(git.branch.as_deref(), Some("main"));
        assert!(!git.dirty);
        assert_eq!(git.timestamp, doc.timestamp);
    }

    #[test]
    fn compare_without_baseline_reports_no_lock() {
        let dir = tempdir().unwrap();
        let cmp = manager(dir.path()).compare().unwrap();
        assert_eq!(cmp.status, DriftStatus::NoLock);
    }

    #[test]
    fn generate_update_compare_is_clean() {
        let dir = tempdir().unwrap();
        write(dir.path(), "data.ttl", "graph");

        let mgr = manager(dir.path());
        let doc = mgr.generate().unwrap();
        mgr.update(&doc, true).unwrap();

        let cmp = mgr.compare().unwrap();
        assert_eq!(cmp.status, DriftStatus::Clean);
        assert!(cmp.changes.is_empty());
    }

    #[test]
    fn added_file_detected_as_drift() {
        let dir = tempdir().unwrap();
        write(dir.path(), "data.ttl", "graph");

        let mgr = manager(dir.path());
        let doc = mgr.generate().unwrap();
        mgr.update(&doc, true).unwrap();

        write(dir.path(), "extra.ttl", "more");
        let cmp = mgr.compare().unwrap();

        assert_eq!(cmp.status, DriftStatus::Drift);
        assert_eq!(cmp.changes.len(), 1);
        assert_eq!(cmp.changes[0].kind, ChangeKind::Added);
        assert_eq!(cmp.changes[0].file, "extra.ttl");
    }

    #[test]
    fn modified_file_detected_as_drift() {
        let dir = tempdir().unwrap();
        write(dir.path(), "data.ttl", "graph");

        let mgr = manager(dir.path());
        mgr.update(&mgr.generate().unwrap(), true).unwrap();

        write(dir.path(), "data.ttl", "changed");
        let cmp = mgr.compare().unwrap();

        assert_eq!(cmp.changes[0].kind, ChangeKind::Modified);
        assert_eq!(cmp.changes[0].file, "data.ttl");
    }

    #[test]
    fn removed_file_detected_as_drift() {
        let dir = tempdir().unwrap();
        write(dir.path(), "data.ttl", "graph");

        let mgr = manager(dir.path());
        mgr.update(&mgr.generate().unwrap(), true).unwrap();

        std::fs::remove_file(dir.path().join("data.ttl")).unwrap();
        let cmp = mgr.compare().unwrap();

        assert_eq!(cmp.changes[0].kind, ChangeKind::Removed);
        assert_eq!(cmp.changes[0].file, "data.ttl");
    }

    #[test]
    fn update_backs_up_previous_lock() {
        let dir = tempdir().unwrap();
        write(dir.path(), "data.ttl", "graph");

        let mgr = manager(dir.path());
        mgr.update(&mgr.generate().unwrap(), true).unwrap();
        let backup = mgr.update(&mgr.generate().unwrap(), true).unwrap();

        assert!(backup.is_some());
        assert!(backup.unwrap().exists());
    }

    #[test]
    fn version_gate_delegates_to_entities() {
        assert!(LockManager::<FakeVcs>::is_compatible_version("2.0.0"));
        assert!(LockManager::<FakeVcs>::is_compatible_version("2.99.99"));
        assert!(!LockManager::<FakeVcs>::is_compatible_version("1.0.0"));
        assert!(!LockManager::<FakeVcs>::is_compatible_version("3.0.0"));
    }

    #[test]
    fn mtime_changes_alone_do_not_drift() {
        let dir = tempdir().unwrap();
        write(dir.path(), "data.ttl", "graph");

        let mgr = manager(dir.path());
        mgr.update(&mgr.generate().unwrap(), true).unwrap();

        // rewrite identical content; only metadata changes
        write(dir.path(), "data.ttl", "graph");
        let cmp = mgr.compare().unwrap();

        assert_eq!(cmp.status, DriftStatus::Clean);
    }
}
