//! Git integration for the lock engine
//!
//! Wraps the VcsClient port into the higher-level operations the CLI
//! exposes: status snapshots, config-file tracking, history, commits and
//! blame over the lock file. Expected states (not a repository, nothing
//! to commit, missing paths) surface as typed result values.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{CONFIG_FILE_NAME, LOCK_FILE_NAME};
use crate::domain::ports::{VcsClient, VcsError, VcsResult};

/// Config files tracked by default when none are named
pub const DEFAULT_CONFIG_FILES: &[&str] = &[CONFIG_FILE_NAME, LOCK_FILE_NAME, ".kgenrc"];

/// Snapshot of repository state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GitStatus {
    pub is_repo: bool,
    pub commit: Option<String>,
    pub short_commit: Option<String>,
    pub branch: Option<String>,
    pub dirty: bool,
    pub tags: Vec<String>,
    pub config_files: Vec<String>,
    /// Raw command error when a sub-step failed on a valid repository
    /// (e.g. HEAD resolution before the first commit)
    pub error: Option<String>,
}

/// Outcome of staging config files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackResult {
    pub success: bool,
    pub tracked: Vec<String>,
    /// Requested paths that do not exist on disk; they never fail the batch
    pub skipped: Vec<String>,
    pub error: Option<String>,
}

/// Staged and worktree changes to tracked config files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigChanges {
    pub has_changes: bool,
    pub modified: Vec<String>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
}

/// One commit touching the lock file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub email: Option<String>,
    pub date: Option<String>,
}

/// Outcome of a commit attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitOutcome {
    pub success: bool,
    pub committed: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// One attributed line of the lock file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlameLine {
    pub hash: String,
    pub author: String,
    pub line: usize,
    pub content: String,
}

/// Outcome of a blame request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlameResult {
    pub success: bool,
    pub blame: Vec<BlameLine>,
    pub error: Option<String>,
}

/// Git operations over a VcsClient
pub struct GitIntegration<C: VcsClient> {
    vcs: C,
    root: PathBuf,
}

impl<C: VcsClient> GitIntegration<C> {
    pub fn new(vcs: C, root: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            root: root.into(),
        }
    }

    pub fn is_git_repository(&self) -> bool {
        self.vcs.git_dir().is_ok()
    }

    /// Capture the current repository snapshot.
    ///
    /// A directory that is not a repository (or a missing git binary)
    /// yields `is_repo: false`. A repository whose HEAD cannot be
    /// resolved (no commits yet) keeps `is_repo: true` and carries the
    /// raw command error.
    pub fn status(&self) -> GitStatus {
        match self.vcs.git_dir() {
            Ok(_) => {}
            Err(VcsError::NotARepository) | Err(VcsError::BinaryMissing) => {
                return GitStatus::default();
            }
            Err(e) => {
                return GitStatus {
                    error: Some(e.to_string()),
                    ..GitStatus::default()
                };
            }
        }

        let mut status = GitStatus {
            is_repo: true,
            ..GitStatus::default()
        };

        match self.vcs.head_commit() {
            Ok(commit) => {
                status.short_commit = Some(commit.chars().take(8).collect());
                status.commit = Some(commit);
            }
            Err(e) => status.error = Some(e.to_string()),
        }

        status.branch = self.vcs.branch().ok();
        status.dirty = self
            .vcs
            .porcelain_status()
            .map(|out| !out.trim().is_empty())
            .unwrap_or(false);
        status.tags = self.vcs.tags_at_head().unwrap_or_default();
        status.config_files = self.tracked_config_files();

        status
    }

    /// Tracked files with config-like names, per `ls-files`.
    pub fn tracked_config_files(&self) -> Vec<String> {
        self.vcs
            .ls_files()
            .unwrap_or_default()
            .into_iter()
            .filter(|path| is_config_file(path))
            .collect()
    }

    /// Stage config files. Missing paths are skipped, never fatal.
    pub fn track_config_files(&self, files: Option<&[String]>) -> TrackResult {
        if !self.is_git_repository() {
            return TrackResult {
                error: Some(VcsError::NotARepository.to_string()),
                ..TrackResult::default()
            };
        }

        let requested: Vec<String> = match files {
            Some(files) => files.to_vec(),
            None => DEFAULT_CONFIG_FILES.iter().map(|f| f.to_string()).collect(),
        };

        let mut tracked = Vec::new();
        let mut skipped = Vec::new();
        for file in requested {
            if self.root.join(&file).exists() {
                tracked.push(file);
            } else {
                skipped.push(file);
            }
        }

        if !tracked.is_empty() {
            if let Err(e) = self.vcs.add(&tracked) {
                return TrackResult {
                    tracked,
                    skipped,
                    error: Some(e.to_string()),
                    ..TrackResult::default()
                };
            }
        }

        TrackResult {
            success: true,
            tracked,
            skipped,
            error: None,
        }
    }

    /// Diff staged and worktree state for config files.
    pub fn config_changes(&self) -> VcsResult<ConfigChanges> {
        let staged = self.vcs.staged_names()?;
        let worktree = self.vcs.worktree_names()?;

        let mut modified = BTreeSet::new();
        let mut added = BTreeSet::new();
        let mut deleted = BTreeSet::new();

        // name-status records are tab-separated: `M\tpath`, and for
        // renames/copies `R100\told\tnew`; paths may contain spaces
        for output in [&staged, &worktree] {
            for line in output.lines() {
                let mut parts = line.split('\t');
                let Some(kind) = parts.next() else {
                    continue;
                };
                match kind.chars().next() {
                    Some('M') => {
                        if let Some(path) = parts.next().filter(|p| is_config_file(p)) {
                            modified.insert(path.to_string());
                        }
                    }
                    Some('A') => {
                        if let Some(path) = parts.next().filter(|p| is_config_file(p)) {
                            added.insert(path.to_string());
                        }
                    }
                    Some('D') => {
                        if let Some(path) = parts.next().filter(|p| is_config_file(p)) {
                            deleted.insert(path.to_string());
                        }
                    }
                    Some('R') => {
                        let old = parts.next();
                        let new = parts.next();
                        if let Some(old) = old.filter(|p| is_config_file(p)) {
                            deleted.insert(old.to_string());
                        }
                        if let Some(new) = new.filter(|p| is_config_file(p)) {
                            added.insert(new.to_string());
                        }
                    }
                    Some('C') => {
                        let _source = parts.next();
                        if let Some(new) = parts.next().filter(|p| is_config_file(p)) {
                            added.insert(new.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        let changes = ConfigChanges {
            has_changes: !(modified.is_empty() && added.is_empty() && deleted.is_empty()),
            modified: modified.into_iter().collect(),
            added: added.into_iter().collect(),
            deleted: deleted.into_iter().collect(),
        };
        Ok(changes)
    }

    /// Commits touching the lock file, newest first. Never fails: a
    /// missing history or a failed log command yields an empty list.
    pub fn lock_file_history(&self, limit: usize) -> Vec<HistoryEntry> {
        let output = match self.vcs.file_log(LOCK_FILE_NAME, limit) {
            Ok(output) => output,
            Err(_) => return Vec::new(),
        };

        output
            .lines()
            .filter_map(|line| {
                let mut parts = line.split('\0');
                let hash = parts.next()?.to_string();
                if hash.is_empty() {
                    return None;
                }
                let message = parts.next().unwrap_or_default().to_string();
                let author = parts.next().unwrap_or_default().to_string();
                let email = parts.next().map(|s| s.to_string()).filter(|s| !s.is_empty());
                let date = parts.next().map(|s| s.to_string()).filter(|s| !s.is_empty());
                Some(HistoryEntry {
                    hash,
                    message,
                    author,
                    email,
                    date,
                })
            })
            .collect()
    }

    /// Stage config files and commit them, skipping the commit entirely
    /// when nothing is staged (an empty commit would itself fail).
    pub fn commit_config_changes(&self, message: Option<&str>) -> CommitOutcome {
        if !self.is_git_repository() {
            return CommitOutcome {
                error: Some(VcsError::NotARepository.to_string()),
                ..CommitOutcome::default()
            };
        }

        let track = self.track_config_files(None);
        if !track.success {
            return CommitOutcome {
                error: track.error,
                ..CommitOutcome::default()
            };
        }

        match self.vcs.staged_names() {
            Ok(staged) if staged.trim().is_empty() => {
                return CommitOutcome {
                    success: true,
                    committed: false,
                    message: Some("No configuration changes to commit".to_string()),
                    error: None,
                };
            }
            Ok(_) => {}
            Err(e) => {
                return CommitOutcome {
                    error: Some(e.to_string()),
                    ..CommitOutcome::default()
                };
            }
        }

        let message = message.unwrap_or("chore: update kgen configuration");
        match self.vcs.commit(message) {
            Ok(output) => CommitOutcome {
                success: true,
                committed: true,
                message: Some(output),
                error: None,
            },
            Err(e) => CommitOutcome {
                error: Some(e.to_string()),
                ..CommitOutcome::default()
            },
        }
    }

    /// Line-level attribution over the lock file.
    pub fn lock_file_blame(&self) -> BlameResult {
        if !self.root.join(LOCK_FILE_NAME).exists() {
            return BlameResult {
                error: Some("Lock file does not exist".to_string()),
                ..BlameResult::default()
            };
        }

        match self.vcs.blame_porcelain(LOCK_FILE_NAME) {
            Ok(output) => BlameResult {
                success: true,
                blame: parse_line_porcelain(&output),
                error: None,
            },
            Err(e) => BlameResult {
                error: Some(e.to_string()),
                ..BlameResult::default()
            },
        }
    }
}

/// Config-like file names tracked by the engine
fn is_config_file(path: &str) -> bool {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    DEFAULT_CONFIG_FILES.contains(&name.as_str())
        || name.ends_with(".config.json")
        || name.ends_with(".config.toml")
        || name.ends_with(".config.yaml")
        || name.ends_with(".config.js")
        || name.ends_with(".config.mjs")
}

/// Parse `blame --line-porcelain` output.
///
/// Each record is a header `<hash> <orig-line> <final-line> [count]`,
/// followed by attribute lines (`author `, `committer `, ...) and one
/// tab-prefixed content line.
fn parse_line_porcelain(output: &str) -> Vec<BlameLine> {
    let mut lines = Vec::new();
    let mut hash = String::new();
    let mut author = String::new();
    let mut line_no = 0usize;

    for raw in output.lines() {
        if let Some(content) = raw.strip_prefix('\t') {
            lines.push(BlameLine {
                hash: hash.clone(),
                author: author.clone(),
                line: line_no,
                content: content.to_string(),
            });
            continue;
        }

        if let Some(name) = raw.strip_prefix("author ") {
            author = name.to_string();
            continue;
        }

        let fields: Vec<&str> = raw.split(' ').collect();
        if (fields.len() == 3 || fields.len() == 4)
            && fields[0].len() == 40
            && fields[0].chars().all(|c| c.is_ascii_hexdigit())
        {
            hash = fields[0].to_string();
            line_no = fields[2].parse().unwrap_or(0);
        }
    }

    lines
}
