//! Drift comparator
//!
//! Pure diff over two `path -> hash` maps. No I/O; same inputs always
//! produce the same ordered change list (sorted by path).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Outcome of comparing the current project state against the lock file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriftStatus {
    /// Lock file matches the current project state
    Clean,
    /// At least one file was added, modified or removed
    Drift,
    /// No baseline lock file exists
    NoLock,
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Drift => write!(f, "drift"),
            Self::NoLock => write!(f, "no-lock"),
        }
    }
}

/// Kind of change detected for a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// A single detected change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Project-relative path, forward slashes
    pub file: String,
}

/// Full comparison result returned by the lock manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub status: DriftStatus,
    pub changes: Vec<Change>,
    pub message: String,
}

impl Comparison {
    /// Comparison for a project with no baseline lock file
    pub fn no_lock() -> Self {
        Self {
            status: DriftStatus::NoLock,
            changes: Vec::new(),
            message: "No lock file found - run 'kgen-lock generate' to create one".to_string(),
        }
    }

    /// Build a comparison from a change list
    pub fn from_changes(changes: Vec<Change>) -> Self {
        if changes.is_empty() {
            Self {
                status: DriftStatus::Clean,
                changes,
                message: "No drift detected".to_string(),
            }
        } else {
            let message = format!("{} change(s) detected", changes.len());
            Self {
                status: DriftStatus::Drift,
                changes,
                message,
            }
        }
    }
}

/// Diff two `path -> hash` maps into an ordered change list.
///
/// A path only in `new` is added, only in `old` is removed, in both with
/// differing hashes is modified. The BTreeMap union is walked in key
/// order, so the output is sorted by path.
pub fn diff_file_maps(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut old_iter = old.iter().peekable();
    let mut new_iter = new.iter().peekable();

    loop {
        match (old_iter.peek(), new_iter.peek()) {
            (Some((old_path, old_hash)), Some((new_path, new_hash))) => {
                match old_path.cmp(new_path) {
                    std::cmp::Ordering::Less => {
                        changes.push(Change {
                            kind: ChangeKind::Removed,
                            file: (*old_path).clone(),
                        });
                        old_iter.next();
                    }
                    std::cmp::Ordering::Greater => {
                        changes.push(Change {
                            kind: ChangeKind::Added,
                            file: (*new_path).clone(),
                        });
                        new_iter.next();
                    }
                    std::cmp::Ordering::Equal => {
                        if old_hash != new_hash {
                            changes.push(Change {
                                kind: ChangeKind::Modified,
                                file: (*new_path).clone(),
                            });
                        }
                        old_iter.next();
                        new_iter.next();
                    }
                }
            }
            (Some((old_path, _)), None) => {
                changes.push(Change {
                    kind: ChangeKind::Removed,
                    file: (*old_path).clone(),
                });
                old_iter.next();
            }
            (None, Some((new_path, _))) => {
                changes.push(Change {
                    kind: ChangeKind::Added,
                    file: (*new_path).clone(),
                });
                new_iter.next();
            }
            (None, None) => break,
        }
    }

    changes
}
