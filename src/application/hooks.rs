//! Git hook and .gitignore management
//!
//! The script and pattern bodies are pure string-template functions so
//! they can be tested without touching disk; the writers below them are
//! thin I/O callers.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::LockResult;
use crate::infrastructure::fs::atomic_write;

/// Marker opening the managed .gitignore section
pub const GITIGNORE_BEGIN: &str = "# BEGIN kgen-lock managed patterns";

/// Marker closing the managed .gitignore section
pub const GITIGNORE_END: &str = "# END kgen-lock managed patterns";

/// Body of the pre-commit hook.
///
/// Validates the lock file and refuses the commit on drift. A missing
/// lock file (status exit 2) only warns: a project that never generated
/// one must still be able to commit.
pub fn pre_commit_hook() -> String {
    r#"#!/bin/sh
# Installed by kgen-lock. Validates the lock file and checks for drift.

if ! command -v kgen-lock > /dev/null 2>&1; then
    exit 0
fi

if [ -f kgen.lock.json ]; then
    if ! kgen-lock validate > /dev/null 2>&1; then
        echo "kgen-lock: kgen.lock.json failed validation" >&2
        exit 1
    fi
fi

kgen-lock status
case $? in
    0) ;;
    2) echo "kgen-lock: no lock file yet - run 'kgen-lock generate' to start tracking" >&2 ;;
    *) echo "kgen-lock: drift detected - run 'kgen-lock generate' before committing" >&2
       exit 1 ;;
esac

exit 0
"#
    .to_string()
}

/// Body of the post-merge hook.
///
/// Warns when a merge brought in config changes that may have drifted
/// from the lock file.
pub fn post_merge_hook() -> String {
    r#"#!/bin/sh
# Installed by kgen-lock. Warns about config changes after a merge.

changed=$(git diff-tree -r --name-only ORIG_HEAD HEAD 2>/dev/null | grep -E 'kgen\.(toml|lock\.json)$')
if [ -n "$changed" ]; then
    echo "kgen-lock: configuration files changed by this merge:" >&2
    echo "$changed" >&2
    echo "kgen-lock: run 'kgen-lock status' to check for drift" >&2
fi

exit 0
"#
    .to_string()
}

/// The managed .gitignore block for generated artifacts.
///
/// Cache and temp directories are ignored; the lock and config files
/// are explicitly re-included so they stay under version control.
pub fn gitignore_patterns() -> String {
    format!(
        "{}\n\
         .kgen/cache/\n\
         .kgen/tmp/\n\
         *.kgen.tmp\n\
         kgen.lock.json.backup.*\n\
         !kgen.lock.json\n\
         !kgen.toml\n\
         {}\n",
        GITIGNORE_BEGIN, GITIGNORE_END
    )
}

/// What `update_gitignore` did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoreAction {
    Added,
    AlreadyExists,
    Updated,
}

impl std::fmt::Display for IgnoreAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::AlreadyExists => write!(f, "already-exists"),
            Self::Updated => write!(f, "updated"),
        }
    }
}

/// Outcome of a .gitignore update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitIgnoreUpdate {
    pub action: IgnoreAction,
    pub path: PathBuf,
}

/// Install or refresh the managed section of `.gitignore`.
///
/// Without a managed section the block is appended. An existing section
/// is left untouched unless `force` is set, in which case it is replaced
/// in place, preserving surrounding unmanaged content.
pub fn update_gitignore(root: &Path, force: bool) -> LockResult<GitIgnoreUpdate> {
    let path = root.join(".gitignore");
    let existing = if path.exists() {
        std::fs::read_to_string(&path)?
    } else {
        String::new()
    };

    let begin = existing.find(GITIGNORE_BEGIN);
    let action = match begin {
        None => {
            let mut content = existing;
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(&gitignore_patterns());
            atomic_write(&path, content.as_bytes())?;
            IgnoreAction::Added
        }
        Some(_) if !force => IgnoreAction::AlreadyExists,
        Some(begin) => {
            let end = existing[begin..]
                .find(GITIGNORE_END)
                .map(|offset| begin + offset + GITIGNORE_END.len())
                .unwrap_or(existing.len());
            // swallow the trailing newline of the old block
            let end = if existing[end..].starts_with('\n') {
                end + 1
            } else {
                end
            };

            let mut content = String::with_capacity(existing.len());
            content.push_str(&existing[..begin]);
            content.push_str(&gitignore_patterns());
            content.push_str(&existing[end..]);
            atomic_write(&path, content.as_bytes())?;
            IgnoreAction::Updated
        }
    };

    Ok(GitIgnoreUpdate { action, path })
}

/// Outcome of hook installation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HooksResult {
    pub success: bool,
    pub installed: Vec<PathBuf>,
    pub error: Option<String>,
}

/// Write the pre-commit and post-merge hooks into `.git/hooks/`.
pub fn setup_git_hooks(root: &Path) -> HooksResult {
    let hooks_dir = root.join(".git").join("hooks");
    if !root.join(".git").exists() {
        return HooksResult {
            error: Some("Not a Git repository".to_string()),
            ..HooksResult::default()
        };
    }

    let hooks = [
        ("pre-commit", pre_commit_hook()),
        ("post-merge", post_merge_hook()),
    ];

    let mut installed = Vec::new();
    for (name, body) in hooks {
        let path = hooks_dir.join(name);
        if let Err(e) = write_executable(&path, body.as_bytes()) {
            return HooksResult {
                installed,
                error: Some(e.to_string()),
                ..HooksResult::default()
            };
        }
        installed.push(path);
    }

    HooksResult {
        success: true,
        installed,
        error: None,
    }
}

fn write_executable(path: &Path, content: &[u8]) -> std::io::Result<()> {
    atomic_write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}
