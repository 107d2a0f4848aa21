//! Version-control client port
//!
//! Narrow seam over the external `git` binary. Each method maps to one
//! subcommand and returns its text output; parsing into richer shapes
//! happens in `application::git_ops`. The production implementation is
//! `infrastructure::vcs::GitCli`; tests use the in-memory `FakeVcs`.

use thiserror::Error;

/// Typed failure for a version-control invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VcsError {
    /// The working directory is not inside a repository
    #[error("Not a Git repository")]
    NotARepository,

    /// The git binary could not be found
    #[error("git binary not found")]
    BinaryMissing,

    /// The command ran past its deadline and was killed
    #[error("git command timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The command exited non-zero; carries the raw stderr message
    #[error("{0}")]
    Command(String),
}

/// Result alias for VCS calls
pub type VcsResult<T> = Result<T, VcsError>;

/// Narrow interface over the version-control CLI.
///
/// Methods mirror the git subcommands the engine depends on; the core
/// logic depends only on their text output contract.
pub trait VcsClient {
    /// `rev-parse --git-dir`
    fn git_dir(&self) -> VcsResult<String>;

    /// `rev-parse HEAD`
    fn head_commit(&self) -> VcsResult<String>;

    /// `rev-parse --abbrev-ref HEAD`
    fn branch(&self) -> VcsResult<String>;

    /// `status --porcelain`
    fn porcelain_status(&self) -> VcsResult<String>;

    /// `tag --points-at HEAD`
    fn tags_at_head(&self) -> VcsResult<Vec<String>>;

    /// `ls-files`
    fn ls_files(&self) -> VcsResult<Vec<String>>;

    /// `diff --cached --name-status`
    fn staged_names(&self) -> VcsResult<String>;

    /// `diff --name-status`
    fn worktree_names(&self) -> VcsResult<String>;

    /// `log` over a single path, NUL-separated
    /// `%H%x00%s%x00%an%x00%ae%x00%aI` records, newest first
    fn file_log(&self, path: &str, limit: usize) -> VcsResult<String>;

    /// `add` the given paths
    fn add(&self, paths: &[String]) -> VcsResult<()>;

    /// `commit -m`; returns the command's stdout
    fn commit(&self, message: &str) -> VcsResult<String>;

    /// `blame --line-porcelain` over a single path
    fn blame_porcelain(&self, path: &str) -> VcsResult<String>;
}

/// In-memory fake for testing without spawning processes.
///
/// Fields are raw text outputs, mirroring the trait's contract. Uses
/// `RefCell` so tests can assert which mutations were attempted.
#[cfg(test)]
pub struct FakeVcs {
    pub repo: bool,
    pub head: VcsResult<String>,
    pub branch: String,
    pub porcelain: String,
    pub tags: Vec<String>,
    pub files: Vec<String>,
    pub staged: String,
    pub worktree: String,
    pub log: String,
    pub blame: String,
    pub commit_error: Option<VcsError>,
    pub added: std::cell::RefCell<Vec<Vec<String>>>,
    pub commits: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl FakeVcs {
    /// A clean repository with one commit on main
    pub fn repo() -> Self {
        Self {
            repo: true,
            head: Ok("0123456789abcdef0123456789abcdef01234567".to_string()),
            branch: "main".to_string(),
            porcelain: String::new(),
            tags: Vec::new(),
            files: Vec::new(),
            staged: String::new(),
            worktree: String::new(),
            log: String::new(),
            blame: String::new(),
            commit_error: None,
            added: std::cell::RefCell::new(Vec::new()),
            commits: std::cell::RefCell::new(Vec::new()),
        }
    }

    /// A directory that is not a repository
    pub fn not_a_repo() -> Self {
        let mut fake = Self::repo();
        fake.repo = false;
        fake
    }
}

#[cfg(test)]
impl VcsClient for FakeVcs {
    fn git_dir(&self) -> VcsResult<String> {
        if self.repo {
            Ok(".git".to_string())
        } else {
            Err(VcsError::NotARepository)
        }
    }

    fn head_commit(&self) -> VcsResult<String> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        self.head.clone()
    }

    fn branch(&self) -> VcsResult<String> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        Ok(self.branch.clone())
    }

    fn porcelain_status(&self) -> VcsResult<String> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        Ok(self.porcelain.clone())
    }

    fn tags_at_head(&self) -> VcsResult<Vec<String>> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        Ok(self.tags.clone())
    }

    fn ls_files(&self) -> VcsResult<Vec<String>> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        Ok(self.files.clone())
    }

    fn staged_names(&self) -> VcsResult<String> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        Ok(self.staged.clone())
    }

    fn worktree_names(&self) -> VcsResult<String> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        Ok(self.worktree.clone())
    }

    fn file_log(&self, _path: &str, _limit: usize) -> VcsResult<String> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        Ok(self.log.clone())
    }

    fn add(&self, paths: &[String]) -> VcsResult<()> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        self.added.borrow_mut().push(paths.to_vec());
        Ok(())
    }

    fn commit(&self, message: &str) -> VcsResult<String> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        if let Some(err) = &self.commit_error {
            return Err(err.clone());
        }
        self.commits.borrow_mut().push(message.to_string());
        Ok(format!("[main] {}", message))
    }

    fn blame_porcelain(&self, _path: &str) -> VcsResult<String> {
        if !self.repo {
            return Err(VcsError::NotARepository);
        }
        Ok(self.blame.clone())
    }
}
