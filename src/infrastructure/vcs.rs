//! Git CLI implementation of the VcsClient port
//!
//! Shells out to the `git` binary with a bounded deadline per call.
//! Spawn failure, timeout and non-zero exit all converge on `VcsError`
//! so callers never see a raw process error.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::domain::ports::{VcsClient, VcsError, VcsResult};

/// Default per-command deadline; local git commands are sub-second
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval while waiting for the child to exit
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Production VcsClient backed by the `git` binary
pub struct GitCli {
    root: PathBuf,
    timeout: Duration,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a git subcommand, returning trimmed stdout.
    fn run(&self, args: &[&str]) -> VcsResult<String> {
        let mut child = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VcsError::BinaryMissing
                } else {
                    VcsError::Command(e.to_string())
                }
            })?;

        // Drain both pipes on background threads so a chatty command
        // cannot deadlock against a full pipe buffer while we poll.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = std::thread::spawn(move || read_all(stdout));
        let stderr_reader = std::thread::spawn(move || read_all(stderr));

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(VcsError::Timeout {
                            seconds: self.timeout.as_secs(),
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(VcsError::Command(e.to_string())),
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if status.success() {
            Ok(String::from_utf8_lossy(&stdout).trim_end().to_string())
        } else {
            let message = String::from_utf8_lossy(&stderr).trim().to_string();
            if is_not_a_repository(&message) {
                Err(VcsError::NotARepository)
            } else if message.is_empty() {
                Err(VcsError::Command(format!(
                    "git {} exited with {}",
                    args.first().unwrap_or(&""),
                    status
                )))
            } else {
                Err(VcsError::Command(message))
            }
        }
    }

    fn run_lines(&self, args: &[&str]) -> VcsResult<Vec<String>> {
        let output = self.run(args)?;
        Ok(output
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

fn read_all(pipe: Option<impl Read>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

fn is_not_a_repository(stderr: &str) -> bool {
    stderr.contains("not a git repository")
}

impl VcsClient for GitCli {
    fn git_dir(&self) -> VcsResult<String> {
        self.run(&["rev-parse", "--git-dir"])
    }

    fn head_commit(&self) -> VcsResult<String> {
        self.run(&["rev-parse", "HEAD"])
    }

    fn branch(&self) -> VcsResult<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn porcelain_status(&self) -> VcsResult<String> {
        self.run(&["status", "--porcelain"])
    }

    fn tags_at_head(&self) -> VcsResult<Vec<String>> {
        self.run_lines(&["tag", "--points-at", "HEAD"])
    }

    fn ls_files(&self) -> VcsResult<Vec<String>> {
        self.run_lines(&["ls-files"])
    }

    fn staged_names(&self) -> VcsResult<String> {
        self.run(&["diff", "--cached", "--name-status"])
    }

    fn worktree_names(&self) -> VcsResult<String> {
        self.run(&["diff", "--name-status"])
    }

    fn file_log(&self, path: &str, limit: usize) -> VcsResult<String> {
        let limit = limit.to_string();
        self.run(&[
            "log",
            "--format=%H%x00%s%x00%an%x00%ae%x00%aI",
            "-n",
            &limit,
            "--",
            path,
        ])
    }

    fn add(&self, paths: &[String]) -> VcsResult<()> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(|p| p.as_str()));
        self.run(&args).map(|_| ())
    }

    fn commit(&self, message: &str) -> VcsResult<String> {
        self.run(&["commit", "-m", message])
    }

    fn blame_porcelain(&self, path: &str) -> VcsResult<String> {
        self.run(&["blame", "--line-porcelain", "--", path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // These tests exercise the classification logic; repository-backed
    // behavior is covered by the integration suite.

    #[test]
    fn non_repo_directory_yields_typed_failure() {
        let dir = tempdir().unwrap();
        let cli = GitCli::new(dir.path());

        match cli.git_dir() {
            Err(VcsError::NotARepository) | Err(VcsError::BinaryMissing) => {}
            other => panic!("expected typed failure, got {:?}", other),
        }
    }

    #[test]
    fn not_a_repository_detection() {
        assert!(is_not_a_repository(
            "fatal: not a git repository (or any of the parent directories): .git"
        ));
        assert!(!is_not_a_repository("fatal: bad revision 'HEAD'"));
    }

    #[test]
    fn timeout_is_configurable() {
        let cli = GitCli::new("/tmp").with_timeout(Duration::from_secs(5));
        assert_eq!(cli.timeout, Duration::from_secs(5));
    }
}
